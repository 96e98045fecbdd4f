//! Platform abstraction layer
//!
//! Browser setup can fail in many small ways (no canvas, no WebGPU adapter).
//! None of them are fatal: the host logs the error and the toy stays inert.

use std::fmt;

/// DOM id of the drawing canvas
pub const CANVAS_ID: &str = "canvas";
/// DOM id of the "add ball" button
pub const ADD_BALL_ID: &str = "add-ball";
/// DOM id of the color `<select>` shown while a ball is held
pub const COLOR_SELECT_ID: &str = "color-select";

/// Reasons the browser host could not start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// No global `window`
    NoWindow,
    /// Window without a document
    NoDocument,
    /// No element with this id
    MissingElement(&'static str),
    /// Element exists but is not a `<canvas>`
    NotACanvas(&'static str),
    /// No GPU adapter compatible with the canvas surface
    NoAdapter,
    /// Surface creation or configuration failed
    Surface(String),
    /// Device request failed
    Device(String),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::NoWindow => write!(f, "no window available"),
            SetupError::NoDocument => write!(f, "window has no document"),
            SetupError::MissingElement(id) => write!(f, "no element with id '{}'", id),
            SetupError::NotACanvas(id) => write!(f, "element '{}' is not a canvas", id),
            SetupError::NoAdapter => write!(f, "no compatible GPU adapter"),
            SetupError::Surface(msg) => write!(f, "surface error: {}", msg),
            SetupError::Device(msg) => write!(f, "device error: {}", msg),
        }
    }
}

impl std::error::Error for SetupError {}
