//! Billiards - a bouncing-ball canvas toy
//!
//! Core modules:
//! - `sim`: Deterministic simulation (damping, walls, soft repulsion, input)
//! - `renderer`: Drawing surface abstraction and the WebGPU backend
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Data-driven tuning, persisted in LocalStorage on web
//! - `app`: The run/stop controlled frame loop tying it all together

pub mod app;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use app::{LoopControl, Simulation};
pub use settings::{RepulsionPairs, Settings, SettingsError};

use glam::Vec2;

/// Default tuning constants
pub mod consts {
    /// Canvas dimensions (pixels)
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Velocity multiplier applied every frame
    pub const DAMPING: f32 = 0.995;
    /// Fraction of the separation offset turned into velocity per visit
    pub const REPULSION_STRENGTH: f32 = 0.1;

    /// Speed given to a dragged ball on every pointer move (units/frame)
    pub const LAUNCH_SPEED: f32 = 5.0;

    /// Spawned ball radius range
    pub const MIN_BALL_RADIUS: f32 = 10.0;
    pub const MAX_BALL_RADIUS: f32 = 40.0;
    /// Spawned ball velocity components are uniform in [-MAX, MAX]
    pub const MAX_SPAWN_SPEED: f32 = 2.0;
}

/// Unit vector pointing from `from` toward `to`
///
/// Goes through `atan2` so that coincident points yield +x instead of NaN.
#[inline]
pub fn heading(from: Vec2, to: Vec2) -> Vec2 {
    let d = to - from;
    Vec2::from_angle(d.y.atan2(d.x))
}
