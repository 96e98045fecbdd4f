//! Deterministic simulation module
//!
//! All ball logic lives here. This module must be pure and deterministic:
//! - One step per frame, no wall-clock time
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - No rendering or platform dependencies

pub mod input;
pub mod state;
pub mod tick;

pub use input::{InputController, PointerEvent, Selection};
pub use state::{Ball, BallId, Bounds, Color, PaletteColor, World};
pub use tick::{repulsion_nudge, step};
