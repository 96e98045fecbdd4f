//! Pointer input: select a ball, drag to aim, release to shoot
//!
//! ```text
//! Idle --(down inside ball B)--> Dragging(B)
//! Dragging(B) --(move)--> Dragging(B)   B.vel = launch_speed toward pointer
//! Dragging(B) --(up)--> Idle             B keeps its last velocity
//! ```

use glam::Vec2;

use super::state::{BallId, PaletteColor, World};
use crate::heading;

/// Pointer event in surface-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
}

/// Selection state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Selection {
    #[default]
    Idle,
    /// A ball is held; `pointer` is the last position seen while holding it
    Dragging { ball: BallId, pointer: Option<Vec2> },
}

/// Maps pointer events onto the world
#[derive(Debug, Clone, Default)]
pub struct InputController {
    selection: Selection,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Last pointer position seen while holding a ball
    pub fn pointer(&self) -> Option<Vec2> {
        match self.selection {
            Selection::Idle => None,
            Selection::Dragging { pointer, .. } => pointer,
        }
    }

    /// Currently held ball, if any
    pub fn selected(&self) -> Option<BallId> {
        match self.selection {
            Selection::Idle => None,
            Selection::Dragging { ball, .. } => Some(ball),
        }
    }

    /// Feed one pointer event
    pub fn handle(&mut self, world: &mut World, event: PointerEvent, launch_speed: f32) {
        match event {
            PointerEvent::Down(at) => {
                self.selection = match world.ball_at(at) {
                    Some(ball) => {
                        log::debug!("Selected ball {}", ball.0);
                        Selection::Dragging { ball, pointer: None }
                    }
                    None => Selection::Idle,
                };
            }
            PointerEvent::Move(at) => {
                if let Selection::Dragging { ball, ref mut pointer } = self.selection {
                    *pointer = Some(at);
                    if let Some(b) = world.get_mut(ball) {
                        b.vel = heading(b.pos, at) * launch_speed;
                    }
                }
            }
            PointerEvent::Up => {
                if let Some(ball) = self.selected() {
                    log::debug!("Released ball {}", ball.0);
                }
                self.selection = Selection::Idle;
            }
        }
    }

    /// Recolor the held ball; returns false (and does nothing) when idle
    pub fn set_selected_color(&self, world: &mut World, color: PaletteColor) -> bool {
        let Some(ball) = self.selected().and_then(|id| world.get_mut(id)) else {
            return false;
        };
        ball.color = color.color();
        log::debug!("Recolored selected ball to {}", color.as_str());
        true
    }
}
