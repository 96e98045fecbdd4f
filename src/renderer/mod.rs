//! Rendering
//!
//! The scene is redrawn from scratch every frame: clear, then one filled
//! circle per ball in insertion order. Anything implementing `DrawSurface`
//! can be a target; the browser build uses the WebGPU `RenderState`.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

use glam::Vec2;

use crate::sim::{Color, World};

pub use pipeline::RenderState;

/// Minimal 2D raster surface
pub trait DrawSurface {
    /// Clear the region from the origin to (width, height)
    fn clear(&mut self, width: f32, height: f32);
    /// Draw a solid filled circle
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
}

/// Clear the surface and draw every ball
pub fn draw_world<S: DrawSurface + ?Sized>(surface: &mut S, world: &World) {
    surface.clear(world.bounds.width, world.bounds.height);
    for ball in world.balls() {
        surface.fill_circle(ball.pos, ball.radius(), ball.color);
    }
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { width: f32, height: f32 },
    FillCircle { center: Vec2, radius: f32, color: Color },
}

/// Surface that records draw calls instead of rasterizing
///
/// Used by the headless native build and tests.
#[derive(Debug, Default)]
pub struct SceneRecorder {
    pub commands: Vec<DrawCommand>,
}

impl SceneRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands issued since the most recent clear
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear { .. }))
            .unwrap_or(0);
        &self.commands[start..]
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

impl DrawSurface for SceneRecorder {
    fn clear(&mut self, width: f32, height: f32) {
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Ball, Bounds};

    #[test]
    fn test_draw_world_clears_then_draws_in_order() {
        let mut world = World::new(Bounds::new(800.0, 600.0), 3);
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        world.insert(Ball::new(Vec2::new(10.0, 20.0), 15.0, Vec2::ZERO, red));
        world.insert(Ball::new(Vec2::new(30.0, 40.0), 25.0, Vec2::ZERO, blue));

        let mut recorder = SceneRecorder::new();
        draw_world(&mut recorder, &world);

        assert_eq!(
            recorder.commands,
            vec![
                DrawCommand::Clear {
                    width: 800.0,
                    height: 600.0
                },
                DrawCommand::FillCircle {
                    center: Vec2::new(10.0, 20.0),
                    radius: 15.0,
                    color: red
                },
                DrawCommand::FillCircle {
                    center: Vec2::new(30.0, 40.0),
                    radius: 25.0,
                    color: blue
                },
            ]
        );
    }

    #[test]
    fn test_last_frame() {
        let mut world = World::new(Bounds::new(800.0, 600.0), 3);
        let mut recorder = SceneRecorder::new();
        draw_world(&mut recorder, &world);
        world.insert(Ball::new(Vec2::new(1.0, 1.0), 10.0, Vec2::ZERO, Color::rgb(0, 0, 0)));
        draw_world(&mut recorder, &world);

        assert_eq!(recorder.commands.len(), 3);
        assert_eq!(recorder.last_frame().len(), 2);
    }
}
