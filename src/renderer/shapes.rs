//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Fewest segments used for any circle
const MIN_SEGMENTS: u32 = 12;
/// Most segments used for any circle
const MAX_SEGMENTS: u32 = 96;

/// Segment count that keeps chords a few pixels long at any radius
pub fn segments_for_radius(radius: f32) -> u32 {
    ((radius * 1.5) as u32).clamp(MIN_SEGMENTS, MAX_SEGMENTS)
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_vertex_count() {
        let verts = circle(Vec2::new(5.0, 5.0), 10.0, [1.0; 4], 16);
        assert_eq!(verts.len(), 48);
        // Every third vertex is the center
        assert!(verts.iter().step_by(3).all(|v| v.position == [5.0, 5.0]));
    }

    #[test]
    fn test_circle_rim_on_radius() {
        let center = Vec2::new(100.0, 50.0);
        let verts = circle(center, 25.0, [0.0, 0.0, 0.0, 1.0], 24);
        for (i, v) in verts.iter().enumerate() {
            if i % 3 == 0 {
                continue;
            }
            let d = Vec2::from(v.position).distance(center);
            assert!((d - 25.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_segments_clamped() {
        assert_eq!(segments_for_radius(1.0), MIN_SEGMENTS);
        assert_eq!(segments_for_radius(20.0), 30);
        assert_eq!(segments_for_radius(1000.0), MAX_SEGMENTS);
    }
}
