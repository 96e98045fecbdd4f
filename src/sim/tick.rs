//! Per-frame simulation step
//!
//! Advances every ball by one display frame. There is no fixed timestep:
//! velocities are in canvas units per frame.

use glam::Vec2;

use super::state::{Ball, Bounds, World};
use crate::settings::{RepulsionPairs, Settings};

/// Advance the world by one frame
///
/// For each ball in insertion order: damp, translate, reflect off walls, then
/// push against every other ball it overlaps. Balls later in the order have
/// not moved yet when an earlier ball tests against them.
pub fn step(world: &mut World, settings: &Settings) {
    let bounds = world.bounds;
    let balls = world.balls_mut();

    for i in 0..balls.len() {
        integrate(&mut balls[i], settings.damping, settings.rest_epsilon);
        reflect_off_walls(&mut balls[i], bounds);

        let first_other = match settings.repulsion_pairs {
            RepulsionPairs::Ordered => 0,
            RepulsionPairs::Unordered => i + 1,
        };
        for j in first_other..balls.len() {
            if j == i {
                continue;
            }
            let (ball, other) = pair_mut(balls, i, j);
            repel(ball, other, settings.repulsion_strength);
        }
    }

    world.frame += 1;
}

/// Damp velocity, then move
#[inline]
pub fn integrate(ball: &mut Ball, damping: f32, rest_epsilon: f32) {
    ball.vel *= damping;
    if rest_epsilon > 0.0 && ball.vel.length() < rest_epsilon {
        ball.vel = Vec2::ZERO;
    }
    ball.pos += ball.vel;
}

/// Negate the velocity component of any axis whose boundary the ball's edge
/// has crossed. Position is left untouched.
#[inline]
pub fn reflect_off_walls(ball: &mut Ball, bounds: Bounds) {
    let r = ball.radius();
    if ball.pos.x - r < 0.0 || ball.pos.x + r > bounds.width {
        ball.vel.x = -ball.vel.x;
    }
    if ball.pos.y - r < 0.0 || ball.pos.y + r > bounds.height {
        ball.vel.y = -ball.vel.y;
    }
}

/// Velocity nudge `other` receives (and `ball` loses) when they overlap
///
/// The target is where `other` would sit if it touched `ball` along the line
/// between their centres; the nudge is `strength` of the way there. Returns
/// `None` when the circles do not overlap.
pub fn repulsion_nudge(ball: &Ball, other: &Ball, strength: f32) -> Option<Vec2> {
    let d = other.pos - ball.pos;
    let reach = ball.radius() + other.radius();
    if d.length() >= reach {
        return None;
    }

    let angle = d.y.atan2(d.x);
    let target = ball.pos + Vec2::from_angle(angle) * reach;
    Some((target - other.pos) * strength)
}

/// Apply one directed repulsion visit
#[inline]
pub fn repel(ball: &mut Ball, other: &mut Ball, strength: f32) {
    if let Some(nudge) = repulsion_nudge(ball, other, strength) {
        ball.vel -= nudge;
        other.vel += nudge;
    }
}

/// Two distinct mutable elements of a slice
fn pair_mut(balls: &mut [Ball], i: usize, j: usize) -> (&mut Ball, &mut Ball) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = balls.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = balls.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{BallId, Color};
    use proptest::prelude::*;

    const WHITE: Color = Color::rgb(255, 255, 255);

    fn world_with(balls: &[(Vec2, f32, Vec2)]) -> World {
        let mut world = World::new(Bounds::new(800.0, 600.0), 12345);
        for &(pos, radius, vel) in balls {
            world.insert(Ball::new(pos, radius, vel, WHITE));
        }
        world
    }

    #[test]
    fn test_ball_at_rest_stays_put() {
        let settings = Settings::default();
        let start = Vec2::new(400.0, 300.0);
        let mut world = world_with(&[(start, 20.0, Vec2::ZERO)]);

        for _ in 0..500 {
            step(&mut world, &settings);
        }

        let ball = &world.balls()[0];
        assert_eq!(ball.pos, start);
        assert_eq!(ball.vel, Vec2::ZERO);
        assert_eq!(world.frame, 500);
    }

    #[test]
    fn test_left_wall_flips_dx() {
        let settings = Settings::default();
        let r = 20.0;
        let mut world = world_with(&[(Vec2::new(r - 1.0, 300.0), r, Vec2::new(-3.0, 0.0))]);

        step(&mut world, &settings);

        let ball = &world.balls()[0];
        assert!((ball.vel.x - 3.0 * 0.995).abs() < 1e-5);
        assert_eq!(ball.vel.y, 0.0);
        assert!((ball.pos.x - (r - 1.0 - 3.0 * 0.995)).abs() < 1e-4);
    }

    #[test]
    fn test_wall_flips_only_crossing_axis() {
        let settings = Settings::default();
        // Crosses the bottom wall only
        let mut world = world_with(&[(Vec2::new(400.0, 585.0), 20.0, Vec2::new(1.0, 2.0))]);

        step(&mut world, &settings);

        let ball = &world.balls()[0];
        assert!(ball.vel.x > 0.0);
        assert!(ball.vel.y < 0.0);
    }

    #[test]
    fn test_straddling_ball_flips_every_frame() {
        // No position correction: a ball stuck across the wall keeps flipping
        let settings = Settings {
            damping: 1.0,
            ..Default::default()
        };
        let mut world = world_with(&[(Vec2::new(-30.0, 300.0), 40.0, Vec2::new(0.5, 0.0))]);

        step(&mut world, &settings);
        assert_eq!(world.balls()[0].vel.x, -0.5);
        step(&mut world, &settings);
        assert_eq!(world.balls()[0].vel.x, 0.5);
    }

    #[test]
    fn test_separated_balls_are_not_nudged() {
        let a = Ball::new(Vec2::new(100.0, 100.0), 20.0, Vec2::ZERO, WHITE);
        let b = Ball::new(Vec2::new(150.0, 100.0), 30.0, Vec2::ZERO, WHITE);
        // Exactly touching is not overlapping
        assert_eq!(repulsion_nudge(&a, &b, 0.1), None);

        let settings = Settings::default();
        let mut world = world_with(&[
            (Vec2::new(100.0, 100.0), 20.0, Vec2::new(1.0, 0.0)),
            (Vec2::new(300.0, 100.0), 20.0, Vec2::new(-1.0, 0.0)),
        ]);
        step(&mut world, &settings);
        assert!((world.balls()[0].vel.x - 0.995).abs() < 1e-6);
        assert!((world.balls()[1].vel.x + 0.995).abs() < 1e-6);
    }

    #[test]
    fn test_overlap_nudge_magnitude() {
        let a = Ball::new(Vec2::new(100.0, 100.0), 20.0, Vec2::ZERO, WHITE);
        let b = Ball::new(Vec2::new(130.0, 100.0), 20.0, Vec2::ZERO, WHITE);

        // Target for b is (140, 100): 10 units of penetration
        let nudge = repulsion_nudge(&a, &b, 0.1).unwrap();
        assert!((nudge.x - 1.0).abs() < 1e-5);
        assert!(nudge.y.abs() < 1e-5);

        let mut a = a;
        let mut b = b;
        repel(&mut a, &mut b, 0.1);
        assert!((a.vel.x + 1.0).abs() < 1e-5);
        assert!((b.vel.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_coincident_centres_push_along_x() {
        let a = Ball::new(Vec2::new(100.0, 100.0), 10.0, Vec2::ZERO, WHITE);
        let b = Ball::new(Vec2::new(100.0, 100.0), 15.0, Vec2::ZERO, WHITE);
        let nudge = repulsion_nudge(&a, &b, 0.1).unwrap();
        assert!((nudge.x - 2.5).abs() < 1e-5);
        assert_eq!(nudge.y, 0.0);
    }

    #[test]
    fn test_ordered_pairs_push_twice() {
        // Both balls start at rest
        let settings = Settings::default();
        let mut world = world_with(&[
            (Vec2::new(100.0, 100.0), 20.0, Vec2::ZERO),
            (Vec2::new(130.0, 100.0), 20.0, Vec2::ZERO),
        ]);

        step(&mut world, &settings);

        // Visit (0, 1): a -= 1, b += 1. Ball 1 then damps and moves 0.995 to
        // the right before visit (1, 0) pushes both again.
        // Visit (1, 0) sees b at 130.995, so its nudge is 0.9005, not 1.
        let a = &world.balls()[0];
        let b = &world.balls()[1];
        assert!((a.vel.x + 1.9005).abs() < 1e-4, "a.vel.x = {}", a.vel.x);
        assert!((b.vel.x - 1.8955).abs() < 1e-4, "b.vel.x = {}", b.vel.x);
        assert!((b.pos.x - 130.995).abs() < 1e-4, "b.pos.x = {}", b.pos.x);
        assert_eq!(a.pos.x, 100.0);
    }

    #[test]
    fn test_unordered_pairs_push_once() {
        let settings = Settings {
            repulsion_pairs: RepulsionPairs::Unordered,
            ..Default::default()
        };
        let mut world = world_with(&[
            (Vec2::new(100.0, 100.0), 20.0, Vec2::ZERO),
            (Vec2::new(130.0, 100.0), 20.0, Vec2::ZERO),
        ]);

        step(&mut world, &settings);

        let a = world.get(BallId(0)).unwrap();
        let b = world.get(BallId(1)).unwrap();
        assert!((a.vel.x + 1.0).abs() < 1e-5);
        // b was nudged to +1 before its own damping ran
        assert!((b.vel.x - 0.995).abs() < 1e-5);
    }

    #[test]
    fn test_rest_epsilon_stops_slow_balls() {
        let settings = Settings {
            rest_epsilon: 0.01,
            ..Default::default()
        };
        let mut world = world_with(&[(Vec2::new(400.0, 300.0), 20.0, Vec2::new(0.5, 0.0))]);

        let mut frames = 0;
        while world.balls()[0].vel != Vec2::ZERO {
            step(&mut world, &settings);
            frames += 1;
            assert!(frames < 2000, "ball never came to rest");
        }
        let x = world.balls()[0].pos.x;
        step(&mut world, &settings);
        assert_eq!(world.balls()[0].pos.x, x);
    }

    #[test]
    fn test_empty_world_steps() {
        let mut world = World::new(Bounds::new(800.0, 600.0), 1);
        step(&mut world, &Settings::default());
        assert_eq!(world.frame, 1);
        assert!(world.is_empty());
    }

    #[test]
    fn test_determinism() {
        let settings = Settings::default();
        let mut w1 = World::new(Bounds::new(800.0, 600.0), 99999);
        let mut w2 = World::new(Bounds::new(800.0, 600.0), 99999);
        for _ in 0..10 {
            w1.spawn_random(&settings);
            w2.spawn_random(&settings);
        }
        for _ in 0..200 {
            step(&mut w1, &settings);
            step(&mut w2, &settings);
        }
        assert_eq!(w1.balls(), w2.balls());
    }

    proptest! {
        #[test]
        fn damping_law_holds_away_from_walls(
            dx in -2.0f32..2.0,
            dy in -2.0f32..2.0,
            frames in 0u32..60,
        ) {
            // 60 frames at < 3 units/frame cannot reach a wall from the centre
            let settings = Settings::default();
            let vel = Vec2::new(dx, dy);
            let mut world = world_with(&[(Vec2::new(400.0, 300.0), 20.0, vel)]);
            for _ in 0..frames {
                step(&mut world, &settings);
            }

            let expected = vel.length() * 0.995f32.powi(frames as i32);
            let actual = world.balls()[0].vel.length();
            prop_assert!((actual - expected).abs() <= 1e-4 * (1.0 + expected));
        }

        #[test]
        fn separated_pairs_never_interact(
            ax in 100.0f32..200.0,
            ay in 100.0f32..500.0,
            gap in 0.01f32..100.0,
            ra in 10.0f32..40.0,
            rb in 10.0f32..40.0,
        ) {
            let a = Ball::new(Vec2::new(ax, ay), ra, Vec2::ZERO, WHITE);
            let b = Ball::new(Vec2::new(ax + ra + rb + gap, ay), rb, Vec2::ZERO, WHITE);
            prop_assert!(repulsion_nudge(&a, &b, 0.1).is_none());
        }

        #[test]
        fn overlapping_pairs_get_scaled_offset(
            ax in 100.0f32..200.0,
            ay in 100.0f32..500.0,
            angle in 0.0f32..std::f32::consts::TAU,
            frac in 0.05f32..0.95,
            ra in 10.0f32..40.0,
            rb in 10.0f32..40.0,
        ) {
            let reach = ra + rb;
            let a = Ball::new(Vec2::new(ax, ay), ra, Vec2::ZERO, WHITE);
            let b = Ball::new(a.pos + Vec2::from_angle(angle) * reach * frac, rb, Vec2::ZERO, WHITE);

            let nudge = repulsion_nudge(&a, &b, 0.1).unwrap();
            let penetration = reach * (1.0 - frac);
            prop_assert!(nudge.length() > 0.0);
            prop_assert!((nudge.length() - penetration * 0.1).abs() < 1e-3);
        }
    }
}
