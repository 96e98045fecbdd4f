//! Simulation state and core types
//!
//! Balls live in an arena (`World::balls`) and are addressed by `BallId`.
//! Insertion order is draw order and iteration order.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Stable handle to a ball in the arena (balls are never removed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BallId(pub usize);

/// Opaque RGB fill color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed 0xRRGGBB value (upper byte ignored)
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xff) as u8,
            g: ((packed >> 8) & 0xff) as u8,
            b: (packed & 0xff) as u8,
        }
    }

    /// Parse `#rrggbb` or `#rgb`
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => u32::from_str_radix(hex, 16).ok().map(Self::from_u32),
            3 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                let expand = |n: u32| (n * 17) as u8;
                Some(Self::rgb(
                    expand((v >> 8) & 0xf),
                    expand((v >> 4) & 0xf),
                    expand(v & 0xf),
                ))
            }
            _ => None,
        }
    }

    /// Float color for the GPU, still sRGB-encoded (alpha always 1)
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            1.0,
        ]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fixed colors the user can assign to the selected ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaletteColor {
    Red,
    Green,
    Blue,
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 3] = [PaletteColor::Red, PaletteColor::Green, PaletteColor::Blue];

    pub fn color(self) -> Color {
        match self {
            PaletteColor::Red => Color::rgb(0xff, 0x00, 0x00),
            PaletteColor::Green => Color::rgb(0x00, 0xff, 0x00),
            PaletteColor::Blue => Color::rgb(0x00, 0x00, 0xff),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaletteColor::Red => "Red",
            PaletteColor::Green => "Green",
            PaletteColor::Blue => "Blue",
        }
    }

    /// Accepts the option value (`#ff0000`) or the label (`red`)
    pub fn from_str(s: &str) -> Option<Self> {
        if let Some(color) = Color::from_hex(s) {
            return Self::ALL.into_iter().find(|p| p.color() == color);
        }
        match s.to_lowercase().as_str() {
            "red" => Some(PaletteColor::Red),
            "green" => Some(PaletteColor::Green),
            "blue" => Some(PaletteColor::Blue),
            _ => None,
        }
    }
}

/// A ball
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    /// Fixed at creation, always > 0
    radius: f32,
}

impl Ball {
    /// Create a ball; a non-positive radius is raised to `f32::EPSILON`
    pub fn new(pos: Vec2, radius: f32, vel: Vec2, color: Color) -> Self {
        Self {
            pos,
            vel,
            color,
            radius: radius.max(f32::EPSILON),
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Whether a point lies strictly inside the ball
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance(point) < self.radius
    }
}

/// Axis-aligned canvas bounds, origin at the top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub bounds: Bounds,
    /// Frames stepped so far
    pub frame: u64,
    balls: Vec<Ball>,
    rng: Pcg32,
}

impl World {
    /// Create an empty world with the given seed
    pub fn new(bounds: Bounds, seed: u64) -> Self {
        Self {
            seed,
            bounds,
            frame: 0,
            balls: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn balls_mut(&mut self) -> &mut [Ball] {
        &mut self.balls
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn get(&self, id: BallId) -> Option<&Ball> {
        self.balls.get(id.0)
    }

    pub fn get_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.balls.get_mut(id.0)
    }

    /// Append a ball and return its handle
    pub fn insert(&mut self, ball: Ball) -> BallId {
        self.balls.push(ball);
        BallId(self.balls.len() - 1)
    }

    /// First ball (insertion order) whose disc strictly contains `point`
    pub fn ball_at(&self, point: Vec2) -> Option<BallId> {
        self.balls.iter().position(|b| b.contains(point)).map(BallId)
    }

    /// Spawn a ball with random position, radius, velocity and color
    pub fn spawn_random(&mut self, settings: &Settings) -> BallId {
        let (w, h) = (self.bounds.width, self.bounds.height);
        let pos = Vec2::new(
            self.rng.random_range(0.0..=w),
            self.rng.random_range(0.0..=h),
        );
        let radius = self
            .rng
            .random_range(settings.min_radius..=settings.max_radius);
        let s = settings.max_spawn_speed;
        let vel = Vec2::new(self.rng.random_range(-s..=s), self.rng.random_range(-s..=s));
        let color = Color::from_u32(self.rng.random_range(0..=0xff_ffff));

        let id = self.insert(Ball::new(pos, radius, vel, color));
        log::info!(
            "Spawned ball {} at ({:.1}, {:.1}) r={:.1} color={}",
            id.0,
            pos.x,
            pos.y,
            radius,
            color
        );
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_color_hex_round_trip() {
        let c = Color::from_hex("#1a2b3c").unwrap();
        assert_eq!(c, Color::rgb(0x1a, 0x2b, 0x3c));
        assert_eq!(c.to_string(), "#1a2b3c");
        assert_eq!(Color::from_hex("#f00"), Some(Color::rgb(0xff, 0, 0)));
        assert_eq!(Color::from_hex("ff0000"), None);
        assert_eq!(Color::from_hex("#ff00zz"), None);
        assert_eq!(Color::from_hex("#ff00"), None);
    }

    #[test]
    fn test_color_pads_small_values() {
        // Packed values below 0x100000 still print six digits
        assert_eq!(Color::from_u32(0x00_0a0b).to_string(), "#000a0b");
    }

    #[test]
    fn test_palette_values() {
        assert_eq!(PaletteColor::Red.color().to_string(), "#ff0000");
        assert_eq!(PaletteColor::Green.color().to_string(), "#00ff00");
        assert_eq!(PaletteColor::Blue.color().to_string(), "#0000ff");
        assert_eq!(PaletteColor::from_str("#00ff00"), Some(PaletteColor::Green));
        assert_eq!(PaletteColor::from_str("Blue"), Some(PaletteColor::Blue));
        assert_eq!(PaletteColor::from_str("#123456"), None);
    }

    #[test]
    fn test_radius_is_positive() {
        let ball = Ball::new(Vec2::ZERO, -3.0, Vec2::ZERO, Color::rgb(0, 0, 0));
        assert!(ball.radius() > 0.0);
    }

    #[test]
    fn test_ball_at_first_match_wins() {
        let mut world = World::new(Bounds::new(800.0, 600.0), 1);
        let white = Color::rgb(255, 255, 255);
        world.insert(Ball::new(Vec2::new(500.0, 500.0), 10.0, Vec2::ZERO, white));
        let a = world.insert(Ball::new(Vec2::new(100.0, 100.0), 20.0, Vec2::ZERO, white));
        let b = world.insert(Ball::new(Vec2::new(110.0, 100.0), 20.0, Vec2::ZERO, white));

        assert_eq!(world.ball_at(Vec2::new(105.0, 100.0)), Some(a));
        assert_eq!(world.ball_at(Vec2::new(125.0, 100.0)), Some(b));
        assert_eq!(world.ball_at(Vec2::new(300.0, 300.0)), None);
        // Exactly on the rim is outside
        assert_eq!(world.ball_at(Vec2::new(520.0, 500.0)), None);
    }

    #[test]
    fn test_spawn_is_deterministic() {
        let settings = Settings::default();
        let mut w1 = World::new(Bounds::new(800.0, 600.0), 99999);
        let mut w2 = World::new(Bounds::new(800.0, 600.0), 99999);
        for _ in 0..5 {
            w1.spawn_random(&settings);
            w2.spawn_random(&settings);
        }
        assert_eq!(w1.balls(), w2.balls());
    }

    proptest! {
        #[test]
        fn spawn_adds_one_ball_within_ranges(seed in any::<u64>(), count in 0usize..20) {
            let settings = Settings::default();
            let mut world = World::new(Bounds::new(800.0, 600.0), seed);
            for _ in 0..count {
                world.spawn_random(&settings);
            }

            let before = world.len();
            let id = world.spawn_random(&settings);
            prop_assert_eq!(world.len(), before + 1);
            prop_assert_eq!(id, BallId(before));

            let ball = world.get(id).unwrap();
            prop_assert!((10.0..=40.0).contains(&ball.radius()));
            prop_assert!((0.0..=800.0).contains(&ball.pos.x));
            prop_assert!((0.0..=600.0).contains(&ball.pos.y));
            prop_assert!((-2.0..=2.0).contains(&ball.vel.x));
            prop_assert!((-2.0..=2.0).contains(&ball.vel.y));
        }
    }
}
