//! Simulation settings and tuning
//!
//! Persisted as JSON in LocalStorage on web; native builds use the defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Which ball pairs the repulsion pass visits each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RepulsionPairs {
    /// Every ordered pair (a, b) with a != b, so each overlap is pushed twice
    /// with swapped roles
    #[default]
    Ordered,
    /// Each unordered pair once (a < b)
    Unordered,
}

impl RepulsionPairs {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepulsionPairs::Ordered => "Ordered",
            RepulsionPairs::Unordered => "Unordered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ordered" => Some(RepulsionPairs::Ordered),
            "unordered" | "symmetric" => Some(RepulsionPairs::Unordered),
            _ => None,
        }
    }
}

/// Rejected settings value
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// Canvas width or height is not strictly positive
    CanvasSize { width: f32, height: f32 },
    /// Damping factor outside (0, 1]
    Damping(f32),
    /// Radius range is empty or not strictly positive
    RadiusRange { min: f32, max: f32 },
    /// A speed or threshold that must be non-negative
    Negative { name: &'static str, value: f32 },
    /// Infinite, NaN, or too large to sample from
    OutOfRange { name: &'static str, value: f32 },
    /// Stored JSON could not be parsed
    Parse(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::CanvasSize { width, height } => {
                write!(f, "canvas size must be positive, got {}x{}", width, height)
            }
            SettingsError::Damping(value) => {
                write!(f, "damping must be in (0, 1], got {}", value)
            }
            SettingsError::RadiusRange { min, max } => {
                write!(f, "radius range must satisfy 0 < min <= max, got [{}, {}]", min, max)
            }
            SettingsError::Negative { name, value } => {
                write!(f, "{} must not be negative, got {}", name, value)
            }
            SettingsError::OutOfRange { name, value } => {
                write!(f, "{} must be finite and at most {}, got {}", name, MAX_MAGNITUDE, value)
            }
            SettingsError::Parse(msg) => write!(f, "could not parse settings: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Largest absolute value any float setting may take
pub const MAX_MAGNITUDE: f32 = 1.0e6;

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Surface ===
    pub canvas_width: f32,
    pub canvas_height: f32,

    // === Motion ===
    /// Velocity multiplier per frame
    pub damping: f32,
    /// Speeds below this snap to zero after damping (0 disables)
    pub rest_epsilon: f32,

    // === Repulsion ===
    pub repulsion_strength: f32,
    pub repulsion_pairs: RepulsionPairs,

    // === Input ===
    pub launch_speed: f32,

    // === Spawning ===
    pub min_radius: f32,
    pub max_radius: f32,
    pub max_spawn_speed: f32,
    /// Balls spawned when the simulation starts
    pub initial_balls: u32,
    /// Fixed RNG seed (None = seed from the clock)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,

            damping: DAMPING,
            rest_epsilon: 0.0,

            repulsion_strength: REPULSION_STRENGTH,
            repulsion_pairs: RepulsionPairs::Ordered,

            launch_speed: LAUNCH_SPEED,

            min_radius: MIN_BALL_RADIUS,
            max_radius: MAX_BALL_RADIUS,
            max_spawn_speed: MAX_SPAWN_SPEED,
            initial_balls: 0,
            seed: None,
        }
    }
}

impl Settings {
    /// Check that every value is usable by the simulation
    pub fn validate(&self) -> Result<(), SettingsError> {
        // Spawning samples ranges built from these, which must stay finite
        for (name, value) in [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("damping", self.damping),
            ("rest_epsilon", self.rest_epsilon),
            ("repulsion_strength", self.repulsion_strength),
            ("launch_speed", self.launch_speed),
            ("min_radius", self.min_radius),
            ("max_radius", self.max_radius),
            ("max_spawn_speed", self.max_spawn_speed),
        ] {
            if !(value.abs() <= MAX_MAGNITUDE) {
                return Err(SettingsError::OutOfRange { name, value });
            }
        }
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(SettingsError::CanvasSize {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(SettingsError::Damping(self.damping));
        }
        if !(self.min_radius > 0.0 && self.min_radius <= self.max_radius) {
            return Err(SettingsError::RadiusRange {
                min: self.min_radius,
                max: self.max_radius,
            });
        }
        for (name, value) in [
            ("launch_speed", self.launch_speed),
            ("max_spawn_speed", self.max_spawn_speed),
            ("rest_epsilon", self.rest_epsilon),
            ("repulsion_strength", self.repulsion_strength),
        ] {
            if !(value >= 0.0) {
                return Err(SettingsError::Negative { name, value });
            }
        }
        Ok(())
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string(self).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "billiards_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::warn!("Settings not saved: no LocalStorage");
            return;
        };
        match self.to_json() {
            Ok(json) => match storage.set_item(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Settings not saved: {:?}", e),
            },
            Err(e) => log::warn!("Settings not saved: {}", e),
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
