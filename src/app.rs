//! Frame loop driver
//!
//! `Simulation` owns the world, the input controller and the settings. The
//! host calls `frame` once per display refresh and only schedules the next
//! frame while it returns `LoopControl::Continue`.

use crate::renderer::{DrawSurface, draw_world};
use crate::settings::Settings;
use crate::sim::{BallId, Bounds, InputController, PaletteColor, PointerEvent, World, step};

/// Whether the host should schedule another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

pub struct Simulation {
    pub world: World,
    pub input: InputController,
    pub settings: Settings,
    running: bool,
}

impl Simulation {
    /// Build a simulation and spawn `settings.initial_balls` balls
    ///
    /// `settings.seed` wins over `fallback_seed` when present. Settings that
    /// fail validation are replaced by the defaults.
    pub fn new(settings: Settings, fallback_seed: u64) -> Self {
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                log::warn!("Invalid settings ({}), using defaults", e);
                Settings::default()
            }
        };
        let seed = settings.seed.unwrap_or(fallback_seed);
        let bounds = Bounds::new(settings.canvas_width, settings.canvas_height);
        let mut sim = Self {
            world: World::new(bounds, seed),
            input: InputController::new(),
            settings,
            running: true,
        };
        for _ in 0..sim.settings.initial_balls {
            sim.add_ball();
        }
        log::info!(
            "Simulation created with seed {} and {} balls",
            seed,
            sim.world.len()
        );
        sim
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the loop; the next `frame` call draws nothing and returns `Stop`
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Simulation stopped after {} frames", self.world.frame);
        }
        self.running = false;
    }

    /// Redraw the scene, then advance one step
    pub fn frame<S: DrawSurface + ?Sized>(&mut self, surface: &mut S) -> LoopControl {
        if !self.running {
            return LoopControl::Stop;
        }
        draw_world(surface, &self.world);
        step(&mut self.world, &self.settings);
        LoopControl::Continue
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        self.input
            .handle(&mut self.world, event, self.settings.launch_speed);
    }

    pub fn add_ball(&mut self) -> BallId {
        self.world.spawn_random(&self.settings)
    }

    pub fn set_selected_color(&mut self, color: PaletteColor) -> bool {
        self.input.set_selected_color(&mut self.world, color)
    }

    pub fn selected(&self) -> Option<BallId> {
        self.input.selected()
    }
}
