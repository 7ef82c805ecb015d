//! Configuration types for the simulation.

use crate::{Bounds, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the simulation area
    pub width: f32,
    /// Height of the simulation area
    pub height: f32,
    /// Edge length of a spatial grid cell
    pub cell_size: f32,
    /// Creatures placed at construction
    pub initial_creatures: usize,
    /// Food placed at construction
    pub initial_food: usize,
    /// Random seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            cell_size: 100.0,
            initial_creatures: 50,
            initial_food: 200,
            seed: None,
        }
    }
}

impl WorldConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Cells a grid over these bounds needs, rejecting grids larger than
    /// `MAX_GRID_CELLS`
    pub fn grid_cells(&self) -> Result<u64> {
        let cols = (f64::from(self.width) / f64::from(self.cell_size)).ceil().max(1.0);
        let rows = (f64::from(self.height) / f64::from(self.cell_size)).ceil().max(1.0);
        let cells = cols * rows;
        if cells.is_finite() && cells <= MAX_GRID_CELLS as f64 {
            Ok(cells as u64)
        } else {
            Err(Error::InvalidConfig(format!(
                "world of {}x{} with cell_size {} needs {} grid cells, limit is {}",
                self.width, self.height, self.cell_size, cells, MAX_GRID_CELLS
            )))
        }
    }
}

/// Creature behaviour and energy parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureConfig {
    /// Maximum distance at which food is detected
    pub vision_radius: f32,
    /// Speed while pursuing food (units/s)
    pub forage_speed: f32,
    /// Speed while wandering (units/s)
    pub wander_speed: f32,
    /// Maximum heading perturbation per tick (radians)
    pub wander_jitter: f32,
    /// Distance below which food is eaten
    pub eat_radius: f32,
    /// Energy gained per food eaten
    pub food_energy_gain: f32,
    /// Energy lost per second
    pub drain_rate: f32,
    /// Energy above which a creature splits
    pub reproduction_threshold: f32,
    /// Energy of seeded creatures
    pub initial_energy: f32,
    /// Maximum per-axis offset of a child from its parent
    pub offspring_spread: f32,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            vision_radius: 100.0,
            forage_speed: 50.0,
            wander_speed: 20.0,
            wander_jitter: 0.15,
            eat_radius: 5.0,
            food_energy_gain: 50.0,
            drain_rate: 5.0,
            reproduction_threshold: 150.0,
            initial_energy: 100.0,
            offspring_spread: 5.0,
        }
    }
}

/// Food spawner parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    /// Seconds of simulated time between spawns
    pub spawn_interval: f32,
    /// Hard cap on live food
    pub max_food: usize,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            spawn_interval: 0.1,
            max_food: 5000,
        }
    }
}

/// Cosmetic effect parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Seconds an effect stays visible
    pub lifetime: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self { lifetime: 0.3 }
    }
}

/// Statistics parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Number of population samples kept for trend display
    pub history_length: usize,
    /// Ticks between population metric log events (0 disables)
    pub report_interval_ticks: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            history_length: 3000,
            report_interval_ticks: 100,
        }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub creature: CreatureConfig,
    pub food: FoodConfig,
    pub effect: EffectConfig,
    pub stats: StatsConfig,
}

/// Upper bound on spatial grid cells, per grid
pub const MAX_GRID_CELLS: u64 = 1 << 24;

fn require_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

fn require_non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{} must be non-negative and finite, got {}",
            name, value
        )))
    }
}

fn require_at_most(name: &str, value: f32, max: f32) -> Result<()> {
    require_non_negative(name, value)?;
    if value <= max {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{} must be at most {}, got {}",
            name, max, value
        )))
    }
}

impl SimConfig {
    /// Reject knobs the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        require_positive("world.width", self.world.width)?;
        require_positive("world.height", self.world.height)?;
        require_positive("world.cell_size", self.world.cell_size)?;
        self.world.grid_cells()?;

        let c = &self.creature;
        require_non_negative("creature.vision_radius", c.vision_radius)?;
        require_non_negative("creature.forage_speed", c.forage_speed)?;
        require_non_negative("creature.wander_speed", c.wander_speed)?;
        require_at_most("creature.wander_jitter", c.wander_jitter, std::f32::consts::PI)?;
        require_non_negative("creature.eat_radius", c.eat_radius)?;
        require_non_negative("creature.food_energy_gain", c.food_energy_gain)?;
        require_non_negative("creature.drain_rate", c.drain_rate)?;
        require_positive("creature.reproduction_threshold", c.reproduction_threshold)?;
        require_positive("creature.initial_energy", c.initial_energy)?;
        require_at_most(
            "creature.offspring_spread",
            c.offspring_spread,
            self.world.width.min(self.world.height),
        )?;

        require_positive("food.spawn_interval", self.food.spawn_interval)?;
        require_positive("effect.lifetime", self.effect.lifetime)?;

        if self.stats.history_length == 0 {
            return Err(Error::InvalidConfig(
                "stats.history_length must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Host loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Frames per second of the host clock
    pub frame_rate_hz: u32,
    /// Initial speed multiplier applied to frame time
    pub speed: f32,
    /// Start with the simulation paused
    pub start_paused: bool,
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
    /// Where to write render snapshots
    pub snapshot_path: Option<String>,
    /// Ticks between snapshots (0 disables)
    pub snapshot_interval_ticks: u64,
    /// Default log filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: 60,
            speed: 1.0,
            start_paused: false,
            max_ticks: None,
            snapshot_path: None,
            snapshot_interval_ticks: 0,
            log_filter: "info,ecosim_world=debug".to_string(),
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sim: SimConfig,
    pub runner: RunnerConfig,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.sim.validate()?;
        if self.runner.frame_rate_hz == 0 {
            return Err(Error::InvalidConfig(
                "runner.frame_rate_hz must be at least 1".to_string(),
            ));
        }
        require_non_negative("runner.speed", self.runner.speed)
    }
}
