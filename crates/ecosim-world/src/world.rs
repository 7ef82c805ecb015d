//! Simulation engine: one `World` owns every entity and advances them a tick
//! at a time.

use crate::creature::{Creature, CreatureEvent};
use crate::effect::Effect;
use crate::food::{Food, FoodStore};
use crate::grid::SpatialGrid;
use crate::snapshot::{RenderItem, Snapshot};
use ecosim_core::{
    Bounds, CreatureId, EffectKind, EntityRole, Error, FoodId, PopulationHistory,
    PopulationStats, Result, SimConfig, Vec2,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, event, info, instrument, trace, Level};

pub struct World {
    config: SimConfig,
    bounds: Bounds,
    rng: ChaCha8Rng,
    creatures: Vec<Creature>,
    /// Indices into `creatures`, rebuilt at the end of every tick
    creature_grid: SpatialGrid<usize>,
    foods: FoodStore,
    effects: Vec<Effect>,
    food_spawn_timer: f32,
    stats: PopulationStats,
    history: PopulationHistory,
}

impl World {
    /// Build a world from configuration, seeding its RNG from `world.seed`
    /// or from the OS when no seed is given.
    pub fn new(config: SimConfig) -> Result<Self> {
        let rng = match config.world.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    #[instrument(skip_all, fields(width = config.world.width, height = config.world.height))]
    pub fn with_rng(config: SimConfig, rng: ChaCha8Rng) -> Result<Self> {
        config.validate()?;

        let bounds = config.world.bounds();
        let cell_size = config.world.cell_size;

        let mut world = Self {
            bounds,
            rng,
            creatures: Vec::with_capacity(config.world.initial_creatures),
            creature_grid: SpatialGrid::new(bounds, cell_size),
            foods: FoodStore::new(bounds, cell_size, config.food.max_food),
            effects: Vec::new(),
            food_spawn_timer: 0.0,
            stats: PopulationStats::default(),
            history: PopulationHistory::new(config.stats.history_length),
            config,
        };

        for _ in 0..world.config.world.initial_creatures {
            let position = bounds.random_point(&mut world.rng);
            let creature = Creature::with_random_heading(
                position,
                world.config.creature.initial_energy,
                &mut world.rng,
            );
            world.creatures.push(creature);
        }

        for _ in 0..world.config.world.initial_food {
            let position = bounds.random_point(&mut world.rng);
            if world.foods.spawn(position).is_some() {
                world.stats.total_food_spawned += 1;
            }
        }

        world.rebuild_creature_grid();
        world.refresh_counts();

        info!(
            creatures = world.creatures.len(),
            foods = world.foods.len(),
            cols = world.creature_grid.cols(),
            rows = world.creature_grid.rows(),
            "World created"
        );

        Ok(world)
    }

    /// Advance the simulation by `dt` seconds. Negative or non-finite `dt`
    /// is treated as zero.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            debug!(dt, "Rejected dt, treating as zero");
            0.0
        };

        // Effects emitted during this tick start fading on the next one
        let aged_effects = self.effects.len();

        self.creature_grid.clear();
        self.update_creatures(dt);
        self.rebuild_creature_grid();
        self.spawn_food(dt);
        self.age_effects(dt, aged_effects);

        self.stats.tick += 1;
        self.stats.sim_time += dt as f64;
        self.refresh_counts();
        self.history.push(self.creatures.len());

        let interval = self.config.stats.report_interval_ticks;
        if interval > 0 && self.stats.tick % interval == 0 {
            self.emit_population_metrics();
        }
    }

    /// Run every creature's behavior, then swap in the survivors followed by
    /// this tick's offspring.
    fn update_creatures(&mut self, dt: f32) {
        let creatures = std::mem::take(&mut self.creatures);
        let mut survivors = Vec::with_capacity(creatures.len());
        let mut newborns = Vec::new();

        for mut creature in creatures {
            let events = creature.update(
                dt,
                &mut self.foods,
                self.bounds,
                &self.config.creature,
                &mut self.rng,
            );

            for creature_event in events {
                self.apply_event(&creature, creature_event, &mut newborns);
            }

            if creature.is_alive() {
                survivors.push(creature);
            }
        }

        survivors.append(&mut newborns);
        self.creatures = survivors;
    }

    fn apply_event(
        &mut self,
        creature: &Creature,
        creature_event: CreatureEvent,
        newborns: &mut Vec<Creature>,
    ) {
        let lifetime = self.config.effect.lifetime;

        match creature_event {
            CreatureEvent::Ate { .. } => {
                self.stats.total_food_eaten += 1;
            }

            CreatureEvent::Reproduced { child } => {
                debug!(
                    event = "creature_birth",
                    parent_id = %creature.id,
                    child_id = %child.id,
                    generation = child.generation,
                    parent_energy = creature.energy,
                    child_energy = child.energy,
                    tick = self.stats.tick,
                    "Creature reproduced"
                );
                self.effects
                    .push(Effect::new(EffectKind::Birth, creature.position, lifetime));
                self.stats.total_births += 1;
                newborns.push(child);
            }

            CreatureEvent::Died { position } => {
                debug!(
                    event = "creature_death",
                    creature_id = %creature.id,
                    age = creature.age,
                    generation = creature.generation,
                    offspring_count = creature.offspring_count,
                    food_eaten = creature.food_eaten,
                    tick = self.stats.tick,
                    "Creature died"
                );
                self.effects
                    .push(Effect::new(EffectKind::Death, position, lifetime));
                self.stats.total_deaths += 1;
            }
        }
    }

    fn rebuild_creature_grid(&mut self) {
        self.creature_grid.clear();
        for (index, creature) in self.creatures.iter().enumerate() {
            self.creature_grid.insert(index, creature.position);
        }
    }

    /// Spawn one food per elapsed interval, up to the live cap
    fn spawn_food(&mut self, dt: f32) {
        let interval = self.config.food.spawn_interval;
        self.food_spawn_timer += dt;

        while self.food_spawn_timer >= interval {
            if self.foods.is_full() {
                // Every remaining spawn this tick would be skipped too
                self.food_spawn_timer %= interval;
                trace!(cap = self.foods.max_food(), "Food spawn skipped at cap");
                break;
            }
            self.food_spawn_timer -= interval;

            let position = self.bounds.random_point(&mut self.rng);
            if self.foods.spawn(position).is_some() {
                self.stats.total_food_spawned += 1;
            }
        }
    }

    /// Age the first `count` effects, those that existed before this tick
    fn age_effects(&mut self, dt: f32, count: usize) {
        for effect in self.effects.iter_mut().take(count) {
            effect.tick(dt);
        }
        self.effects.retain(|effect| !effect.is_expired());
    }

    fn refresh_counts(&mut self) {
        self.stats
            .record_counts(self.creatures.len(), self.foods.len(), self.effects.len());
    }

    fn emit_population_metrics(&self) {
        let population = self.creatures.len();
        let (energy_sum, max_energy) = self
            .creatures
            .iter()
            .fold((0.0f64, 0.0f32), |(sum, max), c| {
                (sum + c.energy as f64, max.max(c.energy))
            });
        let avg_energy = if population > 0 {
            energy_sum / population as f64
        } else {
            0.0
        };
        let max_generation = self
            .creatures
            .iter()
            .map(|c| c.generation)
            .max()
            .unwrap_or(0);

        info!(
            event = "population_metrics",
            tick = self.stats.tick,
            sim_time = self.stats.sim_time,
            creatures = population,
            foods = self.foods.len(),
            effects = self.effects.len(),
            avg_energy = avg_energy,
            max_energy = max_energy,
            max_generation = max_generation,
            total_births = self.stats.total_births,
            total_deaths = self.stats.total_deaths,
            total_food_eaten = self.stats.total_food_eaten,
            peak_population = self.stats.peak_population,
            "Population metrics snapshot"
        );

        event!(
            Level::INFO,
            gauge_name = "population_total",
            gauge_value = population,
            tick = self.stats.tick,
            "Population gauge"
        );

        event!(
            Level::INFO,
            gauge_name = "food_total",
            gauge_value = self.foods.len(),
            tick = self.stats.tick,
            "Food gauge"
        );
    }

    /// Add a creature outside the normal birth path. The position is clamped
    /// into the world.
    pub fn spawn_creature_at(&mut self, position: Vec2, energy: f32) -> Option<CreatureId> {
        if !position.is_finite() || !energy.is_finite() || energy <= 0.0 {
            return None;
        }
        let position = position.clamp(
            Vec2::ZERO,
            Vec2::new(self.bounds.width, self.bounds.height),
        );
        let creature = Creature::with_random_heading(position, energy, &mut self.rng);
        let id = creature.id;

        self.creature_grid.insert(self.creatures.len(), position);
        self.creatures.push(creature);
        self.refresh_counts();
        Some(id)
    }

    /// Place food at a point. `None` when the cap is reached or the point is
    /// outside the world.
    pub fn spawn_food_at(&mut self, position: Vec2) -> Option<FoodId> {
        let id = self.foods.spawn(position)?;
        self.stats.total_food_spawned += 1;
        self.refresh_counts();
        Some(id)
    }

    /// Change how often food arrives
    pub fn set_food_spawn_interval(&mut self, interval: f32) -> Result<()> {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "food spawn interval must be positive and finite, got {}",
                interval
            )));
        }
        self.config.food.spawn_interval = interval;
        Ok(())
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn foods(&self) -> impl Iterator<Item = &Food> + '_ {
        self.foods.iter()
    }

    pub fn food_store(&self) -> &FoodStore {
        &self.foods
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn creature_grid(&self) -> &SpatialGrid<usize> {
        &self.creature_grid
    }

    /// Creatures within `radius` of `center`, found through the grid
    pub fn creatures_near(&self, center: Vec2, radius: f32) -> Vec<&Creature> {
        let radius_sq = radius.max(0.0).powi(2);
        self.creature_grid
            .query(center, radius)
            .filter_map(|index| self.creatures.get(index))
            .filter(|c| c.position.distance_squared(center) <= radius_sq)
            .collect()
    }

    pub fn stats(&self) -> &PopulationStats {
        &self.stats
    }

    pub fn history(&self) -> &PopulationHistory {
        &self.history
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn food_spawn_timer(&self) -> f32 {
        self.food_spawn_timer
    }

    /// Positions and numeric state of everything drawable
    pub fn snapshot(&self) -> Snapshot {
        let mut items =
            Vec::with_capacity(self.creatures.len() + self.foods.len() + self.effects.len());

        items.extend(self.creatures.iter().map(|c| RenderItem {
            role: EntityRole::Creature,
            x: c.position.x,
            y: c.position.y,
            energy: Some(c.energy),
            opacity: None,
        }));
        items.extend(self.foods.iter().map(|f| RenderItem {
            role: EntityRole::Food,
            x: f.position.x,
            y: f.position.y,
            energy: None,
            opacity: None,
        }));
        items.extend(self.effects.iter().map(|e| RenderItem {
            role: EntityRole::Effect(e.kind),
            x: e.position.x,
            y: e.position.y,
            energy: None,
            opacity: Some(e.opacity()),
        }));

        Snapshot {
            width: self.bounds.width,
            height: self.bounds.height,
            stats: self.stats.clone(),
            population_history: self.history.iter().collect(),
            items,
        }
    }
}
