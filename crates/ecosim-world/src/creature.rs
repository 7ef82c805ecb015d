//! Creature state and per-tick behavior.

use crate::food::{FoodSighting, FoodStore};
use ecosim_core::{Bounds, CreatureConfig, CreatureId, FoodId, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};
use tracing::trace;

/// Something that happened to a creature during its update, for the world to
/// apply once the creature's own state has been settled.
#[derive(Debug, Clone, PartialEq)]
pub enum CreatureEvent {
    /// Food was taken out of the live set and its energy absorbed
    Ate { food: FoodId, energy_gained: f32 },
    /// Energy crossed the threshold and was split with a new creature
    Reproduced { child: Creature },
    /// Energy ran out at `position`
    Died { position: Vec2 },
}

/// An autonomous forager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub id: CreatureId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub energy: f32,
    /// Heading used while no food is visible; perturbed, never reset
    pub wander_heading: f32,
    pub alive: bool,
    /// Simulated seconds since birth
    pub age: f32,
    pub generation: u32,
    pub offspring_count: u32,
    pub food_eaten: u32,
}

impl Creature {
    pub fn new(position: Vec2, energy: f32, wander_heading: f32) -> Self {
        Self {
            id: CreatureId::new(),
            position,
            velocity: Vec2::ZERO,
            energy,
            wander_heading,
            alive: true,
            age: 0.0,
            generation: 0,
            offspring_count: 0,
            food_eaten: 0,
        }
    }

    /// A creature with a random wander heading
    pub fn with_random_heading<R: Rng + ?Sized>(
        position: Vec2,
        energy: f32,
        rng: &mut R,
    ) -> Self {
        Self::new(position, energy, rng.gen_range(0.0..TAU))
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Advance this creature by `dt` seconds.
    ///
    /// Food is consumed directly from `foods`; everything that needs the
    /// world (offspring, effects) is reported through the returned events.
    /// Dead creatures do nothing.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        foods: &mut FoodStore,
        bounds: Bounds,
        config: &CreatureConfig,
        rng: &mut R,
    ) -> Vec<CreatureEvent> {
        let mut events = Vec::new();
        if !self.alive {
            return events;
        }

        self.age += dt;

        let arrival = match foods.nearest(self.position, config.vision_radius) {
            Some(sighting) => self.forage(sighting, dt, foods, config, &mut events),
            None => {
                self.wander(config, rng);
                None
            }
        };

        match arrival {
            Some(target) => self.position = target,
            None => self.position += self.velocity * dt,
        }

        let reflection = bounds.reflect(&mut self.position, &mut self.velocity);
        if reflection.x {
            self.wander_heading = PI - self.wander_heading;
        }
        if reflection.y {
            self.wander_heading = -self.wander_heading;
        }
        self.wander_heading = self.wander_heading.rem_euclid(TAU);

        self.energy -= config.drain_rate * dt;
        if self.energy <= 0.0 {
            self.alive = false;
            events.push(CreatureEvent::Died {
                position: self.position,
            });
            return events;
        }

        if self.energy > config.reproduction_threshold {
            let child = self.reproduce(bounds, config, rng);
            events.push(CreatureEvent::Reproduced { child });
        }

        events
    }

    /// Steer toward the sighted food and eat it when close enough. Returns
    /// the food position if this tick's movement would reach it.
    fn forage(
        &mut self,
        sighting: FoodSighting,
        dt: f32,
        foods: &mut FoodStore,
        config: &CreatureConfig,
        events: &mut Vec<CreatureEvent>,
    ) -> Option<Vec2> {
        let offset = sighting.position - self.position;
        let distance = offset.length();

        // Sitting exactly on the food: no direction to normalize
        self.velocity = if distance > 0.0 {
            offset / distance * config.forage_speed
        } else {
            Vec2::ZERO
        };

        if distance < config.eat_radius {
            if let Some(food) = foods.consume(sighting.id) {
                self.energy += config.food_energy_gain;
                self.food_eaten += 1;
                trace!(
                    creature_id = %self.id,
                    food_id = %food.id,
                    energy = self.energy,
                    "Creature ate food"
                );
                events.push(CreatureEvent::Ate {
                    food: food.id,
                    energy_gained: config.food_energy_gain,
                });
            }
        }

        if distance <= config.forage_speed * dt {
            Some(sighting.position)
        } else {
            None
        }
    }

    fn wander<R: Rng + ?Sized>(&mut self, config: &CreatureConfig, rng: &mut R) {
        let jitter = config.wander_jitter;
        self.wander_heading += rng.gen_range(-jitter..=jitter);
        self.velocity = Vec2::new(self.wander_heading.cos(), self.wander_heading.sin())
            * config.wander_speed;
    }

    /// Halve this creature's energy and hand the other half to a child
    /// placed near it.
    fn reproduce<R: Rng + ?Sized>(
        &mut self,
        bounds: Bounds,
        config: &CreatureConfig,
        rng: &mut R,
    ) -> Creature {
        let half = self.energy * 0.5;
        self.energy = half;
        self.offspring_count += 1;

        let spread = config.offspring_spread;
        let offset = Vec2::new(
            rng.gen_range(-spread..=spread),
            rng.gen_range(-spread..=spread),
        );
        let position = (self.position + offset).clamp(
            Vec2::ZERO,
            Vec2::new(bounds.width, bounds.height),
        );

        let mut child = Creature::with_random_heading(position, half, rng);
        child.generation = self.generation + 1;
        child
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup() -> (FoodStore, Bounds, CreatureConfig, ChaCha8Rng) {
        let bounds = Bounds::new(1000.0, 1000.0);
        (
            FoodStore::new(bounds, 100.0, 5000),
            bounds,
            CreatureConfig::default(),
            ChaCha8Rng::seed_from_u64(42),
        )
    }

    #[test]
    fn test_creature_creation() {
        let creature = Creature::new(Vec2::new(5.0, 5.0), 100.0, 0.0);
        assert!(creature.is_alive());
        assert_eq!(creature.energy, 100.0);
        assert_eq!(creature.velocity, Vec2::ZERO);
        assert_eq!(creature.generation, 0);
    }

    #[test]
    fn test_wander_drains_exactly() {
        let (mut foods, bounds, config, mut rng) = setup();
        let mut creature = Creature::new(Vec2::new(500.0, 500.0), 100.0, 0.0);

        let events = creature.update(0.5, &mut foods, bounds, &config, &mut rng);

        assert!(events.is_empty());
        assert_eq!(creature.energy, 100.0 - config.drain_rate * 0.5);
        assert!((creature.velocity.length() - config.wander_speed).abs() < 1e-4);
    }

    #[test]
    fn test_wander_heading_perturbation_is_bounded() {
        let (mut foods, bounds, config, mut rng) = setup();
        let mut creature = Creature::new(Vec2::new(500.0, 500.0), 1000.0, 1.0);

        for _ in 0..50 {
            let before = creature.wander_heading;
            creature.update(0.01, &mut foods, bounds, &config, &mut rng);
            let mut delta = (creature.wander_heading - before).rem_euclid(TAU);
            if delta > PI {
                delta -= TAU;
            }
            assert!(delta.abs() <= config.wander_jitter + 1e-5);
        }
    }

    #[test]
    fn test_forage_moves_toward_food() {
        let (mut foods, bounds, config, mut rng) = setup();
        foods.spawn(Vec2::new(560.0, 500.0)).unwrap();
        let mut creature = Creature::new(Vec2::new(500.0, 500.0), 100.0, 0.0);

        let events = creature.update(0.1, &mut foods, bounds, &config, &mut rng);

        assert!(events.is_empty());
        assert_eq!(creature.velocity, Vec2::new(config.forage_speed, 0.0));
        assert!((creature.position.x - 505.0).abs() < 1e-4);
        assert_eq!(foods.len(), 1);
    }

    #[test]
    fn test_food_outside_vision_ignored() {
        let (mut foods, bounds, config, mut rng) = setup();
        foods.spawn(Vec2::new(700.0, 500.0)).unwrap();
        let mut creature = Creature::new(Vec2::new(500.0, 500.0), 100.0, 0.0);

        creature.update(0.1, &mut foods, bounds, &config, &mut rng);

        assert!((creature.velocity.length() - config.wander_speed).abs() < 1e-4);
    }

    #[test]
    fn test_eats_food_on_top_of_it() {
        let (mut foods, bounds, config, mut rng) = setup();
        let food = foods.spawn(Vec2::new(300.0, 300.0)).unwrap();
        let mut creature = Creature::new(Vec2::new(300.0, 300.0), 100.0, 0.0);

        let events = creature.update(1.0, &mut foods, bounds, &config, &mut rng);

        assert_eq!(
            events,
            vec![CreatureEvent::Ate {
                food,
                energy_gained: 50.0
            }]
        );
        assert!(creature.velocity.is_finite());
        assert_eq!(creature.position, Vec2::new(300.0, 300.0));
        assert_eq!(creature.energy, 145.0);
        assert!(foods.is_empty());
    }

    #[test]
    fn test_starvation() {
        let (mut foods, bounds, config, mut rng) = setup();
        let mut creature = Creature::new(Vec2::new(10.0, 10.0), 4.0, 0.0);

        let events = creature.update(1.0, &mut foods, bounds, &config, &mut rng);

        assert!(!creature.is_alive());
        assert_eq!(creature.energy, -1.0);
        assert!(matches!(events.as_slice(), [CreatureEvent::Died { .. }]));

        // A dead creature stays inert
        assert!(creature.update(1.0, &mut foods, bounds, &config, &mut rng).is_empty());
    }

    #[test]
    fn test_reproduction_splits_energy() {
        let (mut foods, bounds, config, mut rng) = setup();
        let mut creature = Creature::new(Vec2::new(500.0, 500.0), 200.0, 0.0);

        let events = creature.update(1.0, &mut foods, bounds, &config, &mut rng);

        let child = match events.as_slice() {
            [CreatureEvent::Reproduced { child }] => child.clone(),
            other => panic!("expected one reproduction, got {:?}", other),
        };
        assert_eq!(creature.energy, 97.5);
        assert_eq!(child.energy, 97.5);
        assert_eq!(child.generation, 1);
        assert_eq!(creature.offspring_count, 1);
        assert_ne!(child.id, creature.id);
        let max_offset = config.offspring_spread * 2.0_f32.sqrt() + 1e-3;
        assert!(child.position.distance(creature.position) <= max_offset);
    }

    #[test]
    fn test_child_clamped_into_bounds() {
        let (mut foods, bounds, config, mut rng) = setup();
        for _ in 0..20 {
            let mut creature = Creature::new(Vec2::new(0.0, 0.0), 400.0, 0.0);
            creature.wander_heading = PI * 1.25;
            let events = creature.update(0.0, &mut foods, bounds, &config, &mut rng);
            for event in events {
                if let CreatureEvent::Reproduced { child } = event {
                    assert!(child.position.x >= 0.0 && child.position.y >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_wall_reflects_heading() {
        let (mut foods, bounds, mut config, mut rng) = setup();
        config.wander_jitter = 0.0;
        let mut creature = Creature::new(Vec2::new(999.0, 500.0), 100.0, 0.0);

        creature.update(1.0, &mut foods, bounds, &config, &mut rng);

        assert_eq!(creature.position.x, 1000.0);
        assert!(creature.velocity.x < 0.0);
        assert!((creature.wander_heading - PI).abs() < 1e-5);
    }
}
