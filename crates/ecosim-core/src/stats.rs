//! Population statistics and trend tracking.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Graphs never scale below this many creatures
const MIN_GRAPH_SCALE: usize = 10;

/// Fixed-capacity FIFO of creature counts, one sample per tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationHistory {
    capacity: usize,
    samples: VecDeque<usize>,
}

impl PopulationHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, evicting the oldest once full
    pub fn push(&mut self, count: usize) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(count);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<usize> {
        self.samples.back().copied()
    }

    /// Largest sample, floored so an empty or tiny series still has a usable scale
    pub fn max(&self) -> usize {
        self.samples
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
            .max(MIN_GRAPH_SCALE)
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.samples.iter().copied()
    }
}

/// Read-only counters refreshed at the end of every tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    /// Ticks completed
    pub tick: u64,
    /// Simulated seconds elapsed
    pub sim_time: f64,
    pub creatures: usize,
    pub foods: usize,
    pub effects: usize,
    pub total_births: u64,
    pub total_deaths: u64,
    pub total_food_eaten: u64,
    pub total_food_spawned: u64,
    pub peak_population: usize,
}

impl PopulationStats {
    /// Refresh the live counts after a tick
    pub fn record_counts(&mut self, creatures: usize, foods: usize, effects: usize) {
        self.creatures = creatures;
        self.foods = foods;
        self.effects = effects;
        self.peak_population = self.peak_population.max(creatures);
    }
}
