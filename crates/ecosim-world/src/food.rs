//! Stationary food and the live food set.

use crate::grid::SpatialGrid;
use ecosim_core::{Bounds, FoodId, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// A stationary energy resource
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,
    pub position: Vec2,
}

impl Food {
    pub fn new(position: Vec2) -> Self {
        Self {
            id: FoodId::new(),
            position,
        }
    }
}

/// Nearest food found by a vision query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodSighting {
    pub id: FoodId,
    pub position: Vec2,
    pub distance_sq: f32,
}

/// The live food set, indexed by a spatial grid that is kept in step with it.
///
/// Removal goes through [`FoodStore::consume`], which takes the food out of
/// both the map and the grid at once. A second consume of the same id finds
/// nothing, so each food can be eaten at most once.
#[derive(Debug, Clone)]
pub struct FoodStore {
    bounds: Bounds,
    max_food: usize,
    foods: HashMap<FoodId, Food>,
    grid: SpatialGrid<FoodId>,
}

impl FoodStore {
    pub fn new(bounds: Bounds, cell_size: f32, max_food: usize) -> Self {
        Self {
            bounds,
            max_food,
            foods: HashMap::new(),
            grid: SpatialGrid::new(bounds, cell_size),
        }
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    pub fn max_food(&self) -> usize {
        self.max_food
    }

    pub fn is_full(&self) -> bool {
        self.foods.len() >= self.max_food
    }

    /// Place a food at a fixed point. Returns `None` when the cap is reached
    /// or the point lies outside the world.
    pub fn spawn(&mut self, position: Vec2) -> Option<FoodId> {
        if self.is_full() {
            trace!(live = self.foods.len(), cap = self.max_food, "Food cap reached");
            return None;
        }
        if !self.bounds.contains(position) {
            trace!(x = position.x, y = position.y, "Food outside bounds rejected");
            return None;
        }

        let food = Food::new(position);
        let inserted = self.grid.insert(food.id, position);
        debug_assert!(inserted, "in-bounds food must land in a grid cell");
        self.foods.insert(food.id, food);
        Some(food.id)
    }

    pub fn contains(&self, id: FoodId) -> bool {
        self.foods.contains_key(&id)
    }

    pub fn get(&self, id: FoodId) -> Option<&Food> {
        self.foods.get(&id)
    }

    /// Take a food out of the live set. Yields `None` if it is already gone.
    pub fn consume(&mut self, id: FoodId) -> Option<Food> {
        let food = self.foods.remove(&id)?;
        let removed = self.grid.remove(id, food.position);
        debug_assert!(removed, "food grid out of sync with food set");
        Some(food)
    }

    /// Closest live food within `radius` of `center`. Ties keep the first
    /// candidate encountered.
    pub fn nearest(&self, center: Vec2, radius: f32) -> Option<FoodSighting> {
        let radius_sq = radius * radius;
        let mut best: Option<FoodSighting> = None;

        for id in self.grid.query(center, radius) {
            let Some(food) = self.foods.get(&id) else {
                continue;
            };
            let distance_sq = food.position.distance_squared(center);
            if distance_sq > radius_sq {
                continue;
            }
            if best.map_or(true, |b| distance_sq < b.distance_sq) {
                best = Some(FoodSighting {
                    id,
                    position: food.position,
                    distance_sq,
                });
            }
        }

        best
    }

    pub fn iter(&self) -> impl Iterator<Item = &Food> + '_ {
        self.foods.values()
    }
}
