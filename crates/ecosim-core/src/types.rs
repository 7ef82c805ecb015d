//! Core type definitions for the simulation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use glam::Vec2;

/// Unique identifier for a creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreatureId(pub Uuid);

impl CreatureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CreatureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a food item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FoodId(pub Uuid);

impl FoodId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FoodId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which walls a reflection bounced off
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reflection {
    pub x: bool,
    pub y: bool,
}

impl Reflection {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Rectangular simulation area anchored at the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Half-open containment test over `[0, width) x [0, height)`
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.width && p.y < self.height
    }

    /// Clamp `position` into `[0, width] x [0, height]`, negating the velocity
    /// component of every axis that was crossed.
    pub fn reflect(&self, position: &mut Vec2, velocity: &mut Vec2) -> Reflection {
        let mut reflection = Reflection::default();

        if position.x < 0.0 {
            position.x = 0.0;
            velocity.x = -velocity.x;
            reflection.x = true;
        } else if position.x > self.width {
            position.x = self.width;
            velocity.x = -velocity.x;
            reflection.x = true;
        }

        if position.y < 0.0 {
            position.y = 0.0;
            velocity.y = -velocity.y;
            reflection.y = true;
        } else if position.y > self.height {
            position.y = self.height;
            velocity.y = -velocity.y;
            reflection.y = true;
        }

        reflection
    }

    /// Uniformly random point inside the half-open area
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(rng.gen_range(0.0..self.width), rng.gen_range(0.0..self.height))
    }
}

/// Kind of cosmetic marker emitted on lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Birth,
    Death,
}

/// Role of an entity at the render boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
    Creature,
    Food,
    Effect(EffectKind),
}
