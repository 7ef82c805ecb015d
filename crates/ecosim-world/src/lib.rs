//! Artificial-life simulation engine.
//!
//! Creatures forage for food on a bounded 2D plane, burn energy over time,
//! split when they have enough and die when they run out. [`World`] owns every
//! entity and advances them one tick at a time.

pub mod grid;
pub mod food;
pub mod creature;
pub mod effect;
pub mod snapshot;
pub mod world;

pub use grid::SpatialGrid;
pub use food::{Food, FoodSighting, FoodStore};
pub use creature::{Creature, CreatureEvent};
pub use effect::Effect;
pub use snapshot::{RenderItem, Snapshot};
pub use world::World;
