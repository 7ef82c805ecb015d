//! Render-facing view of the world.

use ecosim_core::{EntityRole, PopulationStats};
use serde::{Deserialize, Serialize};

/// One drawable entity: a role, a position and its numeric state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderItem {
    pub role: EntityRole,
    pub x: f32,
    pub y: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: f32,
    pub height: f32,
    pub stats: PopulationStats,
    pub population_history: Vec<usize>,
    pub items: Vec<RenderItem>,
}

impl Snapshot {
    pub fn count(&self, role: EntityRole) -> usize {
        self.items.iter().filter(|item| item.role == role).count()
    }

    pub fn to_json(&self) -> ecosim_core::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
