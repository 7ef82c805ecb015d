//! Short-lived cosmetic markers for births and deaths.

use ecosim_core::{EffectKind, Vec2};
use serde::{Deserialize, Serialize};

/// A fading pulse with no influence on the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub position: Vec2,
    pub remaining_lifetime: f32,
    pub total_lifetime: f32,
}

impl Effect {
    pub fn new(kind: EffectKind, position: Vec2, lifetime: f32) -> Self {
        Self {
            kind,
            position,
            remaining_lifetime: lifetime,
            total_lifetime: lifetime,
        }
    }

    /// Age the effect by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        self.remaining_lifetime -= dt;
    }

    /// `remaining / total`, clamped to `[0, 1]`
    pub fn opacity(&self) -> f32 {
        if self.total_lifetime <= 0.0 {
            return 0.0;
        }
        (self.remaining_lifetime / self.total_lifetime).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_lifetime <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_fades() {
        let mut effect = Effect::new(EffectKind::Birth, Vec2::new(1.0, 2.0), 0.4);
        assert_eq!(effect.opacity(), 1.0);

        effect.tick(0.1);
        assert!((effect.opacity() - 0.75).abs() < 1e-6);
        assert!(!effect.is_expired());

        effect.tick(0.5);
        assert_eq!(effect.opacity(), 0.0);
        assert!(effect.is_expired());
    }

    #[test]
    fn test_zero_lifetime_is_expired() {
        let effect = Effect::new(EffectKind::Death, Vec2::ZERO, 0.0);
        assert!(effect.is_expired());
        assert_eq!(effect.opacity(), 0.0);
    }
}
