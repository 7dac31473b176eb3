//! Rolling terrain-roughness estimator.

use serde::{Deserialize, Serialize};

/// Terrain state carried between force updates.
///
/// Both timers count down in seconds and never go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TerrainState {
    /// Exponential moving average of `|vertical_g|`.
    pub smoothed_roughness: f32,
    /// Seconds remaining of the active impact effect.
    pub impact_timer: f32,
    /// Seconds before a new impact may be detected.
    pub impact_cooldown: f32,
    /// Vertical acceleration (m/s²) seen on the previous force update.
    pub last_vertical_acceleration: f32,
}

impl TerrainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decay both timers by `delta_time` seconds, clamping at zero.
    pub fn update(&mut self, delta_time: f32) {
        if self.impact_timer > 0.0 {
            self.impact_timer = (self.impact_timer - delta_time).max(0.0);
        }
        if self.impact_cooldown > 0.0 {
            self.impact_cooldown = (self.impact_cooldown - delta_time).max(0.0);
        }
    }

    /// Fold one roughness sample into the moving average. `retain` is the
    /// weight kept from the previous average.
    pub fn smooth(&mut self, roughness: f32, retain: f32) {
        self.smoothed_roughness = self.smoothed_roughness * retain + roughness * (1.0 - retain);
    }

    /// Arm an impact window.
    pub fn arm_impact(&mut self, duration: f32, cooldown: f32) {
        self.impact_timer = duration;
        self.impact_cooldown = cooldown;
    }

    pub fn impact_active(&self) -> bool {
        self.impact_timer > 0.0
    }

    pub fn in_cooldown(&self) -> bool {
        self.impact_cooldown > 0.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
