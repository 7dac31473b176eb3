//! Steering force model.
//!
//! One call to [`ForceCalculator::calculate`] runs a fixed pipeline over the
//! latest telemetry sample. Later stages compound or override earlier ones:
//!
//! 1. base centering and damping by speed regime
//! 2. self-aligning torque folded into centering
//! 3. engine brake / retarder damping
//! 4. terrain roughness and impacts
//! 5. yaw dynamics (oversteer / understeer)
//! 6. steering kickback as a constant force
//!
//! Every stored value passes through [`clamp_to_byte`].

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use truckffb_telemetry::{TelemetrySample, TerrainState};

use crate::config::FfbConfig;

/// Centering ceiling applied by the terrain and understeer stages.
const DYNAMIC_CENTER_CAP: f32 = 80.0;
/// Damper ceiling applied by the terrain stage.
const TERRAIN_DAMPER_CAP: f32 = 8.0;
/// Engine speed above which hydraulic power steering is assumed running.
const POWER_STEERING_MIN_RPM: f32 = 500.0;

/// Device-level force parameters for one update.
///
/// When `use_constant_force` is set the wheel sends only the constant force
/// and ignores the spring, damper and autocenter fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceParameters {
    pub autocenter_force: u8,
    pub autocenter_slope: u8,
    pub damper_force_positive: u8,
    pub damper_force_negative: u8,
    pub constant_force: u8,
    pub use_constant_force: bool,
    pub spring_k1: u8,
    pub spring_k2: u8,
    pub spring_clip: u8,
    pub use_custom_spring: bool,
}

impl ForceParameters {
    /// Whether any damper side is non-zero.
    pub fn has_damper(&self) -> bool {
        self.damper_force_positive > 0 || self.damper_force_negative > 0
    }
}

/// Saturating conversion into a device byte. NaN maps to 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_to_byte(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0) as u8
}

/// Computes [`ForceParameters`] from telemetry.
///
/// The calculator itself is stateless; all rolling state lives in the
/// [`TerrainState`] the caller passes in.
#[derive(Debug, Clone)]
pub struct ForceCalculator {
    config: FfbConfig,
}

impl ForceCalculator {
    pub fn new(config: FfbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FfbConfig {
        &self.config
    }

    /// Run the force pipeline, advancing `terrain` by the nominal interval
    /// between force updates ([`FfbConfig::force_update_interval`]).
    pub fn calculate(&self, sample: &TelemetrySample, terrain: &mut TerrainState) -> ForceParameters {
        self.calculate_elapsed(sample, terrain, self.config.force_update_interval())
    }

    /// Run the force pipeline, advancing `terrain` by `elapsed` seconds.
    /// A negative or non-finite `elapsed` falls back to the nominal interval.
    pub fn calculate_elapsed(
        &self,
        sample: &TelemetrySample,
        terrain: &mut TerrainState,
        elapsed: f32,
    ) -> ForceParameters {
        let mut params = ForceParameters::default();

        let elapsed = if elapsed.is_finite() && elapsed >= 0.0 {
            elapsed
        } else {
            self.config.force_update_interval()
        };
        terrain.update(elapsed);

        self.base_forces(sample, &mut params);
        self.self_aligning_torque(sample, &mut params);
        self.brake_damping(sample, &mut params);
        self.terrain_effects(sample, terrain, &mut params);
        self.yaw_dynamics(sample, &mut params);
        self.steering_kickback(sample, &mut params);

        // Impact detection compares against the previous tick, so the
        // reference is only refreshed once this tick is done with it.
        terrain.last_vertical_acceleration = sample.linear_acceleration.y;

        params
    }

    fn has_power_steering(sample: &TelemetrySample) -> bool {
        sample.engine_enabled && sample.rpm > POWER_STEERING_MIN_RPM
    }

    fn centering_multiplier(sample: &TelemetrySample) -> f32 {
        if Self::has_power_steering(sample) { 0.7 } else { 1.0 }
    }

    fn power_steering_multiplier(sample: &TelemetrySample) -> f32 {
        let kmh = sample.speed_kmh();
        match (Self::has_power_steering(sample), kmh) {
            (true, v) if v < 10.0 => 0.7,
            (true, v) if v < 30.0 => 0.8,
            (true, _) => 0.9,
            (false, v) if v < 10.0 => 2.0,
            (false, v) if v < 30.0 => 1.6,
            (false, _) => 1.3,
        }
    }

    /// Autocenter slope for the highway regime, stepped by speed.
    fn highway_slope(&self, kmh: f32) -> u8 {
        let c = &self.config;
        if kmh < c.speed_medium_threshold {
            2
        } else if kmh < c.speed_high_threshold {
            3
        } else if kmh < c.speed_very_high_threshold {
            4
        } else {
            5
        }
    }

    fn base_forces(&self, sample: &TelemetrySample, params: &mut ForceParameters) {
        let c = &self.config;
        let kmh = sample.speed_kmh();
        let centering = Self::centering_multiplier(sample);
        let assist = Self::power_steering_multiplier(sample);

        if sample.speed.abs() < c.speed_stationary_threshold {
            params.autocenter_force = clamp_to_byte(c.center_stationary_force * centering);
            params.autocenter_slope = clamp_to_byte(c.center_stationary_slope);
            params.damper_force_positive = clamp_to_byte(c.damper_stationary_pos * assist);
            params.damper_force_negative = clamp_to_byte(c.damper_stationary_neg * assist);
        } else if kmh < c.speed_low_threshold {
            let force = c.center_low_speed_base + kmh * c.center_low_speed_factor;
            params.autocenter_force = clamp_to_byte(force * centering);
            params.autocenter_slope = 2;
            let damper = clamp_to_byte(c.damper_low_speed * assist);
            params.damper_force_positive = damper;
            params.damper_force_negative = damper;
        } else {
            params.autocenter_force = clamp_to_byte(c.center_highway_base * centering);
            params.autocenter_slope = self.highway_slope(kmh);
            let damper = (1.0 + kmh / c.damper_speed_factor) * assist;
            let damper = clamp_to_byte(damper.min(c.damper_max));
            params.damper_force_positive = damper;
            params.damper_force_negative = damper;
        }
    }

    fn self_aligning_torque(&self, sample: &TelemetrySample, params: &mut ForceParameters) {
        let c = &self.config;
        let abs_speed = sample.speed.abs();
        if abs_speed <= c.speed_stationary_threshold {
            return;
        }

        let kmh = sample.speed_kmh();
        let mut sat = abs_speed * c.sat_base_torque_factor * sample.steering.abs();

        if kmh > c.sat_speed_reduction_start {
            let fade = 1.0 - (kmh - c.sat_speed_reduction_start) / c.sat_speed_reduction_range;
            sat *= fade.max(c.sat_min_factor);
        }

        let lateral = (sample.lateral_g().abs() * c.sat_lateral_g_factor)
            .min(c.sat_max_lateral_reduction);
        sat *= 1.0 - lateral;

        let enhanced = f32::from(params.autocenter_force) + sat * c.center_highway_factor;
        params.autocenter_force = clamp_to_byte(enhanced.min(c.center_max_force));
    }

    fn brake_damping(&self, sample: &TelemetrySample, params: &mut ForceParameters) {
        let c = &self.config;
        if !sample.motor_brake && sample.retarder_level == 0 {
            return;
        }

        #[allow(clippy::cast_precision_loss)]
        let retarder = sample.retarder_level as f32;
        let mut factor = c.damper_brake_factor + retarder * c.damper_retarder_factor;
        if sample.motor_brake {
            factor += c.damper_engine_brake_factor;
        }

        let scale = |side: u8| clamp_to_byte((f32::from(side) * factor).min(c.damper_max_total));
        params.damper_force_positive = scale(params.damper_force_positive);
        params.damper_force_negative = scale(params.damper_force_negative);
    }

    /// Whether this tick's vertical acceleration is a terrain impact.
    ///
    /// All of the following must hold: the change from the previous tick
    /// clears a dynamic threshold, either the magnitude or the change clears a
    /// stricter multiple of it, the change exceeds an absolute floor, the truck
    /// is moving, and no cooldown is running.
    pub fn detect_terrain_impact(&self, sample: &TelemetrySample, terrain: &TerrainState) -> bool {
        let c = &self.config;
        let abs_speed = sample.speed.abs();
        let vertical = sample.linear_acceleration.y;
        let change = (vertical - terrain.last_vertical_acceleration).abs();

        let mut threshold = c.terrain_minor_threshold * 1.5;
        if abs_speed > 25.0 {
            threshold *= 1.5;
        }
        if sample.angular_velocity.y.abs() > 0.1 {
            threshold *= 1.2;
        }
        if sample.linear_acceleration.z.abs() > 1.0 {
            threshold *= 1.3;
        }

        change > threshold
            && (vertical.abs() > threshold * 1.5 || change > threshold * 1.2)
            && change > 0.05
            && abs_speed > 1.0
            && !terrain.in_cooldown()
    }

    fn terrain_effects(
        &self,
        sample: &TelemetrySample,
        terrain: &mut TerrainState,
        params: &mut ForceParameters,
    ) {
        let c = &self.config;
        let abs_speed = sample.speed.abs();
        let roughness = sample.vertical_g().abs();

        terrain.smooth(roughness, c.terrain_smoothing_factor);

        if self.detect_terrain_impact(sample, terrain) {
            debug!(
                vertical = sample.linear_acceleration.y,
                previous = terrain.last_vertical_acceleration,
                "terrain impact detected"
            );
            terrain.arm_impact(c.terrain_impact_duration, c.terrain_impact_cooldown);
        }

        let mut multiplier = 1.0_f32;
        let mut damping = 0.0_f32;
        let mut spring = None;

        if terrain.impact_active() {
            let intensity = terrain.impact_timer / c.terrain_impact_duration;
            multiplier += intensity * 1.5;
            damping += intensity * 3.0;
            spring = Some(clamp_to_byte(intensity * 25.0));
        } else if roughness > c.terrain_minor_threshold && abs_speed > 2.0 {
            let speed_factor = (abs_speed / 10.0).min(1.0);
            multiplier += roughness * 1.5 * speed_factor;
            damping += roughness * 1.2 * speed_factor;
            spring = Some(clamp_to_byte(2.0 + roughness * 8.0 * speed_factor));
        } else if terrain.smoothed_roughness > c.terrain_detection_threshold && abs_speed > 1.0 {
            let smoothed = terrain.smoothed_roughness;
            let speed_factor = (abs_speed / 8.0).min(1.0);
            if smoothed > c.terrain_major_threshold {
                trace!(smoothed, "offroad terrain");
                multiplier = 1.0 + c.terrain_offroad_multiplier * 0.2 * speed_factor;
                damping = smoothed * 1.2 * speed_factor;
            } else {
                multiplier = 1.0 + smoothed * speed_factor;
                damping = smoothed * 0.8 * speed_factor;
            }
            spring = Some(clamp_to_byte(1.0 + smoothed * 4.0 * speed_factor));
        }

        if multiplier > 1.0 || damping > 0.0 {
            let force = f32::from(params.autocenter_force) * multiplier;
            params.autocenter_force = clamp_to_byte(force.min(DYNAMIC_CENTER_CAP));
            let add = |side: u8| clamp_to_byte((f32::from(side) + damping).min(TERRAIN_DAMPER_CAP));
            params.damper_force_positive = add(params.damper_force_positive);
            params.damper_force_negative = add(params.damper_force_negative);
        }

        if let Some(intensity) = spring {
            params.use_custom_spring = true;
            params.spring_k1 = intensity;
            params.spring_k2 = intensity;
            params.spring_clip = clamp_to_byte(20.0 + f32::from(intensity) * 8.0);
        }
    }

    fn yaw_dynamics(&self, sample: &TelemetrySample, params: &mut ForceParameters) {
        let c = &self.config;
        let yaw = sample.yaw_rate();
        if yaw.abs() <= c.yaw_rate_threshold || sample.speed.abs() <= 5.0 {
            return;
        }

        let factor = (yaw.abs() * c.yaw_rate_factor).min(c.yaw_max_factor);
        let oversteer = (yaw > 0.0 && sample.steering > 0.0) || (yaw < 0.0 && sample.steering < 0.0);

        if oversteer {
            let force = f32::from(params.autocenter_force) * (1.0 - factor * c.oversteer_reduction);
            params.autocenter_force = clamp_to_byte(force);
            let add = factor * c.oversteer_damping_add;
            params.damper_force_positive = clamp_to_byte(f32::from(params.damper_force_positive) + add);
            params.damper_force_negative = clamp_to_byte(f32::from(params.damper_force_negative) + add);
        } else {
            let force = f32::from(params.autocenter_force) * (1.0 + factor * c.understeer_factor);
            params.autocenter_force = clamp_to_byte(force.min(DYNAMIC_CENTER_CAP));
        }
    }

    fn steering_kickback(&self, sample: &TelemetrySample, params: &mut ForceParameters) {
        let c = &self.config;
        let rate = sample.angular_acceleration.z.abs();
        if rate > c.kickback_threshold
            && sample.speed.abs() > c.kickback_speed_threshold
            && !params.use_constant_force
        {
            params.use_constant_force = true;
            params.constant_force = clamp_to_byte((rate * c.kickback_factor).min(c.kickback_max_force));
        }
    }
}
