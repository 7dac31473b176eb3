//! Tunable thresholds and multipliers for the force and LED models.

use serde::{Deserialize, Serialize};
use truckffb_errors::ValidationError;

/// Force feedback configuration.
///
/// One immutable record handed to [`ForceCalculator::new`] and
/// [`LedController::new`] by value. Every field has a default, so a host
/// can deserialize a partial document and override only what it needs.
///
/// Speeds are in km/h unless noted, forces are in device byte units.
///
/// [`ForceCalculator::new`]: crate::ForceCalculator::new
/// [`LedController::new`]: crate::LedController::new
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FfbConfig {
    // Update cadence, in frames
    pub force_update_rate: u32,
    pub led_update_rate: u32,

    // Self-aligning torque
    pub sat_base_torque_factor: f32,
    /// Speed where SAT starts to fade.
    pub sat_speed_reduction_start: f32,
    /// Speed span over which SAT fades to `sat_min_factor`.
    pub sat_speed_reduction_range: f32,
    pub sat_min_factor: f32,
    pub sat_lateral_g_factor: f32,
    pub sat_max_lateral_reduction: f32,

    // Centering
    pub center_stationary_force: f32,
    pub center_stationary_slope: f32,
    pub center_low_speed_base: f32,
    pub center_low_speed_factor: f32,
    pub center_highway_base: f32,
    /// Share of SAT folded into the centering force.
    pub center_highway_factor: f32,
    pub center_max_force: f32,

    // Speed regimes
    /// Compared against `|speed|` in m/s.
    pub speed_stationary_threshold: f32,
    pub speed_low_threshold: f32,
    pub speed_medium_threshold: f32,
    pub speed_high_threshold: f32,
    pub speed_very_high_threshold: f32,

    // Damping
    pub damper_stationary_pos: f32,
    pub damper_stationary_neg: f32,
    pub damper_low_speed: f32,
    pub damper_speed_factor: f32,
    pub damper_max: f32,
    pub damper_brake_factor: f32,
    pub damper_retarder_factor: f32,
    pub damper_engine_brake_factor: f32,
    pub damper_max_total: f32,

    // Yaw dynamics
    pub yaw_rate_threshold: f32,
    pub yaw_rate_factor: f32,
    pub yaw_max_factor: f32,
    pub understeer_factor: f32,
    pub oversteer_reduction: f32,
    pub oversteer_damping_add: f32,

    // Road feel (reserved)
    pub road_feel_speed_threshold: f32,
    pub road_feel_rpm_threshold: f32,
    pub road_feel_speed_factor: f32,
    pub road_feel_intensity_threshold: f32,
    pub road_feel_spring_base: f32,
    pub road_feel_spring_factor: f32,
    pub road_feel_clip_base: f32,
    pub road_feel_clip_factor: f32,

    // Terrain
    pub terrain_offroad_multiplier: f32,
    pub terrain_rough_frequency: f32,
    pub terrain_smooth_frequency: f32,
    /// Smoothed roughness above which continuous rough terrain applies.
    pub terrain_detection_threshold: f32,
    /// Instantaneous roughness above which a minor bump applies; also the
    /// base of the impact threshold.
    pub terrain_minor_threshold: f32,
    pub terrain_major_threshold: f32,
    pub terrain_impact_multiplier: f32,
    /// Seconds an impact effect lasts.
    pub terrain_impact_duration: f32,
    /// Seconds after an impact before another may be detected.
    pub terrain_impact_cooldown: f32,
    /// Weight kept from the previous smoothed roughness, `0..=1`.
    pub terrain_smoothing_factor: f32,
    /// Length of one simulation frame in seconds. Without a measured
    /// elapsed time the terrain timers decay by this times
    /// `force_update_rate` per force calculation.
    pub terrain_tick_seconds: f32,

    // Kickback
    pub kickback_threshold: f32,
    /// Compared against `|speed|` in m/s.
    pub kickback_speed_threshold: f32,
    pub kickback_factor: f32,
    pub kickback_max_force: f32,

    // Weight transfer (reserved)
    pub weight_transfer_threshold: f32,
    pub weight_transfer_factor: f32,
    pub weight_transfer_max_force: f32,

    // Parking brake (reserved)
    pub parking_brake_force: f32,
    pub parking_brake_slope: f32,
    pub parking_brake_damper: f32,

    // LEDs
    pub led_brake_threshold: f32,
    pub led_heavy_brake: f32,
    pub led_medium_brake: f32,
    pub led_speed_high_threshold: f32,
    pub led_speed_low_threshold: f32,
    pub led_rpm_base: f32,
    pub led_rpm_highway: f32,
    pub led_rpm_city: f32,
    pub led_rpm_step1: f32,
    pub led_rpm_step2: f32,
    pub led_rpm_step3: f32,
    pub led_rpm_step4: f32,
}

impl Default for FfbConfig {
    fn default() -> Self {
        Self {
            force_update_rate: 8,
            led_update_rate: 32,

            sat_base_torque_factor: 0.8,
            sat_speed_reduction_start: 80.0,
            sat_speed_reduction_range: 120.0,
            sat_min_factor: 0.3,
            sat_lateral_g_factor: 0.8,
            sat_max_lateral_reduction: 0.7,

            center_stationary_force: 0.0,
            center_stationary_slope: 0.0,
            center_low_speed_base: 20.0,
            center_low_speed_factor: 0.8,
            center_highway_base: 18.0,
            center_highway_factor: 0.6,
            center_max_force: 45.0,

            speed_stationary_threshold: 2.0,
            speed_low_threshold: 15.0,
            speed_medium_threshold: 35.0,
            speed_high_threshold: 65.0,
            speed_very_high_threshold: 100.0,

            damper_stationary_pos: 2.0,
            damper_stationary_neg: 2.0,
            damper_low_speed: 2.5,
            damper_speed_factor: 40.0,
            damper_max: 3.0,
            damper_brake_factor: 0.8,
            damper_retarder_factor: 0.08,
            damper_engine_brake_factor: 0.25,
            damper_max_total: 6.0,

            yaw_rate_threshold: 0.1,
            yaw_rate_factor: 10.0,
            yaw_max_factor: 2.0,
            understeer_factor: 0.3,
            oversteer_reduction: 0.2,
            oversteer_damping_add: 1.0,

            road_feel_speed_threshold: 20.0,
            road_feel_rpm_threshold: 600.0,
            road_feel_speed_factor: 80.0,
            road_feel_intensity_threshold: 0.5,
            road_feel_spring_base: 1.5,
            road_feel_spring_factor: 1.5,
            road_feel_clip_base: 15.0,
            road_feel_clip_factor: 10.0,

            terrain_offroad_multiplier: 4.0,
            terrain_rough_frequency: 8.0,
            terrain_smooth_frequency: 15.0,
            terrain_detection_threshold: 0.08,
            terrain_minor_threshold: 0.02,
            terrain_major_threshold: 0.25,
            terrain_impact_multiplier: 10.0,
            terrain_impact_duration: 0.5,
            terrain_impact_cooldown: 0.6,
            terrain_smoothing_factor: 0.8,
            terrain_tick_seconds: 1.0 / 60.0,

            kickback_threshold: 2.0,
            kickback_speed_threshold: 5.0,
            kickback_factor: 10.0,
            kickback_max_force: 40.0,

            weight_transfer_threshold: 0.2,
            weight_transfer_factor: 0.5,
            weight_transfer_max_force: 90.0,

            parking_brake_force: 80.0,
            parking_brake_slope: 6.0,
            parking_brake_damper: 8.0,

            led_brake_threshold: 0.5,
            led_heavy_brake: 0.9,
            led_medium_brake: 0.7,
            led_speed_high_threshold: 50.0,
            led_speed_low_threshold: 10.0,
            led_rpm_base: 1000.0,
            led_rpm_highway: 800.0,
            led_rpm_city: 1200.0,
            led_rpm_step1: 300.0,
            led_rpm_step2: 600.0,
            led_rpm_step3: 800.0,
            led_rpm_step4: 1000.0,
        }
    }
}

impl FfbConfig {
    /// Nominal seconds between two force calculations.
    #[allow(clippy::cast_precision_loss)]
    pub fn force_update_interval(&self) -> f32 {
        self.terrain_tick_seconds * self.force_update_rate as f32
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint: a non-finite or negative
    /// tunable, a zero update rate, a divisor of zero, an unordered speed or
    /// LED step ladder, or a smoothing factor outside `0..=1`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.force_update_rate == 0 {
            return Err(ValidationError::out_of_range(
                "force_update_rate",
                0,
                1,
                u32::MAX,
            ));
        }
        if self.led_update_rate == 0 {
            return Err(ValidationError::out_of_range(
                "led_update_rate",
                0,
                1,
                u32::MAX,
            ));
        }

        for (name, value) in self.tunables() {
            if !value.is_finite() {
                return Err(ValidationError::not_finite(name));
            }
            if value < 0.0 {
                return Err(ValidationError::out_of_range(name, value, 0.0, f32::MAX));
            }
        }

        for (name, value) in [
            ("sat_speed_reduction_range", self.sat_speed_reduction_range),
            ("damper_speed_factor", self.damper_speed_factor),
            ("terrain_impact_duration", self.terrain_impact_duration),
            ("terrain_tick_seconds", self.terrain_tick_seconds),
        ] {
            if value <= 0.0 {
                return Err(ValidationError::out_of_range(
                    name,
                    value,
                    f32::MIN_POSITIVE,
                    f32::MAX,
                ));
            }
        }

        if !(0.0..=1.0).contains(&self.terrain_smoothing_factor) {
            return Err(ValidationError::out_of_range(
                "terrain_smoothing_factor",
                self.terrain_smoothing_factor,
                0.0,
                1.0,
            ));
        }

        ordered(&[
            ("speed_low_threshold", self.speed_low_threshold),
            ("speed_medium_threshold", self.speed_medium_threshold),
            ("speed_high_threshold", self.speed_high_threshold),
            ("speed_very_high_threshold", self.speed_very_high_threshold),
        ])?;
        ordered(&[
            ("led_rpm_step1", self.led_rpm_step1),
            ("led_rpm_step2", self.led_rpm_step2),
            ("led_rpm_step3", self.led_rpm_step3),
            ("led_rpm_step4", self.led_rpm_step4),
        ])?;
        ordered(&[
            ("led_medium_brake", self.led_medium_brake),
            ("led_heavy_brake", self.led_heavy_brake),
        ])?;
        ordered(&[
            ("led_speed_low_threshold", self.led_speed_low_threshold),
            ("led_speed_high_threshold", self.led_speed_high_threshold),
        ])?;

        Ok(())
    }

    fn tunables(&self) -> [(&'static str, f32); 74] {
        [
            ("sat_base_torque_factor", self.sat_base_torque_factor),
            ("sat_speed_reduction_start", self.sat_speed_reduction_start),
            ("sat_speed_reduction_range", self.sat_speed_reduction_range),
            ("sat_min_factor", self.sat_min_factor),
            ("sat_lateral_g_factor", self.sat_lateral_g_factor),
            ("sat_max_lateral_reduction", self.sat_max_lateral_reduction),
            ("center_stationary_force", self.center_stationary_force),
            ("center_stationary_slope", self.center_stationary_slope),
            ("center_low_speed_base", self.center_low_speed_base),
            ("center_low_speed_factor", self.center_low_speed_factor),
            ("center_highway_base", self.center_highway_base),
            ("center_highway_factor", self.center_highway_factor),
            ("center_max_force", self.center_max_force),
            ("speed_stationary_threshold", self.speed_stationary_threshold),
            ("speed_low_threshold", self.speed_low_threshold),
            ("speed_medium_threshold", self.speed_medium_threshold),
            ("speed_high_threshold", self.speed_high_threshold),
            ("speed_very_high_threshold", self.speed_very_high_threshold),
            ("damper_stationary_pos", self.damper_stationary_pos),
            ("damper_stationary_neg", self.damper_stationary_neg),
            ("damper_low_speed", self.damper_low_speed),
            ("damper_speed_factor", self.damper_speed_factor),
            ("damper_max", self.damper_max),
            ("damper_brake_factor", self.damper_brake_factor),
            ("damper_retarder_factor", self.damper_retarder_factor),
            ("damper_engine_brake_factor", self.damper_engine_brake_factor),
            ("damper_max_total", self.damper_max_total),
            ("yaw_rate_threshold", self.yaw_rate_threshold),
            ("yaw_rate_factor", self.yaw_rate_factor),
            ("yaw_max_factor", self.yaw_max_factor),
            ("understeer_factor", self.understeer_factor),
            ("oversteer_reduction", self.oversteer_reduction),
            ("oversteer_damping_add", self.oversteer_damping_add),
            ("road_feel_speed_threshold", self.road_feel_speed_threshold),
            ("road_feel_rpm_threshold", self.road_feel_rpm_threshold),
            ("road_feel_speed_factor", self.road_feel_speed_factor),
            ("road_feel_intensity_threshold", self.road_feel_intensity_threshold),
            ("road_feel_spring_base", self.road_feel_spring_base),
            ("road_feel_spring_factor", self.road_feel_spring_factor),
            ("road_feel_clip_base", self.road_feel_clip_base),
            ("road_feel_clip_factor", self.road_feel_clip_factor),
            ("terrain_offroad_multiplier", self.terrain_offroad_multiplier),
            ("terrain_rough_frequency", self.terrain_rough_frequency),
            ("terrain_smooth_frequency", self.terrain_smooth_frequency),
            ("terrain_detection_threshold", self.terrain_detection_threshold),
            ("terrain_minor_threshold", self.terrain_minor_threshold),
            ("terrain_major_threshold", self.terrain_major_threshold),
            ("terrain_impact_multiplier", self.terrain_impact_multiplier),
            ("terrain_impact_duration", self.terrain_impact_duration),
            ("terrain_impact_cooldown", self.terrain_impact_cooldown),
            ("terrain_smoothing_factor", self.terrain_smoothing_factor),
            ("terrain_tick_seconds", self.terrain_tick_seconds),
            ("kickback_threshold", self.kickback_threshold),
            ("kickback_speed_threshold", self.kickback_speed_threshold),
            ("kickback_factor", self.kickback_factor),
            ("kickback_max_force", self.kickback_max_force),
            ("weight_transfer_threshold", self.weight_transfer_threshold),
            ("weight_transfer_factor", self.weight_transfer_factor),
            ("weight_transfer_max_force", self.weight_transfer_max_force),
            ("parking_brake_force", self.parking_brake_force),
            ("parking_brake_slope", self.parking_brake_slope),
            ("parking_brake_damper", self.parking_brake_damper),
            ("led_brake_threshold", self.led_brake_threshold),
            ("led_heavy_brake", self.led_heavy_brake),
            ("led_medium_brake", self.led_medium_brake),
            ("led_speed_high_threshold", self.led_speed_high_threshold),
            ("led_speed_low_threshold", self.led_speed_low_threshold),
            ("led_rpm_base", self.led_rpm_base),
            ("led_rpm_highway", self.led_rpm_highway),
            ("led_rpm_city", self.led_rpm_city),
            ("led_rpm_step1", self.led_rpm_step1),
            ("led_rpm_step2", self.led_rpm_step2),
            ("led_rpm_step3", self.led_rpm_step3),
            ("led_rpm_step4", self.led_rpm_step4),
        ]
    }
}

fn ordered(ladder: &[(&'static str, f32)]) -> Result<(), ValidationError> {
    for pair in ladder.windows(2) {
        let (lo_name, lo) = pair[0];
        let (hi_name, hi) = pair[1];
        if lo >= hi {
            return Err(ValidationError::relation(lo_name, "less than", hi_name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FfbConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_update_rate_rejected() {
        let config = FfbConfig {
            force_update_rate: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "force_update_rate"
        ));
    }

    #[test]
    fn test_nan_rejected() {
        let config = FfbConfig {
            damper_max: f32::NAN,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::not_finite("damper_max"))
        );
    }

    #[test]
    fn test_negative_rejected() {
        let config = FfbConfig {
            kickback_factor: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_speed_ladder_must_increase() {
        let config = FfbConfig {
            speed_medium_threshold: 70.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::relation(
                "speed_medium_threshold",
                "less than",
                "speed_high_threshold"
            ))
        );
    }

    #[test]
    fn test_led_steps_must_increase() {
        let config = FfbConfig {
            led_rpm_step2: 300.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_smoothing_factor_bounds() {
        let config = FfbConfig {
            terrain_smoothing_factor: 1.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_impact_duration_rejected() {
        let config = FfbConfig {
            terrain_impact_duration: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
