//! Rev-light LED pattern selection.

use truckffb_hid_g923_protocol::led_patterns;
use truckffb_telemetry::TelemetrySample;

use crate::config::FfbConfig;

/// Chooses the LED pattern for a telemetry sample.
///
/// Priority, first match wins: parking brake (flash all / off), brake pedal
/// depth, then engine speed against a road-speed dependent baseline. Past the
/// top RPM step the pattern flashes between the two highest steps.
///
/// Flashing alternates once per tick. [`calculate_for_tick`] may be called
/// any number of times with the same tick and returns the same pattern;
/// [`calculate`] advances its own tick on every call.
///
/// [`calculate_for_tick`]: LedController::calculate_for_tick
/// [`calculate`]: LedController::calculate
#[derive(Debug, Clone)]
pub struct LedController {
    config: FfbConfig,
    flash_on: bool,
    last_flash_tick: Option<u64>,
    auto_tick: u64,
}

impl LedController {
    pub fn new(config: FfbConfig) -> Self {
        Self {
            config,
            flash_on: false,
            last_flash_tick: None,
            auto_tick: 0,
        }
    }

    /// Pattern for the next tick.
    pub fn calculate(&mut self, sample: &TelemetrySample) -> u8 {
        self.auto_tick = self.auto_tick.wrapping_add(1);
        self.calculate_for_tick(sample, self.auto_tick)
    }

    /// Pattern for `tick`. The flash phase advances at most once per tick.
    pub fn calculate_for_tick(&mut self, sample: &TelemetrySample, tick: u64) -> u8 {
        if sample.parking_brake {
            return if self.flash(tick) {
                led_patterns::STEP_5
            } else {
                led_patterns::OFF
            };
        }

        if sample.brake > self.config.led_brake_threshold {
            return self.brake_pattern(sample.brake);
        }

        self.rpm_pattern(sample.rpm, sample.speed_kmh(), tick)
    }

    /// Current flash phase.
    pub fn flash_on(&self) -> bool {
        self.flash_on
    }

    pub fn reset(&mut self) {
        self.flash_on = false;
        self.last_flash_tick = None;
    }

    fn flash(&mut self, tick: u64) -> bool {
        if self.last_flash_tick != Some(tick) {
            self.flash_on = !self.flash_on;
            self.last_flash_tick = Some(tick);
        }
        self.flash_on
    }

    fn brake_pattern(&self, brake: f32) -> u8 {
        if brake > self.config.led_heavy_brake {
            led_patterns::STEP_5
        } else if brake > self.config.led_medium_brake {
            led_patterns::STEP_4
        } else {
            led_patterns::STEP_3
        }
    }

    fn rpm_pattern(&mut self, rpm: f32, speed_kmh: f32, tick: u64) -> u8 {
        let c = &self.config;
        if rpm == 0.0 {
            return led_patterns::OFF;
        }

        let base = if speed_kmh > c.led_speed_high_threshold {
            c.led_rpm_highway
        } else if speed_kmh < c.led_speed_low_threshold {
            c.led_rpm_city
        } else {
            c.led_rpm_base
        };

        if rpm < base {
            led_patterns::STEP_1
        } else if rpm < base + c.led_rpm_step1 {
            led_patterns::STEP_2
        } else if rpm < base + c.led_rpm_step2 {
            led_patterns::STEP_3
        } else if rpm < base + c.led_rpm_step3 {
            led_patterns::STEP_4
        } else if rpm < base + c.led_rpm_step4 {
            led_patterns::STEP_5
        } else if self.flash(tick) {
            led_patterns::STEP_5
        } else {
            led_patterns::STEP_4
        }
    }
}
