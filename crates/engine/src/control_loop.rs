//! Frame-driven control loop.
//!
//! The host calls into [`ControlLoop`] synchronously: channel values as they
//! arrive, [`on_frame_start`](ControlLoop::on_frame_start) and
//! [`advance`](ControlLoop::advance) once per simulation frame. Two
//! countdowns decouple the force and LED cadence from the frame rate. There
//! are no threads and no timers; every device write blocks the caller.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use truckffb_errors::{DeviceError, TruckFfbError, ValidationError};
use truckffb_ffb::{FfbConfig, ForceCalculator, ForceParameters, LedController};
use truckffb_hid_common::{HidPort, find_known_wheels};
use truckffb_hid_g923_protocol::KNOWN_WHEEL_IDS;
use truckffb_telemetry::{
    Channel, FrameClock, FrameStart, Orientation, TelemetrySample, TelemetryValue, TerrainState,
    Vec3,
};

use crate::timing::{Delay, ThreadDelay, WheelTimings};
use crate::wheel::{DispatchReport, WheelController};

/// What one [`ControlLoop::advance`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Frames advanced since initialization, starting at 1.
    pub tick: u64,
    pub paused: bool,
    /// Force parameters sent this tick, if a force update was due.
    pub forces: Option<ForceParameters>,
    /// LED pattern sent this tick, if an LED update was due.
    pub led: Option<u8>,
    pub commands_sent: usize,
    pub commands_failed: usize,
}

impl TickReport {
    /// At least one device command failed this tick.
    pub fn degraded(&self) -> bool {
        self.commands_failed > 0
    }

    fn absorb(&mut self, report: DispatchReport) {
        self.commands_sent += report.sent;
        self.commands_failed += report.failed;
    }
}

/// Owns the wheels, the latest telemetry and the force and LED models.
pub struct ControlLoop {
    forces: ForceCalculator,
    leds: LedController,
    force_update_rate: u32,
    led_update_rate: u32,
    sample: TelemetrySample,
    terrain: TerrainState,
    clock: FrameClock,
    wheels: Vec<WheelController>,
    timings: WheelTimings,
    delay: Arc<dyn Delay>,
    paused: bool,
    initialized: bool,
    force_countdown: u32,
    led_countdown: u32,
    tick: u64,
    last_force_timestamp: Option<u64>,
}

impl std::fmt::Debug for ControlLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("wheels", &self.wheels)
            .field("paused", &self.paused)
            .field("initialized", &self.initialized)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl ControlLoop {
    /// Build a control loop that sleeps the calling thread for settle times.
    ///
    /// # Errors
    ///
    /// Returns the first configuration constraint `config` violates.
    pub fn new(config: FfbConfig) -> Result<Self, ValidationError> {
        Self::with_timing(config, WheelTimings::default(), Arc::new(ThreadDelay))
    }

    /// Build a control loop with explicit settle times and delay.
    ///
    /// # Errors
    ///
    /// Returns the first configuration constraint `config` violates.
    pub fn with_timing(
        config: FfbConfig,
        timings: WheelTimings,
        delay: Arc<dyn Delay>,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            force_update_rate: config.force_update_rate,
            led_update_rate: config.led_update_rate,
            leds: LedController::new(config.clone()),
            forces: ForceCalculator::new(config),
            sample: TelemetrySample::new(),
            terrain: TerrainState::new(),
            clock: FrameClock::new(),
            wheels: Vec::new(),
            timings,
            delay,
            paused: true,
            initialized: false,
            force_countdown: 0,
            led_countdown: 0,
            tick: 0,
            last_force_timestamp: None,
        })
    }

    /// Discover, initialize and calibrate every known wheel on `port`.
    ///
    /// Wheels that fail to initialize or calibrate are dropped from the
    /// active set with a warning. Telemetry is reset and the loop starts
    /// paused with every wheel neutral.
    ///
    /// # Errors
    ///
    /// Enumeration failure, no known wheel on the port, or no wheel that
    /// survived calibration.
    pub fn initialize(&mut self, port: &dyn HidPort) -> Result<usize, TruckFfbError> {
        if self.initialized {
            return Ok(self.wheels.len());
        }
        info!("Initializing control loop");

        let devices = find_known_wheels(port, KNOWN_WHEEL_IDS).map_err(DeviceError::from)?;
        if devices.is_empty() {
            error!("No compatible wheels found");
            return Err(DeviceError::not_found("G923").into());
        }

        self.wheels.clear();
        for info in devices {
            let mut wheel = WheelController::new(info, self.timings, Arc::clone(&self.delay));
            if let Err(err) = wheel.initialize(port) {
                warn!(device = %wheel.info().path, error = %err, "Failed to initialize wheel");
                continue;
            }
            if let Err(err) = wheel.calibrate() {
                warn!(device = %wheel.info().path, error = %err, "Failed to calibrate wheel");
                continue;
            }
            info!(device = %wheel.info().path, "Wheel ready");
            self.wheels.push(wheel);
        }

        if self.wheels.is_empty() {
            error!("No wheels were successfully initialized");
            return Err(DeviceError::not_found("calibrated G923").into());
        }

        self.sample.reset();
        self.terrain.reset();
        self.clock.reset();
        self.leds.reset();
        self.last_force_timestamp = None;
        self.paused = true;
        self.initialized = true;
        self.reset_all_wheels();

        info!(wheels = self.wheels.len(), "Control loop initialized");
        Ok(self.wheels.len())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn wheel_count(&self) -> usize {
        self.wheels.len()
    }

    pub fn wheels(&self) -> &[WheelController] {
        &self.wheels
    }

    pub fn sample(&self) -> &TelemetrySample {
        &self.sample
    }

    pub fn terrain(&self) -> &TerrainState {
        &self.terrain
    }

    pub fn config(&self) -> &FfbConfig {
        self.forces.config()
    }

    /// Frame-start bookkeeping: accumulated timestamp and raw host times.
    pub fn on_frame_start(&mut self, frame: &FrameStart) {
        self.clock.on_frame_start(frame, &mut self.sample);
    }

    /// Store one channel value. Returns `false` when the value type does not
    /// match the channel; the sample is left untouched.
    pub fn store(&mut self, channel: Channel, value: TelemetryValue) -> bool {
        self.sample.apply(channel, value)
    }

    /// Store a value addressed by its host channel name. Unknown names are
    /// ignored.
    pub fn store_named(&mut self, name: &str, value: TelemetryValue) -> bool {
        match Channel::from_name(name) {
            Some(channel) => self.store(channel, value),
            None => {
                debug!(channel = name, "Ignoring unknown channel");
                false
            }
        }
    }

    pub fn store_float(&mut self, channel: Channel, value: f32) -> bool {
        self.store(channel, TelemetryValue::Float(value))
    }

    pub fn store_bool(&mut self, channel: Channel, value: bool) -> bool {
        self.store(channel, TelemetryValue::Bool(value))
    }

    pub fn store_s32(&mut self, channel: Channel, value: i32) -> bool {
        self.store(channel, TelemetryValue::S32(value))
    }

    pub fn store_u32(&mut self, channel: Channel, value: u32) -> bool {
        self.store(channel, TelemetryValue::U32(value))
    }

    pub fn store_fvector(&mut self, channel: Channel, value: Vec3) -> bool {
        self.store(channel, TelemetryValue::FVector(value))
    }

    pub fn store_euler(&mut self, channel: Channel, value: Orientation) -> bool {
        self.store(channel, TelemetryValue::Euler(value))
    }

    /// Enter or leave the paused state. Entering it drives every wheel
    /// neutral immediately.
    pub fn set_paused(&mut self, paused: bool) -> DispatchReport {
        let entering = paused && !self.paused;
        self.paused = paused;

        if entering {
            let report = self.reset_all_wheels();
            info!("Telemetry paused, forces stopped");
            report
        } else {
            if !paused {
                info!("Telemetry resumed");
            }
            DispatchReport::default()
        }
    }

    /// End of a simulation frame.
    ///
    /// While paused nothing is sent. Otherwise each countdown is
    /// decremented and, when it runs out, the corresponding update is sent
    /// to every wheel and the countdown restarts from its rate. Both
    /// countdowns start expired, so the first running frame sends both.
    pub fn advance(&mut self) -> TickReport {
        self.tick = self.tick.wrapping_add(1);
        let mut report = TickReport {
            tick: self.tick,
            paused: self.paused,
            ..TickReport::default()
        };

        if self.paused || !self.initialized {
            return report;
        }

        self.force_countdown = self.force_countdown.saturating_sub(1);
        if self.force_countdown == 0 {
            let (params, dispatch) = self.update_forces();
            report.forces = Some(params);
            report.absorb(dispatch);
            if dispatch.is_degraded() {
                error!(tick = self.tick, failed = dispatch.failed, "Force feedback update failed");
            }
            self.force_countdown = self.force_update_rate;
        }

        self.led_countdown = self.led_countdown.saturating_sub(1);
        if self.led_countdown == 0 {
            let (pattern, dispatch) = self.update_leds();
            report.led = Some(pattern);
            report.absorb(dispatch);
            if dispatch.is_degraded() {
                warn!(tick = self.tick, failed = dispatch.failed, "LED update failed");
            }
            self.led_countdown = self.led_update_rate;
        }

        report
    }

    /// Seconds of simulation time since the previous force update, or the
    /// nominal interval when the host has not advanced the clock.
    #[allow(clippy::cast_precision_loss)]
    fn force_elapsed(&mut self) -> f32 {
        let now = self.sample.timestamp;
        let previous = self.last_force_timestamp.replace(now);
        match previous {
            Some(prev) if now > prev => (now - prev) as f32 / 1_000_000.0,
            _ => self.forces.config().force_update_interval(),
        }
    }

    fn update_forces(&mut self) -> (ForceParameters, DispatchReport) {
        let elapsed = self.force_elapsed();
        let params = self
            .forces
            .calculate_elapsed(&self.sample, &mut self.terrain, elapsed);
        let mut dispatch = DispatchReport::default();
        for wheel in &mut self.wheels {
            dispatch.merge(wheel.apply_forces(&params));
        }
        (params, dispatch)
    }

    fn update_leds(&mut self) -> (u8, DispatchReport) {
        let pattern = self.leds.calculate_for_tick(&self.sample, self.tick);
        let mut dispatch = DispatchReport::default();
        for wheel in &mut self.wheels {
            dispatch.merge(wheel.apply_led(pattern));
        }
        (pattern, dispatch)
    }

    /// Stop forces, disable autocenter and clear LEDs on every wheel.
    pub fn reset_all_wheels(&mut self) -> DispatchReport {
        let mut dispatch = DispatchReport::default();
        for wheel in &mut self.wheels {
            dispatch.merge(wheel.reset());
        }
        dispatch
    }

    /// Reset every wheel, wait the shutdown settle time, then shut each
    /// wheel down and release it. Idempotent.
    pub fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        info!("Shutting down control loop");

        self.reset_all_wheels();
        self.delay.wait(self.timings.shutdown_settle);

        for mut wheel in self.wheels.drain(..) {
            if let Err(err) = wheel.shutdown() {
                warn!(device = %wheel.info().path, error = %err, "Wheel shutdown incomplete");
            }
        }

        self.initialized = false;
        self.paused = true;
        info!("Control loop shutdown complete");
    }
}

impl Drop for ControlLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
