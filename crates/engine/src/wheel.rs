//! Per-device wheel controller.
//!
//! A [`WheelController`] exclusively owns the open transport of one wheel
//! and walks it through `Created -> Initialized -> Calibrated -> Active`,
//! ending in the terminal `Shutdown`. Teardown runs on [`Drop`] as well, so
//! a controller that goes out of scope always leaves the wheel neutral.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};
use truckffb_errors::{CalibrationError, CalibrationStep, DeviceError};
use truckffb_ffb::ForceParameters;
use truckffb_hid_common::{HidDeviceInfo, HidPort, HidTransport};
use truckffb_hid_g923_protocol::{
    Command, Nibble, build_autocenter_spring, build_constant_force, build_custom_spring,
    build_damper, build_disable_autocenter, build_enable_autocenter, build_led_pattern,
    build_stop_forces, build_trapezoid, is_supported_wheel, led_patterns,
};

use crate::timing::{Delay, WheelTimings};

/// Constant force applied during the calibration self test.
const SELF_TEST_FORCE: u8 = 120;
/// Autocenter spring restored at the end of calibration: `(k1, k2, clip)`.
const CALIBRATED_SPRING: (u8, u8, u8) = (2, 2, 48);

/// Lifecycle of a [`WheelController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelState {
    Created,
    Initialized,
    Calibrated,
    /// Calibrated and receiving per-tick commands.
    Active,
    /// Terminal. The transport has been closed.
    Shutdown,
}

impl WheelState {
    /// Whether per-tick commands may be dispatched.
    pub fn is_usable(self) -> bool {
        matches!(self, Self::Calibrated | Self::Active)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Initialized => "Initialized",
            Self::Calibrated => "Calibrated",
            Self::Active => "Active",
            Self::Shutdown => "Shutdown",
        }
    }
}

impl fmt::Display for WheelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a batch of commands sent to one wheel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn is_degraded(&self) -> bool {
        self.failed > 0
    }

    pub fn merge(&mut self, other: DispatchReport) {
        self.sent += other.sent;
        self.failed += other.failed;
    }

    fn record(&mut self, result: &Result<(), DeviceError>) {
        match result {
            Ok(()) => self.sent += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Controller for one G923 wheel.
pub struct WheelController {
    info: HidDeviceInfo,
    transport: Option<Box<dyn HidTransport>>,
    state: WheelState,
    timings: WheelTimings,
    delay: Arc<dyn Delay>,
}

impl fmt::Debug for WheelController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WheelController")
            .field("device", &self.info.path)
            .field("state", &self.state)
            .field("open", &self.is_open())
            .finish()
    }
}

impl WheelController {
    pub fn new(info: HidDeviceInfo, timings: WheelTimings, delay: Arc<dyn Delay>) -> Self {
        debug!(device = %info.path, "Created wheel controller");
        Self {
            info,
            transport: None,
            state: WheelState::Created,
            timings,
            delay,
        }
    }

    pub fn info(&self) -> &HidDeviceInfo {
        &self.info
    }

    pub fn state(&self) -> WheelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_open())
    }

    fn validate_device(&self) -> Result<(), DeviceError> {
        if !self.info.has_handle() {
            return Err(DeviceError::InvalidHandle(self.info.display_name()));
        }
        if !is_supported_wheel(self.info.vendor_id, self.info.product_id) {
            return Err(DeviceError::unsupported(
                self.info.vendor_id,
                self.info.product_id,
            ));
        }
        Ok(())
    }

    /// Validate the device, open its transport and switch the LEDs off.
    ///
    /// On failure the controller stays in `Created`. Calling this again once
    /// initialized is a no-op.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` or `UnsupportedDevice` when the identity is unusable,
    /// the port's open error otherwise, and `NotOpen` after shutdown.
    pub fn initialize(&mut self, port: &dyn HidPort) -> Result<(), DeviceError> {
        match self.state {
            WheelState::Created => {}
            WheelState::Shutdown => return Err(DeviceError::NotOpen(self.info.path.clone())),
            _ => return Ok(()),
        }

        self.validate_device()?;
        info!(device = %self.info.path, "Initializing wheel");

        let transport = port.open_device(&self.info).map_err(|err| {
            let err = DeviceError::from(err);
            error!(device = %self.info.path, error = %err, "Failed to open wheel");
            err
        })?;
        self.transport = Some(transport);
        self.state = WheelState::Initialized;

        if let Err(err) = self.set_led_pattern(led_patterns::OFF) {
            warn!(device = %self.info.path, error = %err, "Failed to reset LEDs during initialization");
        }

        info!(device = %self.info.path, "Wheel initialized");
        Ok(())
    }

    /// Run the one-shot calibration sequence.
    ///
    /// LED sweep forward then back across every raw pattern value, then a
    /// force self test: disable autocenter, hold a constant force, stop,
    /// restore the autocenter spring and re-enable it. Sweep step failures
    /// are only logged; every other step aborts the sequence and leaves the
    /// wheel `Initialized`.
    ///
    /// # Errors
    ///
    /// `NotInitialized` before [`initialize`](Self::initialize), `ShutDown`
    /// after shutdown, `StepFailed` naming the failing step.
    pub fn calibrate(&mut self) -> Result<(), CalibrationError> {
        match self.state {
            WheelState::Created => {
                error!(device = %self.info.path, "Cannot calibrate: wheel not initialized");
                return Err(CalibrationError::NotInitialized);
            }
            WheelState::Shutdown => return Err(CalibrationError::ShutDown),
            WheelState::Calibrated | WheelState::Active => return Ok(()),
            WheelState::Initialized => {}
        }

        info!(device = %self.info.path, "Starting calibration");
        if let Err(err) = self.calibration_sequence() {
            error!(device = %self.info.path, error = %err, "Calibration failed");
            return Err(err);
        }

        self.state = WheelState::Calibrated;
        info!(device = %self.info.path, "Calibration complete");
        Ok(())
    }

    fn calibration_sequence(&mut self) -> Result<(), CalibrationError> {
        let step = |step: CalibrationStep| move |err| CalibrationError::step_failed(step, err);

        debug!(device = %self.info.path, "LED sweep");
        self.set_led_pattern(led_patterns::OFF)
            .map_err(step(CalibrationStep::LedReset))?;

        let forward = 0..led_patterns::SWEEP_LEN;
        let backward = (0..led_patterns::SWEEP_LEN).rev();
        for pattern in forward.chain(backward) {
            self.delay.wait(self.timings.led_sweep_step);
            if let Err(err) = self.set_led_pattern(pattern) {
                warn!(device = %self.info.path, pattern, error = %err, "LED sweep step failed");
            }
        }

        debug!(device = %self.info.path, "Force self test");
        self.disable_autocenter()
            .map_err(step(CalibrationStep::DisableAutocenter))?;
        self.set_constant_force(SELF_TEST_FORCE)
            .map_err(step(CalibrationStep::ConstantForce))?;
        self.delay.wait(self.timings.force_test_hold);

        self.stop_forces().map_err(step(CalibrationStep::StopForces))?;
        let (k1, k2, clip) = CALIBRATED_SPRING;
        self.set_autocenter_spring(k1, k2, clip)
            .map_err(step(CalibrationStep::AutocenterSpring))?;
        self.enable_autocenter()
            .map_err(step(CalibrationStep::EnableAutocenter))?;
        self.delay.wait(self.timings.autocenter_settle);

        Ok(())
    }

    fn send(&mut self, command: Command) -> Result<(), DeviceError> {
        let path = &self.info.path;
        let transport = match self.transport.as_mut() {
            Some(t) if t.is_open() => t,
            _ => return Err(DeviceError::NotOpen(path.clone())),
        };

        transport.write_report(command.as_bytes())?;
        trace!(device = %path, opcode = command.opcode(), "Command sent");
        Ok(())
    }

    pub fn enable_autocenter(&mut self) -> Result<(), DeviceError> {
        self.send(build_enable_autocenter())
    }

    pub fn disable_autocenter(&mut self) -> Result<(), DeviceError> {
        self.send(build_disable_autocenter())
    }

    pub fn set_autocenter_spring(&mut self, k1: u8, k2: u8, clip: u8) -> Result<(), DeviceError> {
        self.send(build_autocenter_spring(k1, k2, clip))
    }

    /// Spring coefficients and saturations above 15 are saturated to fit
    /// their nibble.
    #[allow(clippy::too_many_arguments)]
    pub fn set_custom_spring(
        &mut self,
        d1: u8,
        d2: u8,
        k1: u8,
        k2: u8,
        s1: u8,
        s2: u8,
        clip: u8,
    ) -> Result<(), DeviceError> {
        self.send(build_custom_spring(
            d1,
            d2,
            self.nibble("k1", k1),
            self.nibble("k2", k2),
            self.nibble("s1", s1),
            self.nibble("s2", s2),
            clip,
        ))
    }

    fn nibble(&self, field: &'static str, value: u8) -> Nibble {
        Nibble::new(value).unwrap_or_else(|| {
            debug!(device = %self.info.path, field, value, "Effect parameter saturated to 15");
            Nibble::MAX
        })
    }

    pub fn set_constant_force(&mut self, force: u8) -> Result<(), DeviceError> {
        self.send(build_constant_force(force))
    }

    pub fn set_damper(&mut self, k1: u8, k2: u8, s1: u8, s2: u8) -> Result<(), DeviceError> {
        self.send(build_damper(k1, k2, s1, s2))
    }

    pub fn set_trapezoid(
        &mut self,
        l1: u8,
        l2: u8,
        t1: u8,
        t2: u8,
        t3: u8,
        s: u8,
    ) -> Result<(), DeviceError> {
        self.send(build_trapezoid(
            l1,
            l2,
            t1,
            t2,
            self.nibble("t3", t3),
            self.nibble("s", s),
        ))
    }

    pub fn stop_forces(&mut self) -> Result<(), DeviceError> {
        self.send(build_stop_forces())
    }

    pub fn set_led_pattern(&mut self, pattern: u8) -> Result<(), DeviceError> {
        self.send(build_led_pattern(pattern))
    }

    /// Send the commands for one force update.
    ///
    /// A constant force is sent on its own. Otherwise forces are stopped,
    /// then the terrain spring and damper are sent when present, then the
    /// autocenter spring is enabled with the computed strength or disabled
    /// when that strength is zero. Failures are logged and counted; the
    /// remaining commands are still sent.
    pub fn apply_forces(&mut self, params: &ForceParameters) -> DispatchReport {
        let mut report = DispatchReport::default();
        if !self.state.is_usable() {
            return report;
        }
        self.state = WheelState::Active;

        if params.use_constant_force {
            let result = self.set_constant_force(params.constant_force);
            self.log_force_failure(&result, "constant force");
            report.record(&result);
            return report;
        }

        let result = self.stop_forces();
        self.log_force_failure(&result, "stop forces");
        report.record(&result);

        if params.use_custom_spring {
            let result = self.set_custom_spring(
                0,
                0,
                params.spring_k1,
                params.spring_k2,
                0,
                0,
                params.spring_clip,
            );
            self.log_force_failure(&result, "custom spring");
            report.record(&result);
        }

        if params.has_damper() {
            let result = self.set_damper(
                params.damper_force_positive,
                params.damper_force_negative,
                0,
                0,
            );
            self.log_force_failure(&result, "damper");
            report.record(&result);
        }

        if params.autocenter_force > 0 {
            let result = self.enable_autocenter().and_then(|()| {
                self.set_autocenter_spring(
                    params.autocenter_slope,
                    params.autocenter_slope,
                    params.autocenter_force,
                )
            });
            self.log_force_failure(&result, "autocenter spring");
            report.record(&result);
        } else {
            let result = self.disable_autocenter();
            self.log_force_failure(&result, "disable autocenter");
            report.record(&result);
        }

        report
    }

    fn log_force_failure(&self, result: &Result<(), DeviceError>, what: &str) {
        if let Err(err) = result {
            error!(device = %self.info.path, effect = what, error = %err, "Force command failed");
        }
    }

    /// Send one LED update. Failures are logged as warnings.
    pub fn apply_led(&mut self, pattern: u8) -> DispatchReport {
        let mut report = DispatchReport::default();
        if !self.state.is_usable() {
            return report;
        }
        let result = self.set_led_pattern(pattern);
        if let Err(err) = &result {
            warn!(device = %self.info.path, pattern, error = %err, "LED update failed");
        }
        report.record(&result);
        report
    }

    /// Drive the wheel neutral: stop forces, disable autocenter, LEDs off.
    ///
    /// Every step is attempted regardless of earlier failures.
    pub fn reset(&mut self) -> DispatchReport {
        let mut report = DispatchReport::default();
        if matches!(self.state, WheelState::Created | WheelState::Shutdown) {
            return report;
        }

        let results = [
            self.stop_forces(),
            self.disable_autocenter(),
            self.set_led_pattern(led_patterns::OFF),
        ];
        for result in &results {
            if let Err(err) = result {
                warn!(device = %self.info.path, error = %err, "Neutral reset command failed");
            }
            report.record(result);
        }
        report
    }

    /// Reset the wheel, wait the teardown settle time and close the
    /// transport. Idempotent; the controller is `Shutdown` afterwards even
    /// if closing fails.
    ///
    /// # Errors
    ///
    /// The transport's close error, if any.
    pub fn shutdown(&mut self) -> Result<(), DeviceError> {
        if self.state == WheelState::Shutdown {
            return Ok(());
        }

        if self.is_open() {
            info!(device = %self.info.path, "Shutting down wheel");
            self.reset();
            self.wait(self.timings.teardown_settle);
        }
        self.state = WheelState::Shutdown;

        let Some(mut transport) = self.transport.take() else {
            return Ok(());
        };
        transport.close().map_err(|err| {
            let err = DeviceError::from(err);
            error!(device = %self.info.path, error = %err, "Failed to close wheel");
            err
        })?;

        info!(device = %self.info.path, "Wheel closed");
        Ok(())
    }

    fn wait(&self, duration: Duration) {
        self.delay.wait(duration);
    }
}

impl Drop for WheelController {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(device = %self.info.path, error = %err, "Wheel teardown incomplete");
        }
    }
}
