//! Wheel settle times and the injectable delay they are waited on.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Settle times for the calibration and teardown sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelTimings {
    /// Wait before each LED sweep step.
    pub led_sweep_step: Duration,
    /// Hold of the constant-force self test.
    pub force_test_hold: Duration,
    /// Wait after re-enabling autocenter.
    pub autocenter_settle: Duration,
    /// Wait between the neutral reset and closing the transport.
    pub teardown_settle: Duration,
    /// Wait after resetting every wheel on control loop shutdown.
    pub shutdown_settle: Duration,
}

impl Default for WheelTimings {
    fn default() -> Self {
        Self {
            led_sweep_step: Duration::from_millis(30),
            force_test_hold: Duration::from_millis(500),
            autocenter_settle: Duration::from_millis(500),
            teardown_settle: Duration::from_millis(100),
            shutdown_settle: Duration::from_millis(200),
        }
    }
}

impl WheelTimings {
    /// All waits zero.
    pub const fn immediate() -> Self {
        Self {
            led_sweep_step: Duration::ZERO,
            force_test_hold: Duration::ZERO,
            autocenter_settle: Duration::ZERO,
            teardown_settle: Duration::ZERO,
            shutdown_settle: Duration::ZERO,
        }
    }
}

/// Blocking wait used between device commands.
pub trait Delay: Send + Sync {
    fn wait(&self, duration: Duration);
}

/// Sleeps the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn wait(&self, _duration: Duration) {}
}

/// Records every requested wait without sleeping. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().clone()
    }

    pub fn total(&self) -> Duration {
        self.waits.lock().iter().sum()
    }

    pub fn clear(&self) {
        self.waits.lock().clear();
    }
}

impl Delay for RecordingDelay {
    fn wait(&self, duration: Duration) {
        self.waits.lock().push(duration);
    }
}
