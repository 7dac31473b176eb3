//! Calibration sequence errors.

use core::fmt;

use crate::{DeviceError, common::ErrorSeverity};

/// The sub-steps of the wheel calibration sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalibrationStep {
    /// Initial LED reset before the sweep
    LedReset,
    /// Disable autocenter before the force self-test
    DisableAutocenter,
    /// Mid-level constant force
    ConstantForce,
    /// Stop all forces after the hold
    StopForces,
    /// Restore the autocenter spring parameters
    AutocenterSpring,
    /// Re-enable autocenter
    EnableAutocenter,
}

impl fmt::Display for CalibrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalibrationStep::LedReset => "led-reset",
            CalibrationStep::DisableAutocenter => "disable-autocenter",
            CalibrationStep::ConstantForce => "constant-force",
            CalibrationStep::StopForces => "stop-forces",
            CalibrationStep::AutocenterSpring => "autocenter-spring",
            CalibrationStep::EnableAutocenter => "enable-autocenter",
        };
        f.write_str(name)
    }
}

/// Calibration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalibrationError {
    /// Calibration was requested before the wheel was initialized
    #[error("Cannot calibrate: wheel not initialized")]
    NotInitialized,

    /// Calibration was requested after the wheel was shut down
    #[error("Cannot calibrate: wheel already shut down")]
    ShutDown,

    /// A calibration sub-step failed
    #[error("Calibration step '{step}' failed: {source}")]
    StepFailed {
        /// Step that failed
        step: CalibrationStep,
        /// Underlying device failure
        #[source]
        source: DeviceError,
    },
}

impl CalibrationError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CalibrationError::NotInitialized | CalibrationError::ShutDown => ErrorSeverity::Error,
            CalibrationError::StepFailed { source, .. } => source.severity(),
        }
    }

    /// Create a step failure.
    pub fn step_failed(step: CalibrationStep, source: DeviceError) -> Self {
        CalibrationError::StepFailed { step, source }
    }
}
