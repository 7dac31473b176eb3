//! Top-level error type, classification and severity levels.

use core::fmt;

use crate::{CalibrationError, DeviceError, ValidationError};

/// Any failure the driver can report to its host.
#[derive(Debug, thiserror::Error)]
pub enum TruckFfbError {
    /// Wheel discovery, open/close or report write
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// One-shot calibration sequence
    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    /// Rejected force feedback configuration
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Other(String),
}

impl TruckFfbError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Device(_) => ErrorCategory::Device,
            Self::Calibration(_) => ErrorCategory::Calibration,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Other(_) => ErrorCategory::Other,
        }
    }

    /// Severity of the wrapped error; free-form errors count as `Error`.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Device(e) => e.severity(),
            Self::Calibration(e) => e.severity(),
            Self::Validation(e) => e.severity(),
            Self::Other(_) => ErrorSeverity::Error,
        }
    }

    /// The driver can keep running: everything short of `Critical`.
    pub fn is_recoverable(&self) -> bool {
        self.severity() != ErrorSeverity::Critical
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Which subsystem an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    Device = 1,
    Calibration = 2,
    Validation = 3,
    Other = 255,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Calibration => "calibration",
            Self::Validation => "validation",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How loudly a failure is reported.
///
/// Maps onto the host log channel: `Info` is a message, `Warning` a
/// warning, `Error` and `Critical` an error. Ordered from least to most
/// severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    Info = 0,
    Warning = 1,
    /// The operation failed; the wheel is still usable
    Error = 2,
    /// The wheel is gone or in an unknown state
    Critical = 3,
}

impl ErrorSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
