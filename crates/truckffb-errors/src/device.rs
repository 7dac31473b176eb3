//! Device and transport error types.
//!
//! Covers device discovery, opening and closing a wheel, and writing output
//! reports to it.

use crate::common::ErrorSeverity;

/// Failures talking to a wheel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// No matching device was found during discovery
    #[error("Device not found: {0}")]
    NotFound(String),

    /// The device identity carries no usable handle
    #[error("Invalid device handle for {0}")]
    InvalidHandle(String),

    /// The device does not match the supported wheel signature
    #[error("Unsupported device: vendor={vendor_id:#06x}, product={product_id:#06x}")]
    UnsupportedDevice {
        /// USB vendor ID
        vendor_id: u16,
        /// USB product ID
        product_id: u16,
    },

    /// Opening the transport failed
    #[error("Failed to open device {device}: {message}")]
    ConnectionFailed {
        /// Device identifier
        device: String,
        /// Transport message
        message: String,
    },

    /// A command was issued while the transport is closed
    #[error("Device {0} is not open")]
    NotOpen(String),

    /// Writing an output report failed
    #[error("Failed to write report to device {device}: {message}")]
    WriteFailed {
        /// Device identifier
        device: String,
        /// Transport message
        message: String,
    },

    /// Closing the transport failed
    #[error("Failed to close device {device}: {message}")]
    CloseFailed {
        /// Device identifier
        device: String,
        /// Transport message
        message: String,
    },

    /// Device was unplugged
    #[error("Device disconnected: {0}")]
    Disconnected(String),
}

impl DeviceError {
    /// Unplugged wheels are `Critical`; refusing a foreign device or a
    /// failed close only warrants a warning.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Disconnected(_) => ErrorSeverity::Critical,
            Self::UnsupportedDevice { .. } | Self::CloseFailed { .. } => ErrorSeverity::Warning,
            Self::NotFound(_)
            | Self::InvalidHandle(_)
            | Self::ConnectionFailed { .. }
            | Self::NotOpen(_)
            | Self::WriteFailed { .. } => ErrorSeverity::Error,
        }
    }

    /// No command can reach the wheel until it is found and opened again.
    pub fn is_device_unavailable(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Disconnected(_) | Self::NotOpen(_)
        )
    }

    pub fn not_found(device: impl Into<String>) -> Self {
        Self::NotFound(device.into())
    }

    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected(device.into())
    }

    pub fn unsupported(vendor_id: u16, product_id: u16) -> Self {
        Self::UnsupportedDevice {
            vendor_id,
            product_id,
        }
    }

    pub fn write_failed(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WriteFailed {
            device: device.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unplugged_wheel_is_critical() {
        assert_eq!(DeviceError::disconnected("G923").severity(), ErrorSeverity::Critical);
        assert_eq!(
            DeviceError::unsupported(0x046D, 0xC24F).severity(),
            ErrorSeverity::Warning
        );
        assert_eq!(
            DeviceError::write_failed("G923", "pipe").severity(),
            ErrorSeverity::Error
        );
    }

    #[test]
    fn test_unavailable_wheels() {
        assert!(DeviceError::not_found("G923").is_device_unavailable());
        assert!(DeviceError::NotOpen("/dev/hidraw0".into()).is_device_unavailable());
        assert!(!DeviceError::write_failed("G923", "timeout").is_device_unavailable());
        assert!(!DeviceError::unsupported(0x046D, 0xC24F).is_device_unavailable());
    }

    #[test]
    fn test_unsupported_shows_hex_ids() {
        let msg = DeviceError::unsupported(0x046D, 0xC24F).to_string();
        assert!(msg.contains("vendor=0x046d"));
        assert!(msg.contains("product=0xc24f"));
    }
}
