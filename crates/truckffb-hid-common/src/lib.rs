//! Common HID utilities for the TruckFFB wheel driver
//!
//! This crate is the boundary between the driver and the platform HID
//! subsystem. It owns the device identity type, the synchronous transport
//! traits the wheel controller writes through, and an in-memory mock used
//! by every hardware-free test in the workspace.
//!
//! The real backend lives behind the `hidapi` feature.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod device_info;
#[cfg(feature = "hidapi")]
#[cfg_attr(docsrs, doc(cfg(feature = "hidapi")))]
pub mod hidapi_port;
pub mod mock;
pub mod transport;

pub use device_info::*;
#[cfg(feature = "hidapi")]
pub use hidapi_port::HidApiPort;
pub use transport::*;

use thiserror::Error;
use truckffb_errors::DeviceError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HidCommonError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open device {path}: {message}")]
    OpenError { path: String, message: String },

    #[error("Failed to write to device {path}: {message}")]
    WriteError { path: String, message: String },

    #[error("Failed to close device {path}: {message}")]
    CloseError { path: String, message: String },

    #[error("Device {0} is not open")]
    NotOpen(String),

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    #[error("Device disconnected: {0}")]
    Disconnected(String),

    #[error("HID backend error: {0}")]
    Backend(String),
}

pub type HidCommonResult<T> = Result<T, HidCommonError>;

impl From<HidCommonError> for DeviceError {
    fn from(err: HidCommonError) -> Self {
        match err {
            HidCommonError::DeviceNotFound(path) => DeviceError::NotFound(path),
            HidCommonError::OpenError { path, message } => DeviceError::ConnectionFailed {
                device: path,
                message,
            },
            HidCommonError::WriteError { path, message } => DeviceError::WriteFailed {
                device: path,
                message,
            },
            HidCommonError::CloseError { path, message } => DeviceError::CloseFailed {
                device: path,
                message,
            },
            HidCommonError::NotOpen(path) => DeviceError::NotOpen(path),
            HidCommonError::InvalidReport(message) => DeviceError::WriteFailed {
                device: String::from("<report>"),
                message,
            },
            HidCommonError::Disconnected(path) => DeviceError::Disconnected(path),
            HidCommonError::Backend(message) => DeviceError::ConnectionFailed {
                device: String::from("<hid>"),
                message,
            },
        }
    }
}
