//! Centralized error types for TruckFFB
//!
//! Every hardware-facing operation in the driver reports failure through one
//! of the types in this crate instead of panicking. The control loop turns
//! these into a per-tick "degraded" flag and keeps the simulation running.
//!
//! # Architecture
//!
//! - [`common`]: the top-level [`TruckFfbError`] wrapper, categories and severities
//! - [`device`]: discovery, open/close and report-write failures
//! - [`calibration`]: failures of the one-shot wheel calibration sequence
//! - [`validation`]: configuration validation failures
//!
//! # Example
//!
//! ```
//! use truckffb_errors::{DeviceError, ErrorSeverity, TruckFfbError};
//!
//! let err: TruckFfbError = DeviceError::not_found("G923").into();
//! assert_eq!(err.severity(), ErrorSeverity::Error);
//! assert!(err.is_recoverable());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod calibration;
pub mod common;
pub mod device;
pub mod validation;

pub use calibration::{CalibrationError, CalibrationStep};
pub use common::{ErrorCategory, ErrorSeverity, TruckFfbError};
pub use device::DeviceError;
pub use validation::ValidationError;

/// A specialized `Result` type for TruckFFB operations.
pub type Result<T> = std::result::Result<T, TruckFfbError>;
