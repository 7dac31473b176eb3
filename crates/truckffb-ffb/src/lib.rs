//! Force feedback model for heavy trucks.
//!
//! [`ForceCalculator`] turns one [`TelemetrySample`] into the byte-level
//! [`ForceParameters`] the wheel understands, advancing a [`TerrainState`]
//! as it goes. [`LedController`] derives the rev-light pattern from the same
//! sample. Both are configured once from an immutable [`FfbConfig`].
//!
//! ```
//! use truckffb_ffb::{FfbConfig, ForceCalculator};
//! use truckffb_telemetry::{TelemetrySample, TerrainState};
//!
//! let calc = ForceCalculator::new(FfbConfig::default());
//! let mut terrain = TerrainState::new();
//! let params = calc.calculate(&TelemetrySample::new(), &mut terrain);
//! assert_eq!(params.autocenter_force, 0);
//! assert_eq!(params.damper_force_positive, 4);
//! ```
//!
//! [`TelemetrySample`]: truckffb_telemetry::TelemetrySample
//! [`TerrainState`]: truckffb_telemetry::TerrainState

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod force;
pub mod led;

pub use config::FfbConfig;
pub use force::{ForceCalculator, ForceParameters, clamp_to_byte};
pub use led::LedController;
