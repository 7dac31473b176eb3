//! Telemetry model for the TruckFFB driver.
//!
//! The host pushes sparse, typed channel values every simulation frame.
//! [`TelemetrySample`] holds the latest value of every channel the driver
//! cares about; [`TerrainState`] is the small rolling estimator the force
//! model advances on every force update.
//!
//! Axis convention for the local vectors: `x` lateral, `y` vertical,
//! `z` longitudinal.

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod channel;
pub mod frame;
pub mod sample;
pub mod terrain;

pub use channel::{Channel, TelemetryValue, ValueKind};
pub use frame::{FrameClock, FrameStart};
pub use sample::{Orientation, TelemetrySample, Vec3};
pub use terrain::TerrainState;

/// Standard gravity, used to express accelerations in g.
pub const GRAVITY: f32 = 9.81;

/// Conversion factor from m/s to km/h.
pub const MS_TO_KMH: f32 = 3.6;
