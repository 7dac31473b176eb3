//! TruckFFB driver core.
//!
//! Ties the force and LED models to physical wheels:
//!
//! - [`wheel`]: one controller per G923, owning its transport from
//!   initialization through calibration to teardown
//! - [`control_loop`]: the caller-owned, frame-driven orchestrator
//! - [`host`]: adapter from telemetry host callbacks to the control loop
//! - [`timing`]: settle times and the delay they are waited on
//!
//! ```
//! use std::sync::Arc;
//! use truckffb_engine::{ControlLoop, NoDelay, WheelTimings};
//! use truckffb_ffb::FfbConfig;
//! use truckffb_hid_common::mock::{MockHidDevice, MockHidPort};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut port = MockHidPort::new();
//! port.add_device(MockHidDevice::new(0x046D, 0xC266, "/dev/hidraw0"));
//!
//! let mut control =
//!     ControlLoop::with_timing(FfbConfig::default(), WheelTimings::immediate(), Arc::new(NoDelay))?;
//! assert_eq!(control.initialize(&port)?, 1);
//!
//! control.set_paused(false);
//! let tick = control.advance();
//! assert!(tick.forces.is_some());
//! assert!(!tick.degraded());
//! # Ok(())
//! # }
//! ```

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod control_loop;
pub mod host;
pub mod timing;
pub mod wheel;

pub use control_loop::{ControlLoop, TickReport};
pub use host::{GameCompatibility, GameInfo, GameVersion, HostAdapter, HostEvent, TruckGame};
pub use timing::{Delay, NoDelay, RecordingDelay, ThreadDelay, WheelTimings};
pub use wheel::{DispatchReport, WheelController, WheelState};
