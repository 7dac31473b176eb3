//! Synchronous HID transport traits
//!
//! The driver runs on the host's simulation thread and every write is a
//! single blocking output report, so these traits are deliberately sync.

use tracing::{debug, warn};

use crate::{HidCommonResult, HidDeviceInfo};

/// One open device handle, exclusively owned by a single controller.
pub trait HidTransport: Send {
    /// Write one output report. Returns the number of payload bytes written.
    fn write_report(&mut self, data: &[u8]) -> HidCommonResult<usize>;

    /// Release the handle. Closing an already-closed transport succeeds.
    fn close(&mut self) -> HidCommonResult<()>;

    fn is_open(&self) -> bool;

    fn device_info(&self) -> &HidDeviceInfo;
}

/// Device enumeration and opening.
pub trait HidPort {
    fn list_devices(&self) -> HidCommonResult<Vec<HidDeviceInfo>>;

    fn open_device(&self, info: &HidDeviceInfo) -> HidCommonResult<Box<dyn HidTransport>>;
}

/// Enumerate `port` and keep only devices whose composite id is in `allowlist`.
pub fn find_known_wheels(
    port: &dyn HidPort,
    allowlist: &[u32],
) -> HidCommonResult<Vec<HidDeviceInfo>> {
    let devices = port.list_devices()?;
    let total = devices.len();
    let known: Vec<HidDeviceInfo> = devices
        .into_iter()
        .filter(|info| allowlist.contains(&info.composite_id()))
        .collect();

    if known.is_empty() {
        warn!(enumerated = total, "No supported wheels found");
    } else {
        debug!(enumerated = total, matched = known.len(), "Found supported wheels");
    }
    Ok(known)
}
