//! Integration tests for the truckffb-hid-common crate.
//!
//! Covers device identity, wheel discovery, the mock journal and failure
//! injection, and error conversion.

use proptest::prelude::*;
use truckffb_errors::DeviceError;
use truckffb_hid_common::{
    HidCommonError, HidDeviceInfo, HidPort, HidTransport, find_known_wheels,
    mock::{JournalEntry, MockHidDevice, MockHidPort},
};

const G923_COMPOSITE: u32 = 0xC266_046D;

// ---------------------------------------------------------------------------
// HidDeviceInfo
// ---------------------------------------------------------------------------

#[test]
fn device_info_serde_roundtrip() -> Result<(), serde_json::Error> {
    let info = HidDeviceInfo::new(0x046D, 0xC266, "/dev/hidraw4")
        .with_serial("SN-0042")
        .with_product_name("G923 Racing Wheel");
    let json = serde_json::to_string(&info)?;
    let deserialized: HidDeviceInfo = serde_json::from_str(&json)?;
    assert_eq!(deserialized, info);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn composite_id_splits_back_into_ids(vid in any::<u16>(), pid in any::<u16>()) {
        let id = HidDeviceInfo::new(vid, pid, "p").composite_id();
        prop_assert_eq!((id & 0xFFFF) as u16, vid);
        prop_assert_eq!((id >> 16) as u16, pid);
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[test]
fn discovery_returns_every_g923() -> Result<(), HidCommonError> {
    let mut port = MockHidPort::new();
    port.add_device(MockHidDevice::new(0x046D, 0xC266, "/dev/hidraw0"));
    port.add_device(MockHidDevice::new(0x046D, 0xC262, "/dev/hidraw1"));
    port.add_device(MockHidDevice::new(0x046D, 0xC266, "/dev/hidraw2"));

    let wheels = find_known_wheels(&port, &[G923_COMPOSITE])?;
    let paths: Vec<_> = wheels.iter().map(|w| w.path.as_str()).collect();
    assert_eq!(paths, ["/dev/hidraw0", "/dev/hidraw2"]);
    Ok(())
}

#[test]
fn discovery_propagates_enumeration_failure() {
    let mut port = MockHidPort::new();
    port.set_fail_enumeration(true);
    assert!(matches!(
        find_known_wheels(&port, &[G923_COMPOSITE]),
        Err(HidCommonError::Backend(_))
    ));
}

// ---------------------------------------------------------------------------
// Mock transport
// ---------------------------------------------------------------------------

#[test]
fn journal_preserves_cross_device_order() -> Result<(), HidCommonError> {
    let mut port = MockHidPort::new();
    let a = port.add_device(MockHidDevice::new(0x046D, 0xC266, "a"));
    let b = port.add_device(MockHidDevice::new(0x046D, 0xC266, "b"));

    let mut ta = port.open_device(a.info())?;
    let mut tb = port.open_device(b.info())?;
    ta.write_report(&[0xF3])?;
    tb.write_report(&[0xF3])?;
    ta.close()?;

    assert_eq!(
        port.journal().entries(),
        vec![
            JournalEntry::Write { path: "a".into(), data: vec![0xF3] },
            JournalEntry::Write { path: "b".into(), data: vec![0xF3] },
            JournalEntry::Close { path: "a".into() },
        ]
    );
    Ok(())
}

#[test]
fn failed_close_keeps_device_open() -> Result<(), HidCommonError> {
    let mut port = MockHidPort::new();
    let dev = port.add_device(MockHidDevice::new(0x046D, 0xC266, "a"));
    dev.set_fail_close(true);

    let mut transport = port.open_device(dev.info())?;
    assert!(transport.close().is_err());
    assert!(transport.is_open());

    dev.clear_failures();
    transport.close()?;
    assert!(!transport.is_open());
    Ok(())
}

#[test]
fn reopen_after_close() -> Result<(), HidCommonError> {
    let mut port = MockHidPort::new();
    let dev = port.add_device(MockHidDevice::new(0x046D, 0xC266, "a"));

    let mut first = port.open_device(dev.info())?;
    first.close()?;
    let mut second = port.open_device(dev.info())?;
    second.write_report(&[0xF8, 0x12, 0x00])?;
    assert_eq!(dev.get_write_history(), vec![vec![0xF8, 0x12, 0x00]]);
    Ok(())
}

#[test]
fn open_disconnected_device_fails() {
    let mut port = MockHidPort::new();
    let dev = port.add_device(MockHidDevice::new(0x046D, 0xC266, "a"));
    dev.disconnect();

    let err = port.open_device(dev.info()).err();
    assert_eq!(err, Some(HidCommonError::Disconnected("a".into())));
}

// ---------------------------------------------------------------------------
// Error conversion
// ---------------------------------------------------------------------------

#[test]
fn open_error_maps_to_connection_failed() {
    let err: DeviceError = HidCommonError::OpenError {
        path: "a".into(),
        message: "permission denied".into(),
    }
    .into();
    assert_eq!(
        err,
        DeviceError::ConnectionFailed {
            device: "a".into(),
            message: "permission denied".into(),
        }
    );
}

#[test]
fn not_found_maps_to_unavailable() {
    let err: DeviceError = HidCommonError::DeviceNotFound("a".into()).into();
    assert!(err.is_device_unavailable());
}
