//! In-memory HID devices for hardware-free testing
//!
//! Every device added to a [`MockHidPort`] shares one [`Journal`], so tests
//! can assert on the global order of writes and closes across several
//! wheels. Failures can be injected per device.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{HidCommonError, HidCommonResult, HidDeviceInfo, HidPort, HidTransport};

/// One observable event on a mock device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    Write { path: String, data: Vec<u8> },
    Close { path: String },
}

/// Shared, ordered record of everything the mock devices observed.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: JournalEntry) {
        self.entries.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().clone()
    }

    /// All successful writes to `path`, in order.
    pub fn writes_to(&self, path: &str) -> Vec<Vec<u8>> {
        self.entries
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::Write { path: p, data } if p == path => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[derive(Debug, Default)]
struct DeviceState {
    open: bool,
    connected: bool,
    writes_attempted: usize,
    fail_open: bool,
    fail_close: bool,
    fail_write_at: Option<usize>,
    fail_opcode: Option<u8>,
    close_calls: usize,
}

/// A scriptable fake wheel.
///
/// Clones share state, so a test can keep one handle for inspection while
/// the controller owns the transport opened from the port.
#[derive(Debug, Clone)]
pub struct MockHidDevice {
    info: HidDeviceInfo,
    state: Arc<Mutex<DeviceState>>,
    journal: Journal,
}

impl MockHidDevice {
    pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
        Self::from_info(HidDeviceInfo::new(vendor_id, product_id, path))
    }

    pub fn from_info(info: HidDeviceInfo) -> Self {
        Self {
            info,
            state: Arc::new(Mutex::new(DeviceState {
                open: true,
                connected: true,
                ..DeviceState::default()
            })),
            journal: Journal::new(),
        }
    }

    pub fn info(&self) -> &HidDeviceInfo {
        &self.info
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Successful writes to this device, in order.
    pub fn get_write_history(&self) -> Vec<Vec<u8>> {
        self.journal.writes_to(&self.info.path)
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().close_calls
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.state.lock().fail_open = fail;
    }

    pub fn set_fail_close(&self, fail: bool) {
        self.state.lock().fail_close = fail;
    }

    /// Fail the `n`th write attempt (1-based) counted from device creation.
    pub fn fail_write_at(&self, n: usize) {
        self.state.lock().fail_write_at = Some(n);
    }

    /// Fail every write whose first byte equals `opcode`.
    pub fn fail_opcode(&self, opcode: u8) {
        self.state.lock().fail_opcode = Some(opcode);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.fail_open = false;
        state.fail_close = false;
        state.fail_write_at = None;
        state.fail_opcode = None;
    }

    pub fn disconnect(&self) {
        self.state.lock().connected = false;
    }

    pub fn reconnect(&self) {
        self.state.lock().connected = true;
    }

    fn path(&self) -> String {
        self.info.path.clone()
    }
}

impl HidTransport for MockHidDevice {
    fn write_report(&mut self, data: &[u8]) -> HidCommonResult<usize> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(HidCommonError::Disconnected(self.path()));
        }
        if !state.open {
            return Err(HidCommonError::NotOpen(self.path()));
        }

        state.writes_attempted += 1;
        let nth = state.writes_attempted;
        let injected = state.fail_write_at == Some(nth)
            || (state.fail_opcode.is_some() && data.first().copied() == state.fail_opcode);
        if injected {
            return Err(HidCommonError::WriteError {
                path: self.path(),
                message: format!("injected failure on write #{nth}"),
            });
        }
        drop(state);

        self.journal.push(JournalEntry::Write {
            path: self.path(),
            data: data.to_vec(),
        });
        Ok(data.len())
    }

    fn close(&mut self) -> HidCommonResult<()> {
        let mut state = self.state.lock();
        state.close_calls += 1;
        if !state.open {
            return Ok(());
        }
        if state.fail_close {
            return Err(HidCommonError::CloseError {
                path: self.path(),
                message: "injected close failure".to_string(),
            });
        }
        state.open = false;
        drop(state);

        self.journal.push(JournalEntry::Close { path: self.path() });
        Ok(())
    }

    fn is_open(&self) -> bool {
        let state = self.state.lock();
        state.open && state.connected
    }

    fn device_info(&self) -> &HidDeviceInfo {
        &self.info
    }
}

/// A fake HID subsystem holding a fixed set of [`MockHidDevice`]s.
#[derive(Debug, Default)]
pub struct MockHidPort {
    devices: Vec<MockHidDevice>,
    journal: Journal,
    fail_enumeration: bool,
}

impl MockHidPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device; it is rebound onto the port's shared journal.
    /// Returns an inspection handle sharing the device's state.
    pub fn add_device(&mut self, device: MockHidDevice) -> MockHidDevice {
        let device = MockHidDevice {
            journal: self.journal.clone(),
            ..device
        };
        self.devices.push(device.clone());
        device
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn set_fail_enumeration(&mut self, fail: bool) {
        self.fail_enumeration = fail;
    }
}

impl HidPort for MockHidPort {
    fn list_devices(&self) -> HidCommonResult<Vec<HidDeviceInfo>> {
        if self.fail_enumeration {
            return Err(HidCommonError::Backend("injected enumeration failure".into()));
        }
        Ok(self.devices.iter().map(|d| d.info.clone()).collect())
    }

    fn open_device(&self, info: &HidDeviceInfo) -> HidCommonResult<Box<dyn HidTransport>> {
        let device = self
            .devices
            .iter()
            .find(|d| d.info.path == info.path)
            .ok_or_else(|| HidCommonError::DeviceNotFound(info.path.clone()))?;

        let mut state = device.state.lock();
        if state.fail_open {
            return Err(HidCommonError::OpenError {
                path: info.path.clone(),
                message: "injected open failure".into(),
            });
        }
        if !state.connected {
            return Err(HidCommonError::Disconnected(info.path.clone()));
        }
        state.open = true;
        drop(state);

        Ok(Box::new(device.clone()))
    }
}
