//! `hidapi` backed transport

use std::ffi::CString;

use hidapi::{HidApi, HidDevice};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{HidCommonError, HidCommonResult, HidDeviceInfo, HidPort, HidTransport};

/// Report id prefix for devices without numbered reports.
const UNNUMBERED_REPORT_ID: u8 = 0x00;

pub struct HidApiPort {
    api: Mutex<HidApi>,
}

impl HidApiPort {
    pub fn new() -> HidCommonResult<Self> {
        let api = HidApi::new().map_err(|e| HidCommonError::Backend(e.to_string()))?;
        Ok(Self {
            api: Mutex::new(api),
        })
    }
}

impl HidPort for HidApiPort {
    fn list_devices(&self) -> HidCommonResult<Vec<HidDeviceInfo>> {
        let mut api = self.api.lock();
        api.refresh_devices()
            .map_err(|e| HidCommonError::Backend(e.to_string()))?;

        Ok(api
            .device_list()
            .map(|d| HidDeviceInfo {
                vendor_id: d.vendor_id(),
                product_id: d.product_id(),
                path: d.path().to_string_lossy().into_owned(),
                serial_number: d.serial_number().map(str::to_owned),
                product_name: d.product_string().map(str::to_owned),
            })
            .collect())
    }

    fn open_device(&self, info: &HidDeviceInfo) -> HidCommonResult<Box<dyn HidTransport>> {
        let path = CString::new(info.path.as_str()).map_err(|e| HidCommonError::OpenError {
            path: info.path.clone(),
            message: e.to_string(),
        })?;
        let device = self
            .api
            .lock()
            .open_path(&path)
            .map_err(|e| HidCommonError::OpenError {
                path: info.path.clone(),
                message: e.to_string(),
            })?;

        debug!(path = %info.path, "Opened HID device");
        Ok(Box::new(HidApiTransport {
            device: Some(device),
            info: info.clone(),
        }))
    }
}

pub struct HidApiTransport {
    device: Option<HidDevice>,
    info: HidDeviceInfo,
}

impl HidTransport for HidApiTransport {
    fn write_report(&mut self, data: &[u8]) -> HidCommonResult<usize> {
        let device = self
            .device
            .as_ref()
            .ok_or_else(|| HidCommonError::NotOpen(self.info.path.clone()))?;

        let mut report = Vec::with_capacity(data.len() + 1);
        report.push(UNNUMBERED_REPORT_ID);
        report.extend_from_slice(data);

        let written = device
            .write(&report)
            .map_err(|e| HidCommonError::WriteError {
                path: self.info.path.clone(),
                message: e.to_string(),
            })?;
        if written < report.len() {
            warn!(path = %self.info.path, written, expected = report.len(), "Short HID write");
        }
        Ok(written.saturating_sub(1))
    }

    fn close(&mut self) -> HidCommonResult<()> {
        // hidapi closes the handle on drop
        if self.device.take().is_some() {
            debug!(path = %self.info.path, "Closed HID device");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn device_info(&self) -> &HidDeviceInfo {
        &self.info
    }
}
