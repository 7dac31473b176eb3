//! Identity of an enumerated wheel.

use serde::{Deserialize, Serialize};

/// Identity of one enumerated HID device.
///
/// `path` is the platform handle used to open the device; an empty path
/// means the enumeration produced no usable handle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HidDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub path: String,
    pub serial_number: Option<String>,
    pub product_name: Option<String>,
}

impl HidDeviceInfo {
    pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
        Self {
            vendor_id,
            product_id,
            path: path.into(),
            serial_number: None,
            product_name: None,
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// Combined device id: product id in the high half, vendor id in the low half.
    pub fn composite_id(&self) -> u32 {
        (u32::from(self.product_id) << 16) | u32::from(self.vendor_id)
    }

    pub fn has_handle(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn display_name(&self) -> String {
        self.product_name
            .clone()
            .unwrap_or_else(|| format!("{:04x}:{:04x}", self.vendor_id, self.product_id))
    }
}
