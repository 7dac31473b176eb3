//! Device signature checks and the packed 4-bit field type.

#![deny(static_mut_refs)]

use core::fmt;

use crate::ids::{KNOWN_WHEEL_IDS, LOGITECH_VENDOR_ID, product_ids};

/// Build the composite device id used by the allowlist.
pub const fn composite_device_id(vendor_id: u16, product_id: u16) -> u32 {
    ((product_id as u32) << 16) | vendor_id as u32
}

/// Return `true` if the composite id is on the known-wheel allowlist.
pub fn is_known_wheel(composite_id: u32) -> bool {
    KNOWN_WHEEL_IDS.contains(&composite_id)
}

/// Return `true` if the vendor/product pair matches the supported wheel signature.
pub fn is_supported_wheel(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == LOGITECH_VENDOR_ID && product_id == product_ids::G923
}

/// A 4-bit value, used for the nibble-packed coefficient fields of the
/// spring and trapezoid effects.
///
/// Construction is checked, so a packed byte can never carry bits from a
/// neighbouring field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Nibble(u8);

/// Returned when a value does not fit in four bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("value {0} does not fit in a nibble (max 15)")]
pub struct NibbleOutOfRange(pub u8);

impl Nibble {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(0x0F);

    /// Checked constructor.
    pub const fn new(value: u8) -> Option<Self> {
        if value <= 0x0F { Some(Self(value)) } else { None }
    }

    /// Clamp `value` into `0..=15`.
    pub const fn saturating(value: u8) -> Self {
        if value > 0x0F { Self::MAX } else { Self(value) }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Pack `high` into bits 4..8 and `low` into bits 0..4.
    pub const fn pack(high: Self, low: Self) -> u8 {
        (high.0 << 4) | low.0
    }
}

impl TryFrom<u8> for Nibble {
    type Error = NibbleOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(NibbleOutOfRange(value))
    }
}

impl From<Nibble> for u8 {
    fn from(n: Nibble) -> Self {
        n.0
    }
}

impl fmt::Display for Nibble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
