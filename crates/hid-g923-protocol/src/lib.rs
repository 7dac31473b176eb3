//! Logitech G923 output protocol: device ids and 8-byte command encoding.
//!
//! This crate is intentionally I/O-free and allocation-free. Every builder
//! is a pure function returning a fixed-size [`Command`], so the whole wire
//! format can be tested without hardware.

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod ids;
pub mod output;
pub mod types;

pub use ids::{
    G923_COMPOSITE_ID, KNOWN_WHEEL_IDS, LOGITECH_VENDOR_ID, effect_types, led_patterns, opcodes,
    product_ids,
};
pub use output::{
    COMMAND_LEN, Command, FORCE_EFFECT_PARAM_SLOTS, build_autocenter_spring,
    build_constant_force, build_custom_spring, build_damper, build_disable_autocenter,
    build_enable_autocenter, build_force_effect, build_led_pattern, build_stop_forces,
    build_trapezoid,
};
pub use types::{Nibble, NibbleOutOfRange, composite_device_id, is_known_wheel, is_supported_wheel};
