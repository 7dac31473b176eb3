//! G923 USB ids, opcodes and LED pattern bytes.

#![deny(static_mut_refs)]

/// Logitech USB vendor ID.
pub const LOGITECH_VENDOR_ID: u16 = 0x046D;

/// Known product IDs.
pub mod product_ids {
    /// G923 racing wheel as enumerated by the host HID subsystem.
    pub const G923: u16 = 0xC266;
}

/// Composite id of the G923: product id in the high half, vendor id in the low half.
pub const G923_COMPOSITE_ID: u32 = 0xC266_046D;

/// Allowlist used by device discovery.
pub const KNOWN_WHEEL_IDS: &[u32] = &[G923_COMPOSITE_ID];

/// Command-class opcodes carried in byte 0 of every output report.
pub mod opcodes {
    /// Turn off the built-in centering spring.
    pub const DISABLE_AUTOCENTER: u8 = 0xF5;
    /// Turn on the built-in centering spring.
    pub const ENABLE_AUTOCENTER: u8 = 0xF4;
    /// Configure the built-in centering spring.
    pub const SET_AUTOCENTER_SPRING: u8 = 0xFE;
    /// Download and play a force effect; byte 1 selects the effect type.
    pub const SET_FORCE_EFFECT: u8 = 0xF1;
    /// Stop all playing force effects.
    pub const STOP_FORCES: u8 = 0xF3;
    /// Set the rev-light LEDs; byte 1 is [`LED_SUBTYPE`].
    pub const SET_LED_PATTERN: u8 = 0xF8;
    /// Fixed sub-type byte of the LED command.
    pub const LED_SUBTYPE: u8 = 0x12;
}

/// Effect type bytes for [`opcodes::SET_FORCE_EFFECT`].
pub mod effect_types {
    pub const CONSTANT: u8 = 0x00;
    pub const SPRING: u8 = 0x01;
    pub const DAMPER: u8 = 0x02;
    pub const TRAPEZOID: u8 = 0x06;
}

/// Rev-light patterns, lighting LEDs from the left.
pub mod led_patterns {
    pub const OFF: u8 = 0x00;
    pub const STEP_1: u8 = 0x01;
    pub const STEP_2: u8 = 0x03;
    pub const STEP_3: u8 = 0x07;
    pub const STEP_4: u8 = 0x0F;
    pub const STEP_5: u8 = 0x1F;

    /// Number of raw pattern values swept during calibration (`0..SWEEP_LEN`).
    pub const SWEEP_LEN: u8 = 0x20;
}
