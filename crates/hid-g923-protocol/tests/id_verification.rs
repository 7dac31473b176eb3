//! Cross-reference tests for the G923 ids and opcode table.
//!
//! These values are the bit-exact compatibility surface with the wheel
//! firmware. Change them only together with a captured trace.

use truckffb_hid_g923_protocol::{
    G923_COMPOSITE_ID, KNOWN_WHEEL_IDS, LOGITECH_VENDOR_ID, composite_device_id, effect_types,
    led_patterns, opcodes, product_ids,
};

#[test]
fn vendor_id_is_046d() {
    assert_eq!(LOGITECH_VENDOR_ID, 0x046D);
}

#[test]
fn g923_pid_is_c266() {
    assert_eq!(product_ids::G923, 0xC266);
}

#[test]
fn composite_id_is_pid_high_vid_low() {
    assert_eq!(G923_COMPOSITE_ID, 0xC266_046D);
    assert_eq!(
        composite_device_id(LOGITECH_VENDOR_ID, product_ids::G923),
        G923_COMPOSITE_ID
    );
}

#[test]
fn allowlist_contains_only_g923() {
    assert_eq!(KNOWN_WHEEL_IDS, &[G923_COMPOSITE_ID]);
}

// ── Opcodes ──────────────────────────────────────────────────────────────────

#[test]
fn opcode_table() {
    assert_eq!(opcodes::DISABLE_AUTOCENTER, 0xF5);
    assert_eq!(opcodes::ENABLE_AUTOCENTER, 0xF4);
    assert_eq!(opcodes::SET_AUTOCENTER_SPRING, 0xFE);
    assert_eq!(opcodes::SET_FORCE_EFFECT, 0xF1);
    assert_eq!(opcodes::STOP_FORCES, 0xF3);
    assert_eq!(opcodes::SET_LED_PATTERN, 0xF8);
    assert_eq!(opcodes::LED_SUBTYPE, 0x12);
}

#[test]
fn effect_type_table() {
    assert_eq!(effect_types::CONSTANT, 0x00);
    assert_eq!(effect_types::SPRING, 0x01);
    assert_eq!(effect_types::DAMPER, 0x02);
    assert_eq!(effect_types::TRAPEZOID, 0x06);
}

// ── LED patterns ─────────────────────────────────────────────────────────────

#[test]
fn led_patterns_light_from_the_left() {
    let steps = [
        led_patterns::OFF,
        led_patterns::STEP_1,
        led_patterns::STEP_2,
        led_patterns::STEP_3,
        led_patterns::STEP_4,
        led_patterns::STEP_5,
    ];
    assert_eq!(steps, [0x00, 0x01, 0x03, 0x07, 0x0F, 0x1F]);
    for pair in steps.windows(2) {
        assert_eq!(pair[1], (pair[0] << 1) | 1, "each step adds one LED");
    }
}

#[test]
fn sweep_covers_every_five_bit_pattern() {
    assert_eq!(led_patterns::SWEEP_LEN, 32);
}
