//! G923 output report encoding.
//!
//! All functions are pure and allocation-free.
//!
//! # Protocol notes
//!
//! Every command is exactly 8 bytes. Byte 0 is the command-class opcode;
//! the remaining bytes are class specific and zero padded.
//!
//! ```text
//! disable autocenter  F5 00 00 00 00 00 00 00
//! enable autocenter   F4 00 00 00 00 00 00 00
//! autocenter spring   FE 00 k1 k2 cl 00 00 00
//! stop forces         F3 00 00 00 00 00 00 00
//! LED pattern         F8 12 pp 00 00 00 00 00
//! force effect        F1 tt p0 p1 p2 p3 p4 p5
//! ```
//!
//! ## Force effect parameter layouts
//!
//! | Effect    | Type | Parameters |
//! |-----------|------|------------|
//! | Constant  | `00` | `f f f f 00` (all four magnitude slots identical) |
//! | Spring    | `01` | `d1 d2 (k2<<4)\|k1 (s2<<4)\|s1 clip` |
//! | Damper    | `02` | `k1 s1 k2 s2 00` |
//! | Trapezoid | `06` | `l1 l2 t1 t2 (t3<<4)\|s` |

#![deny(static_mut_refs)]

use core::fmt;

use crate::ids::{effect_types, opcodes};
use crate::types::Nibble;

/// Wire size of every G923 output report.
pub const COMMAND_LEN: usize = 8;

/// Parameter bytes available after the opcode and effect type.
pub const FORCE_EFFECT_PARAM_SLOTS: usize = COMMAND_LEN - 2;

/// One encoded output report. Equality is byte-wise.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Command([u8; COMMAND_LEN]);

impl Command {
    pub const fn from_bytes(bytes: [u8; COMMAND_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; COMMAND_LEN] {
        &self.0
    }

    pub const fn into_bytes(self) -> [u8; COMMAND_LEN] {
        self.0
    }

    pub const fn opcode(&self) -> u8 {
        self.0[0]
    }

    const fn with_header(opcode: u8, subtype: u8) -> Self {
        let mut bytes = [0u8; COMMAND_LEN];
        bytes[0] = opcode;
        bytes[1] = subtype;
        Self(bytes)
    }
}

impl AsRef<[u8]> for Command {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({:02X?})", self.0)
    }
}

/// Build the disable-autocenter command (`0xF5`).
pub const fn build_disable_autocenter() -> Command {
    Command::with_header(opcodes::DISABLE_AUTOCENTER, 0x00)
}

/// Build the enable-autocenter command (`0xF4`).
pub const fn build_enable_autocenter() -> Command {
    Command::with_header(opcodes::ENABLE_AUTOCENTER, 0x00)
}

/// Build the autocenter spring command (`0xFE`).
///
/// `k1`/`k2` are the per-side spring strengths and `clip` the saturation level.
pub const fn build_autocenter_spring(k1: u8, k2: u8, clip: u8) -> Command {
    let mut cmd = Command::with_header(opcodes::SET_AUTOCENTER_SPRING, 0x00);
    cmd.0[2] = k1;
    cmd.0[3] = k2;
    cmd.0[4] = clip;
    cmd
}

/// Build the stop-all-forces command (`0xF3`).
pub const fn build_stop_forces() -> Command {
    Command::with_header(opcodes::STOP_FORCES, 0x00)
}

/// Build the LED pattern command (`0xF8 0x12`).
pub const fn build_led_pattern(pattern: u8) -> Command {
    let mut cmd = Command::with_header(opcodes::SET_LED_PATTERN, opcodes::LED_SUBTYPE);
    cmd.0[2] = pattern;
    cmd
}

/// Build a force effect command (`0xF1`) with raw parameter bytes.
///
/// Parameters beyond [`FORCE_EFFECT_PARAM_SLOTS`] are dropped.
pub fn build_force_effect(effect_type: u8, params: &[u8]) -> Command {
    let mut cmd = Command::with_header(opcodes::SET_FORCE_EFFECT, effect_type);
    for (slot, &param) in cmd.0[2..].iter_mut().zip(params) {
        *slot = param;
    }
    cmd
}

/// Build a constant force effect. All four magnitude slots carry `force`.
pub fn build_constant_force(force: u8) -> Command {
    build_force_effect(effect_types::CONSTANT, &[force, force, force, force, 0x00])
}

/// Build a spring effect with deadband `d1`/`d2`, packed coefficients
/// `k1`/`k2`, packed saturations `s1`/`s2` and clip level.
pub fn build_custom_spring(
    d1: u8,
    d2: u8,
    k1: Nibble,
    k2: Nibble,
    s1: Nibble,
    s2: Nibble,
    clip: u8,
) -> Command {
    build_force_effect(
        effect_types::SPRING,
        &[d1, d2, Nibble::pack(k2, k1), Nibble::pack(s2, s1), clip],
    )
}

/// Build a damper effect.
///
/// Argument order is `(k1, k2, s1, s2)`; on the wire the pairs interleave
/// as `k1 s1 k2 s2`.
pub fn build_damper(k1: u8, k2: u8, s1: u8, s2: u8) -> Command {
    build_force_effect(effect_types::DAMPER, &[k1, s1, k2, s2, 0x00])
}

/// Build a trapezoid (periodic) effect.
pub fn build_trapezoid(l1: u8, l2: u8, t1: u8, t2: u8, t3: Nibble, s: Nibble) -> Command {
    build_force_effect(effect_types::TRAPEZOID, &[l1, l2, t1, t2, Nibble::pack(t3, s)])
}
