//! # PS2 Controller Protocol
//!
//! Command frames and response decoding for DualShock-style controllers.
//!
//! ## Frame Structure
//!
//! Every exchange is full duplex: the host clocks out a command frame and the
//! controller answers byte for byte.
//!
//! | Byte | Host sends | Controller answers |
//! |------|------------|--------------------|
//! | 0 | `0x01` (start) | `0xFF` |
//! | 1 | command | mode (`0x41`, `0x73`, `0x79`, `0xF3` in config) |
//! | 2 | `0x00` | `0x5A` |
//! | 3.. | arguments | data |
//!
//! ## Poll Response (mode `0x73` / `0x79`)
//!
//! | Byte | Content |
//! |------|---------|
//! | 3 | Select, L3, R3, Start, Up, Right, Down, Left (active low) |
//! | 4 | L2, R2, L1, R1, Triangle, Circle, Cross, Square (active low) |
//! | 5 | Right stick X |
//! | 6 | Right stick Y |
//! | 7 | Left stick X |
//! | 8 | Left stick Y |
//! | 9-20 | Button pressures (mode `0x79` only) |

use crate::controller::types::{ButtonSet, DeviceType, STICK_X_CENTER, STICK_Y_CENTER};
use crate::error::{Result, RoverBridgeError};

/// Start byte of every command frame.
pub const PS2_START: u8 = 0x01;

/// Marker the controller returns in byte 2 of a valid frame.
pub const PS2_ACK: u8 = 0x5A;

/// Digital-only mode.
pub const MODE_DIGITAL: u8 = 0x41;
/// Analog sticks enabled.
pub const MODE_ANALOG: u8 = 0x73;
/// Analog sticks and button pressures enabled.
pub const MODE_ANALOG_PRESSURE: u8 = 0x79;
/// Controller is in configuration mode.
pub const MODE_CONFIG: u8 = 0xF3;

/// Model byte of a wired DualShock.
pub const MODEL_DUALSHOCK: u8 = 0x03;
/// Model byte of a guitar controller.
pub const MODEL_GUITAR: u8 = 0x01;
/// Model byte of a 2.4 GHz wireless DualShock.
pub const MODEL_WIRELESS_DUALSHOCK: u8 = 0x0C;

/// Poll frame length without pressures.
pub const POLL_FRAME_LEN: usize = 9;
/// Poll frame length with pressures.
pub const POLL_FRAME_PRESSURE_LEN: usize = 21;

/// Enter configuration mode.
pub const ENTER_CONFIG: [u8; 5] = [0x01, 0x43, 0x00, 0x01, 0x00];
/// Switch to analog mode and lock the mode button.
pub const SET_ANALOG_LOCKED: [u8; 9] = [0x01, 0x44, 0x00, 0x01, 0x03, 0x00, 0x00, 0x00, 0x00];
/// Map both rumble motors to poll bytes 3 and 4.
pub const ENABLE_RUMBLE: [u8; 9] = [0x01, 0x4D, 0x00, 0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFF];
/// Report all twelve button pressures.
pub const ENABLE_PRESSURES: [u8; 9] = [0x01, 0x4F, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x00, 0x00];
/// Leave configuration mode.
pub const EXIT_CONFIG: [u8; 9] = [0x01, 0x43, 0x00, 0x00, 0x5A, 0x5A, 0x5A, 0x5A, 0x5A];
/// Query the controller model.
pub const QUERY_MODEL: [u8; 9] = [0x01, 0x45, 0x00, 0x5A, 0x5A, 0x5A, 0x5A, 0x5A, 0x5A];

/// One decoded poll response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollFrame {
    /// Mode byte reported by the controller.
    pub mode: u8,
    /// Held buttons (already inverted from active low).
    pub buttons: ButtonSet,
    pub right_stick_x: u8,
    pub right_stick_y: u8,
    pub left_stick_x: u8,
    pub left_stick_y: u8,
}

impl Default for PollFrame {
    fn default() -> Self {
        Self {
            mode: MODE_DIGITAL,
            buttons: ButtonSet::empty(),
            right_stick_x: STICK_X_CENTER,
            right_stick_y: STICK_Y_CENTER,
            left_stick_x: STICK_X_CENTER,
            left_stick_y: STICK_Y_CENTER,
        }
    }
}

/// Builds a poll frame.
///
/// # Arguments
///
/// * `small_motor` - Small rumble motor, on when non-zero
/// * `large_motor` - Large rumble motor speed
/// * `pressures` - Whether the controller was configured for pressures
#[must_use]
pub fn poll_command(small_motor: u8, large_motor: u8, pressures: bool) -> Vec<u8> {
    let len = if pressures {
        POLL_FRAME_PRESSURE_LEN
    } else {
        POLL_FRAME_LEN
    };
    let mut frame = vec![0u8; len];
    frame[0] = PS2_START;
    frame[1] = 0x42;
    frame[3] = if small_motor != 0 { 0x01 } else { 0x00 };
    frame[4] = large_motor;
    frame
}

/// Returns true for the modes a poll may legitimately report.
#[must_use]
pub fn is_known_mode(mode: u8) -> bool {
    matches!(mode, MODE_DIGITAL | MODE_ANALOG | MODE_ANALOG_PRESSURE)
}

/// Returns true if the mode reports stick values.
#[must_use]
pub fn is_analog_mode(mode: u8) -> bool {
    matches!(mode, MODE_ANALOG | MODE_ANALOG_PRESSURE)
}

/// Decodes a poll response.
///
/// Digital-mode responses carry buttons only; the sticks are reported as
/// centered.
///
/// # Errors
///
/// Returns error if:
/// - The response is shorter than the button bytes
/// - The mode byte is not a known poll mode
/// - The acknowledge byte is missing
/// - An analog response is too short to hold the sticks
pub fn decode_poll(response: &[u8]) -> Result<PollFrame> {
    if response.len() < 5 {
        return Err(RoverBridgeError::Controller(format!(
            "Poll response too short: {} bytes",
            response.len()
        )));
    }

    let mode = response[1];
    if !is_known_mode(mode) {
        return Err(RoverBridgeError::Controller(format!(
            "Unexpected controller mode: 0x{:02X}",
            mode
        )));
    }

    if response[2] != PS2_ACK {
        return Err(RoverBridgeError::Controller(format!(
            "Missing acknowledge byte: 0x{:02X}",
            response[2]
        )));
    }

    let raw = u16::from_le_bytes([response[3], response[4]]);
    let buttons = ButtonSet::from_bits(!raw);

    if !is_analog_mode(mode) {
        return Ok(PollFrame {
            mode,
            buttons,
            ..PollFrame::default()
        });
    }

    if response.len() < POLL_FRAME_LEN {
        return Err(RoverBridgeError::Controller(format!(
            "Analog response too short: {} bytes",
            response.len()
        )));
    }

    Ok(PollFrame {
        mode,
        buttons,
        right_stick_x: response[5],
        right_stick_y: response[6],
        left_stick_x: response[7],
        left_stick_y: response[8],
    })
}

/// Maps a model byte to a [`DeviceType`].
#[must_use]
pub fn device_type_from_model(model: u8) -> DeviceType {
    match model {
        MODEL_WIRELESS_DUALSHOCK => DeviceType::Wireless,
        MODEL_DUALSHOCK => DeviceType::Wired,
        MODEL_GUITAR => DeviceType::GuitarController,
        _ => DeviceType::Unknown,
    }
}
