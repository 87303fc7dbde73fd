//! # Gamepad Types
//!
//! Axis and button identifiers, handshake result codes, and the per-poll
//! [`ControllerSnapshot`] handed to the mappers.
//!
//! ## Stick Ranges
//!
//! | Axis | Range | Center |
//! |------|-------|--------|
//! | Stick X | 0-255 | 128 |
//! | Stick Y | 0-255 | 127 |
//!
//! Y grows downwards: 0 is the stick pushed fully up.

use serde::Deserialize;
use std::fmt;

/// Neutral value of a stick X axis.
pub const STICK_X_CENTER: u8 = 128;

/// Neutral value of a stick Y axis.
pub const STICK_Y_CENTER: u8 = 127;

/// Largest raw axis sample.
pub const AXIS_MAX: u8 = 255;

/// Analog axes read from the gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisId {
    /// Left stick X axis. 0 = full left, 255 = full right.
    LeftStickX,
    /// Left stick Y axis. 0 = full up, 255 = full down.
    LeftStickY,
    /// Right stick X axis. 0 = full left, 255 = full right.
    RightStickX,
    /// Right stick Y axis. 0 = full up, 255 = full down.
    RightStickY,
}

impl AxisId {
    /// All axes, in snapshot order.
    pub const ALL: [AxisId; 4] = [
        AxisId::LeftStickX,
        AxisId::LeftStickY,
        AxisId::RightStickX,
        AxisId::RightStickY,
    ];

    /// Neutral sample for this axis.
    #[must_use]
    pub fn center(self) -> u8 {
        match self {
            AxisId::LeftStickX | AxisId::RightStickX => STICK_X_CENTER,
            AxisId::LeftStickY | AxisId::RightStickY => STICK_Y_CENTER,
        }
    }
}

/// Digital buttons.
///
/// The discriminant is the bit position in the PS2 button word
/// (byte 3 in the low half, byte 4 in the high half).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ButtonId {
    Select = 0,
    L3 = 1,
    R3 = 2,
    Start = 3,
    DpadUp = 4,
    DpadRight = 5,
    DpadDown = 6,
    DpadLeft = 7,
    L2 = 8,
    R2 = 9,
    L1 = 10,
    R1 = 11,
    Triangle = 12,
    Circle = 13,
    Cross = 14,
    Square = 15,
}

impl ButtonId {
    /// All buttons in bit order.
    pub const ALL: [ButtonId; 16] = [
        ButtonId::Select,
        ButtonId::L3,
        ButtonId::R3,
        ButtonId::Start,
        ButtonId::DpadUp,
        ButtonId::DpadRight,
        ButtonId::DpadDown,
        ButtonId::DpadLeft,
        ButtonId::L2,
        ButtonId::R2,
        ButtonId::L1,
        ButtonId::R1,
        ButtonId::Triangle,
        ButtonId::Circle,
        ButtonId::Cross,
        ButtonId::Square,
    ];

    /// Bit mask of this button in a [`ButtonSet`].
    #[inline]
    #[must_use]
    pub fn mask(self) -> u16 {
        1 << (self as u8)
    }
}

/// Set of buttons held during one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ButtonSet(u16);

impl ButtonSet {
    /// Empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds a set from a raw bit word (bit N = [`ButtonId`] with discriminant N).
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw bit word.
    #[must_use]
    pub const fn bits(&self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn contains(&self, button: ButtonId) -> bool {
        self.0 & button.mask() != 0
    }

    pub fn insert(&mut self, button: ButtonId) {
        self.0 |= button.mask();
    }

    pub fn remove(&mut self, button: ButtonId) {
        self.0 &= !button.mask();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates over held buttons in bit order.
    pub fn iter(&self) -> impl Iterator<Item = ButtonId> + '_ {
        ButtonId::ALL.into_iter().filter(|b| self.contains(*b))
    }
}

impl FromIterator<ButtonId> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = ButtonId>>(iter: I) -> Self {
        let mut set = ButtonSet::empty();
        for button in iter {
            set.insert(button);
        }
        set
    }
}

/// Result of a transport handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success,
    /// No controller answered, or it answered in an unknown mode.
    WrongControllerMode,
    /// The controller answered but never switched to analog mode.
    ControllerNotAcceptingCommands,
    /// Pressure-sensitive mode was requested and refused.
    PressureModeError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::Success => "success",
            ErrorCode::WrongControllerMode => "wrong controller mode",
            ErrorCode::ControllerNotAcceptingCommands => "controller not accepting commands",
            ErrorCode::PressureModeError => "pressure mode error",
        };
        f.write_str(name)
    }
}

/// Controller variant negotiated during the handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceType {
    #[default]
    Unknown,
    Wired,
    GuitarController,
    Wireless,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceType::Unknown => "unknown",
            DeviceType::Wired => "wired",
            DeviceType::GuitarController => "guitar controller",
            DeviceType::Wireless => "wireless",
        };
        f.write_str(name)
    }
}

/// Validated gamepad state captured by one poll.
///
/// Created fresh every cycle and never mutated; both the drive and the arm
/// command of a cycle are derived from the same snapshot.
///
/// # Examples
///
/// ```
/// use rover_bridge::controller::types::{ControllerSnapshot, ButtonId};
///
/// let snapshot = ControllerSnapshot::neutral();
/// assert_eq!(snapshot.left_stick_x, 128);
/// assert_eq!(snapshot.left_stick_y, 127);
/// assert!(!snapshot.is_held(ButtonId::Cross));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub left_stick_x: u8,
    pub left_stick_y: u8,
    pub right_stick_x: u8,
    pub right_stick_y: u8,
    /// Buttons held at poll time.
    pub buttons: ButtonSet,
    /// Whether the held set differs from the previous poll.
    pub buttons_changed: bool,
}

impl ControllerSnapshot {
    /// Sticks centered, nothing held: the car stops and the arm stays idle.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            left_stick_x: STICK_X_CENTER,
            left_stick_y: STICK_Y_CENTER,
            right_stick_x: STICK_X_CENTER,
            right_stick_y: STICK_Y_CENTER,
            buttons: ButtonSet::empty(),
            buttons_changed: false,
        }
    }

    #[must_use]
    pub fn is_held(&self, button: ButtonId) -> bool {
        self.buttons.contains(button)
    }

    /// Sample of one axis.
    #[must_use]
    pub fn axis(&self, axis: AxisId) -> u8 {
        match axis {
            AxisId::LeftStickX => self.left_stick_x,
            AxisId::LeftStickY => self.left_stick_y,
            AxisId::RightStickX => self.right_stick_x,
            AxisId::RightStickY => self.right_stick_y,
        }
    }
}

impl Default for ControllerSnapshot {
    fn default() -> Self {
        Self::neutral()
    }
}
