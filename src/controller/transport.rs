//! Gamepad transport boundary.
//!
//! A transport performs the low-level handshake and exposes raw button and
//! axis state. [`ControllerLink`](super::link::ControllerLink) is the only
//! caller; it validates the handshake and packages the raw state into
//! snapshots.

use serde::Deserialize;

use super::types::{AxisId, ButtonId, DeviceType, ErrorCode};

/// GPIO lines of the controller port (BCM numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ControllerPins {
    pub clock: u8,
    pub command: u8,
    /// Attention line, held low for the duration of a frame.
    pub select: u8,
    pub data: u8,
}

/// Handshake parameters passed to [`GamepadTransport::configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    pub pins: ControllerPins,
    /// Ask the controller to report pressure-sensitive buttons.
    pub pressure_mode: bool,
    /// Ask the controller to accept rumble motor commands.
    pub rumble: bool,
}

/// Low-level gamepad access.
#[cfg_attr(test, mockall::automock)]
pub trait GamepadTransport {
    /// Runs the handshake.
    fn configure(&mut self, config: &TransportConfig) -> ErrorCode;

    /// Controller variant learned during the last handshake.
    fn device_type(&self) -> DeviceType;

    /// Reads fresh state from the device.
    fn refresh(&mut self);

    /// Last sample of an axis (0-255).
    fn axis_value(&self, axis: AxisId) -> u8;

    fn is_held(&self, button: ButtonId) -> bool;

    /// Whether the held set changed with the last refresh.
    fn held_set_changed(&self) -> bool;
}
