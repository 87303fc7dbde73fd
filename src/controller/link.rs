//! # Controller Link
//!
//! Owns the handshake state machine against a [`GamepadTransport`] and turns
//! raw transport state into [`ControllerSnapshot`]s.
//!
//! ## State Machine
//!
//! ```text
//! Unconfigured --connect--> Configuring --+--> Ready
//!                                         +--> Failed
//! ```
//!
//! `Ready` requires both an error-free handshake and a wireless controller.
//! `Failed` is terminal: nothing retries, only another explicit
//! [`ControllerLink::connect`] leaves it.
//!
//! ## Usage
//!
//! ```no_run
//! use rover_bridge::controller::link::{ControllerLink, ControllerLinkState};
//! use rover_bridge::controller::ps2::Ps2Gamepad;
//! use rover_bridge::controller::transport::{ControllerPins, TransportConfig};
//!
//! let mut link = ControllerLink::new(Ps2Gamepad::gpio());
//! let config = TransportConfig {
//!     pins: ControllerPins { clock: 11, command: 10, select: 8, data: 9 },
//!     pressure_mode: true,
//!     rumble: true,
//! };
//!
//! if link.connect(&config) == ControllerLinkState::Ready {
//!     let snapshot = link.poll();
//!     println!("left stick: {} {}", snapshot.left_stick_x, snapshot.left_stick_y);
//! }
//! ```

use tracing::{debug, error, info};

use super::transport::{GamepadTransport, TransportConfig};
use super::types::{AxisId, ButtonId, ButtonSet, ControllerSnapshot, DeviceType, ErrorCode};
use crate::error::LinkError;

/// Handshake state of a [`ControllerLink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerLinkState {
    Unconfigured,
    Configuring,
    Ready,
    Failed,
}

/// Validated connection to a gamepad transport.
#[derive(Debug)]
pub struct ControllerLink<T> {
    transport: T,
    state: ControllerLinkState,
    failure: Option<LinkError>,
}

impl<T: GamepadTransport> ControllerLink<T> {
    /// Wraps a transport; no handshake is attempted yet.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ControllerLinkState::Unconfigured,
            failure: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> ControllerLinkState {
        self.state
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == ControllerLinkState::Ready
    }

    /// Why the last handshake failed, if it did.
    #[must_use]
    pub fn failure(&self) -> Option<LinkError> {
        self.failure
    }

    /// Runs the transport handshake and validates the controller variant.
    ///
    /// The device type is only queried once the handshake itself reported
    /// success. On failure a single diagnostic is logged.
    pub fn connect(&mut self, config: &TransportConfig) -> ControllerLinkState {
        self.state = ControllerLinkState::Configuring;
        self.failure = None;
        debug!(
            "Configuring controller (clock={}, command={}, select={}, data={}, pressure={}, rumble={})",
            config.pins.clock,
            config.pins.command,
            config.pins.select,
            config.pins.data,
            config.pressure_mode,
            config.rumble
        );

        let result = match self.transport.configure(config) {
            ErrorCode::Success => match self.transport.device_type() {
                DeviceType::Wireless => Ok(()),
                other => Err(LinkError::DeviceTypeMismatch(other)),
            },
            code => Err(LinkError::Handshake(code)),
        };

        match result {
            Ok(()) => {
                info!("Controller configured: wireless controller ready");
                self.state = ControllerLinkState::Ready;
            }
            Err(err) => {
                error!("Failed to configure controller: {}. Controller link stopped", err);
                self.failure = Some(err);
                self.state = ControllerLinkState::Failed;
            }
        }

        self.state
    }

    /// Reads the transport and packages one snapshot.
    ///
    /// Only meaningful while `Ready`; in any other state the transport is not
    /// touched and a neutral snapshot is returned.
    pub fn poll(&mut self) -> ControllerSnapshot {
        if self.state != ControllerLinkState::Ready {
            debug!("Poll in {:?} state, returning neutral snapshot", self.state);
            return ControllerSnapshot::neutral();
        }

        self.transport.refresh();

        let buttons: ButtonSet = ButtonId::ALL
            .into_iter()
            .filter(|b| self.transport.is_held(*b))
            .collect();

        ControllerSnapshot {
            left_stick_x: self.transport.axis_value(AxisId::LeftStickX),
            left_stick_y: self.transport.axis_value(AxisId::LeftStickY),
            right_stick_x: self.transport.axis_value(AxisId::RightStickX),
            right_stick_y: self.transport.axis_value(AxisId::RightStickY),
            buttons,
            buttons_changed: self.transport.held_set_changed(),
        }
    }
}
