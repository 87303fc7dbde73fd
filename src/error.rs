//! # Error Types
//!
//! Custom error types for Rover Bridge using `thiserror`.

use thiserror::Error;

use crate::controller::types::{DeviceType, ErrorCode};

/// Main error type for Rover Bridge
#[derive(Debug, Error)]
pub enum RoverBridgeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// GPIO access errors
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    /// Gamepad device errors
    #[error("Controller error: {0}")]
    Controller(String),

    /// No gamepad device found
    #[error("No gamepad found")]
    ControllerNotFound,

    /// Logging could not be set up
    #[error("Logging error: {0}")]
    Logging(String),

    /// Controller link could not reach the ready state
    #[error("Controller link failed: {0}")]
    Link(#[from] LinkError),
}

/// Terminal failures of the controller handshake.
///
/// Either one ends the session: it is reported once and nothing retries.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The transport reported a handshake error code.
    #[error("handshake failed with {0}")]
    Handshake(ErrorCode),

    /// The handshake succeeded but the wrong controller variant answered.
    #[error("expected a wireless controller, found {0}")]
    DeviceTypeMismatch(DeviceType),
}

/// Result type alias for Rover Bridge
pub type Result<T> = std::result::Result<T, RoverBridgeError>;
