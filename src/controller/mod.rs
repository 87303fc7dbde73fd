//! # Controller Module
//!
//! Gamepad input handling.
//!
//! This module handles:
//! - The gamepad transport boundary (handshake, raw button/axis state)
//! - PS2 controllers on bit-banged GPIO and kernel evdev gamepads
//! - Validating the handshake and producing per-poll snapshots

pub mod evdev_pad;
pub mod link;
pub mod ps2;
pub mod transport;
pub mod types;
