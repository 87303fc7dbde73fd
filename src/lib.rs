//! # Rover Bridge Library
//!
//! Drive a differential-drive rover with a gripper arm from a gamepad.
//!
//! This library provides the core functionality for reading a PS2 (or
//! kernel-exposed) gamepad, mapping its sticks and buttons onto wheel and
//! servo commands, and driving those actuators from Raspberry Pi GPIO.

pub mod actuator;
pub mod config;
pub mod control;
pub mod controller;
pub mod error;
pub mod logging;
