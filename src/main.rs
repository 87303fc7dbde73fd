//! # Rover Bridge
//!
//! Drive a gripper-arm rover from a gamepad on a Raspberry Pi.
//!
//! The left stick steers the differential drive, the right stick turns the
//! arm, triangle/cross raise and lower it and circle/square open and close
//! the gripper.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use rover_bridge::actuator::gpio::GpioActuators;
use rover_bridge::config::{Config, GamepadBackend};
use rover_bridge::control::control_loop::ControlLoop;
use rover_bridge::controller::evdev_pad::EvdevGamepad;
use rover_bridge::controller::ps2::Ps2Gamepad;
use rover_bridge::logging;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "rover-bridge", version, about)]
struct Args {
    /// TOML file overriding the built-in configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Built-in configuration, overlaid by `path` when given.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => {
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Main entry point for Rover Bridge
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration and set up logging
///    - Claim the actuator GPIO lines
///
/// 2. **Handshake**
///    - Configure the gamepad and require a wireless controller
///    - On failure, log one diagnostic and exit without moving anything
///
/// 3. **Main Loop**
///    - Park the actuators, then poll, map and actuate every poll period
///    - Runs until power-off
///
/// # Errors
///
/// Returns error if:
/// - The configuration file cannot be loaded or is invalid
/// - GPIO lines cannot be claimed
/// - The controller handshake fails
///
/// # Examples
///
/// ```bash
/// rover-bridge --config /etc/rover-bridge.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO rover_bridge: Rover Bridge v0.1.0 starting...
/// INFO rover_bridge::controller::link: Controller configured: wireless controller ready
/// INFO rover_bridge::control::control_loop: Actuators parked (rotation=90, lift=90, gripper=90)
/// INFO rover_bridge::control::control_loop: Control loop running every 50ms
/// ```
fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let _log_guard = logging::init(&config.logging)?;

    info!("Rover Bridge v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Gamepad backend: {:?}", config.gamepad.backend);

    let actuators = GpioActuators::open(&config.actuators, config.drive.pwm_frequency_hz)
        .context("Failed to claim actuator GPIO lines")?;

    let transport_config = config.gamepad.transport_config();
    let result = match config.gamepad.backend {
        GamepadBackend::Ps2 => {
            ControlLoop::new(Ps2Gamepad::gpio(), actuators, &config).run(&transport_config)
        }
        GamepadBackend::Evdev => {
            let gamepad =
                EvdevGamepad::new(config.gamepad.device_path(), config.gamepad.stick_deadzone);
            ControlLoop::new(gamepad, actuators, &config).run(&transport_config)
        }
    };

    match result {
        Ok(never) => match never {},
        Err(err) => {
            error!("Rover stays inert: {}", err);
            Err(err).context("Controller link failed")
        }
    }
}
