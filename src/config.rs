//! # Configuration Module
//!
//! Compiled-in platform constants with an optional TOML overlay.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) yields [`Config::default`]. A file only needs to name what differs:
//!
//! ```toml
//! [gamepad]
//! backend = "evdev"
//! pressure_mode = false
//!
//! [arm.gripper]
//! min_angle = 20
//! max_angle = 160
//! ```
//!
//! The configuration is read once at start-up; nothing is reloaded while the
//! control loop runs.

use serde::de::Error;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::controller::transport::{ControllerPins, TransportConfig};
use crate::controller::types::ButtonId;
use crate::error::{Result, RoverBridgeError};

/// Highest usable BCM GPIO number on the 40-pin header.
pub const MAX_BCM_PIN: u8 = 27;

/// Largest travel of a hobby servo in degrees.
pub const MAX_SERVO_ANGLE: u8 = 180;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub gamepad: GamepadConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub arm: ArmConfig,
    #[serde(default)]
    pub actuators: ActuatorConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which transport reads the gamepad.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GamepadBackend {
    /// PS2 receiver wired to GPIO
    #[default]
    Ps2,
    /// Gamepad exposed by the kernel input subsystem
    Evdev,
}

/// Gamepad configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GamepadConfig {
    #[serde(default)]
    pub backend: GamepadBackend,

    /// evdev node; empty means scan `/dev/input`
    #[serde(default)]
    pub device_path: String,

    /// evdev only; fraction of each stick half-range that reads as centered
    #[serde(default = "default_stick_deadzone")]
    pub stick_deadzone: f32,

    #[serde(default = "default_pressure_mode")]
    pub pressure_mode: bool,

    #[serde(default = "default_rumble")]
    pub rumble: bool,

    #[serde(default = "default_gamepad_pins")]
    pub pins: ControllerPins,
}

/// Drive configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DriveConfig {
    /// Duty at full stick deflection
    #[serde(default = "default_max_duty")]
    pub max_duty: u8,

    /// Duty of both wheels when spinning in place
    #[serde(default = "default_spin_duty")]
    pub spin_duty: u8,

    #[serde(default = "default_pwm_frequency_hz")]
    pub pwm_frequency_hz: f64,
}

/// Travel limits and start position of one joint, in degrees
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct JointConfig {
    #[serde(default = "default_min_angle")]
    pub min_angle: u8,

    #[serde(default = "default_max_angle")]
    pub max_angle: u8,

    #[serde(default = "default_initial_angle")]
    pub initial_angle: u8,
}

/// Buttons that step a joint up and down. `increase` wins when both are held.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ButtonPairConfig {
    pub increase: ButtonId,
    pub decrease: ButtonId,
}

/// Arm configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ArmConfig {
    /// Lower bound of the right stick X band that leaves rotation idle (inclusive)
    #[serde(default = "default_rotation_deadzone_low")]
    pub rotation_deadzone_low: u8,

    /// Upper bound of the idle band (inclusive)
    #[serde(default = "default_rotation_deadzone_high")]
    pub rotation_deadzone_high: u8,

    /// Rotation step at full stick deflection, degrees per poll
    #[serde(default = "default_max_rotation_step")]
    pub max_rotation_step: u8,

    #[serde(default = "default_lift_step")]
    pub lift_step: u8,

    #[serde(default = "default_gripper_step")]
    pub gripper_step: u8,

    #[serde(default = "default_lift_buttons")]
    pub lift_buttons: ButtonPairConfig,

    #[serde(default = "default_gripper_buttons")]
    pub gripper_buttons: ButtonPairConfig,

    #[serde(default = "default_joint")]
    pub rotation: JointConfig,

    #[serde(default = "default_joint")]
    pub vertical_lift: JointConfig,

    #[serde(default = "default_joint")]
    pub gripper: JointConfig,
}

/// H-bridge lines of one wheel motor
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct MotorPins {
    pub pwm: u8,
    pub in1: u8,
    pub in2: u8,
}

/// Actuator wiring
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ActuatorConfig {
    #[serde(default = "default_left_motor")]
    pub left_motor: MotorPins,

    #[serde(default = "default_right_motor")]
    pub right_motor: MotorPins,

    #[serde(default = "default_rotation_servo")]
    pub rotation_servo: u8,

    /// One or two servos, all driven to the same angle
    #[serde(default = "default_lift_servos")]
    pub lift_servos: Vec<u8>,

    #[serde(default = "default_gripper_servo")]
    pub gripper_servo: u8,

    #[serde(default = "default_servo_min_pulse_us")]
    pub servo_min_pulse_us: u64,

    #[serde(default = "default_servo_max_pulse_us")]
    pub servo_max_pulse_us: u64,
}

/// Control loop configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ControlConfig {
    #[serde(default = "default_poll_period_ms")]
    pub poll_period_ms: u64,

    /// Cycles between status log lines
    #[serde(default = "default_status_log_interval")]
    pub status_log_interval: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Daily-rolling log files are written here when set
    #[serde(default)]
    pub directory: Option<String>,
}

// Default value functions
fn default_stick_deadzone() -> f32 { 0.05 }
fn default_pressure_mode() -> bool { true }
fn default_rumble() -> bool { true }
fn default_gamepad_pins() -> ControllerPins {
    ControllerPins { clock: 11, command: 10, select: 8, data: 9 }
}

fn default_max_duty() -> u8 { 255 }
fn default_spin_duty() -> u8 { 255 }
fn default_pwm_frequency_hz() -> f64 { 1000.0 }

fn default_min_angle() -> u8 { 0 }
fn default_max_angle() -> u8 { MAX_SERVO_ANGLE }
fn default_initial_angle() -> u8 { 90 }
fn default_joint() -> JointConfig {
    JointConfig {
        min_angle: default_min_angle(),
        max_angle: default_max_angle(),
        initial_angle: default_initial_angle(),
    }
}

fn default_rotation_deadzone_low() -> u8 { 124 }
fn default_rotation_deadzone_high() -> u8 { 132 }
fn default_max_rotation_step() -> u8 { 5 }
fn default_lift_step() -> u8 { 3 }
fn default_gripper_step() -> u8 { 2 }
fn default_lift_buttons() -> ButtonPairConfig {
    ButtonPairConfig { increase: ButtonId::Triangle, decrease: ButtonId::Cross }
}
fn default_gripper_buttons() -> ButtonPairConfig {
    ButtonPairConfig { increase: ButtonId::Circle, decrease: ButtonId::Square }
}

fn default_left_motor() -> MotorPins { MotorPins { pwm: 12, in1: 5, in2: 6 } }
fn default_right_motor() -> MotorPins { MotorPins { pwm: 13, in1: 20, in2: 21 } }
fn default_rotation_servo() -> u8 { 17 }
fn default_lift_servos() -> Vec<u8> { vec![22, 23] }
fn default_gripper_servo() -> u8 { 27 }
fn default_servo_min_pulse_us() -> u64 { 544 }
fn default_servo_max_pulse_us() -> u64 { 2400 }

fn default_poll_period_ms() -> u64 { 50 }
fn default_status_log_interval() -> u64 { 200 }

fn default_log_level() -> String { "info".to_string() }

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            backend: GamepadBackend::default(),
            device_path: String::new(),
            stick_deadzone: default_stick_deadzone(),
            pressure_mode: default_pressure_mode(),
            rumble: default_rumble(),
            pins: default_gamepad_pins(),
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            max_duty: default_max_duty(),
            spin_duty: default_spin_duty(),
            pwm_frequency_hz: default_pwm_frequency_hz(),
        }
    }
}

impl Default for JointConfig {
    fn default() -> Self {
        default_joint()
    }
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            rotation_deadzone_low: default_rotation_deadzone_low(),
            rotation_deadzone_high: default_rotation_deadzone_high(),
            max_rotation_step: default_max_rotation_step(),
            lift_step: default_lift_step(),
            gripper_step: default_gripper_step(),
            lift_buttons: default_lift_buttons(),
            gripper_buttons: default_gripper_buttons(),
            rotation: default_joint(),
            vertical_lift: default_joint(),
            gripper: default_joint(),
        }
    }
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            left_motor: default_left_motor(),
            right_motor: default_right_motor(),
            rotation_servo: default_rotation_servo(),
            lift_servos: default_lift_servos(),
            gripper_servo: default_gripper_servo(),
            servo_min_pulse_us: default_servo_min_pulse_us(),
            servo_max_pulse_us: default_servo_max_pulse_us(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            poll_period_ms: default_poll_period_ms(),
            status_log_interval: default_status_log_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

impl GamepadConfig {
    /// Handshake parameters for the transport.
    #[must_use]
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            pins: self.pins,
            pressure_mode: self.pressure_mode,
            rumble: self.rumble,
        }
    }

    /// Configured evdev node, `None` to scan.
    #[must_use]
    pub fn device_path(&self) -> Option<String> {
        if self.device_path.is_empty() {
            None
        } else {
            Some(self.device_path.clone())
        }
    }
}

impl ControlConfig {
    #[must_use]
    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }
}

fn invalid(message: impl std::fmt::Display) -> RoverBridgeError {
    RoverBridgeError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Fields the file does not name keep their compiled-in defaults.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rover_bridge::config::Config;
    ///
    /// let config = Config::load("config/rover.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        self.validate_pins()?;

        // Control loop timing
        if self.control.poll_period_ms == 0 || self.control.poll_period_ms > 1000 {
            return Err(invalid("poll_period_ms must be between 1 and 1000"));
        }

        if self.control.status_log_interval == 0 {
            return Err(invalid("status_log_interval must be greater than 0"));
        }

        // Drive
        if self.drive.max_duty == 0 {
            return Err(invalid("max_duty must be greater than 0"));
        }

        if self.drive.spin_duty == 0 {
            return Err(invalid("spin_duty must be greater than 0"));
        }

        if self.drive.pwm_frequency_hz.is_nan() || self.drive.pwm_frequency_hz <= 0.0 {
            return Err(invalid("pwm_frequency_hz must be greater than 0"));
        }

        // Arm
        if self.arm.rotation_deadzone_low > self.arm.rotation_deadzone_high {
            return Err(invalid(
                "rotation_deadzone_low must not exceed rotation_deadzone_high",
            ));
        }

        for (name, step) in [
            ("max_rotation_step", self.arm.max_rotation_step),
            ("lift_step", self.arm.lift_step),
            ("gripper_step", self.arm.gripper_step),
        ] {
            if step == 0 || step > 30 {
                return Err(invalid(format!("{} must be between 1 and 30", name)));
            }
        }

        for (name, joint) in [
            ("rotation", &self.arm.rotation),
            ("vertical_lift", &self.arm.vertical_lift),
            ("gripper", &self.arm.gripper),
        ] {
            if joint.min_angle >= joint.max_angle {
                return Err(invalid(format!(
                    "{} min_angle must be less than max_angle",
                    name
                )));
            }
            if joint.max_angle > MAX_SERVO_ANGLE {
                return Err(invalid(format!(
                    "{} max_angle must be at most {}",
                    name, MAX_SERVO_ANGLE
                )));
            }
            if joint.initial_angle < joint.min_angle || joint.initial_angle > joint.max_angle {
                return Err(invalid(format!(
                    "{} initial_angle must be within min_angle..=max_angle",
                    name
                )));
            }
        }

        // Actuators
        if self.actuators.lift_servos.is_empty() || self.actuators.lift_servos.len() > 2 {
            return Err(invalid("lift_servos must list one or two pins"));
        }

        if self.actuators.servo_min_pulse_us >= self.actuators.servo_max_pulse_us {
            return Err(invalid(
                "servo_min_pulse_us must be less than servo_max_pulse_us",
            ));
        }

        // Gamepad
        if self.gamepad.backend == GamepadBackend::Evdev && self.gamepad.pressure_mode {
            return Err(invalid("pressure_mode is not available with the evdev backend"));
        }

        if !(0.0..=0.25).contains(&self.gamepad.stick_deadzone) {
            return Err(invalid("stick_deadzone must be between 0.0 and 0.25"));
        }

        // Logging
        if self.logging.level.trim().is_empty() {
            return Err(invalid("logging level cannot be empty"));
        }

        Ok(())
    }

    /// Every GPIO line the configuration claims, tagged for error messages.
    fn claimed_pins(&self) -> Vec<(&'static str, u8)> {
        let mut pins = Vec::new();

        if self.gamepad.backend == GamepadBackend::Ps2 {
            let gamepad = &self.gamepad.pins;
            pins.extend([
                ("gamepad clock", gamepad.clock),
                ("gamepad command", gamepad.command),
                ("gamepad select", gamepad.select),
                ("gamepad data", gamepad.data),
            ]);
        }

        for (name, motor) in [
            ("left motor", &self.actuators.left_motor),
            ("right motor", &self.actuators.right_motor),
        ] {
            pins.extend([(name, motor.pwm), (name, motor.in1), (name, motor.in2)]);
        }

        pins.push(("rotation servo", self.actuators.rotation_servo));
        pins.extend(self.actuators.lift_servos.iter().map(|pin| ("lift servo", *pin)));
        pins.push(("gripper servo", self.actuators.gripper_servo));

        pins
    }

    fn validate_pins(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (name, pin) in self.claimed_pins() {
            if pin > MAX_BCM_PIN {
                return Err(invalid(format!(
                    "{} pin {} is out of range (must be 0-{})",
                    name, pin, MAX_BCM_PIN
                )));
            }
            if !seen.insert(pin) {
                return Err(invalid(format!("{} pin {} is assigned twice", name, pin)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn assert_invalid(config: &Config, needle: &str) {
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains(needle), "error '{}' should mention '{}'", err, needle);
    }

    // ==================== Defaults ====================

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert_eq!(config.gamepad.backend, GamepadBackend::Ps2);
        assert!(config.gamepad.pressure_mode);
        assert!(config.gamepad.rumble);
        assert_eq!(config.gamepad.stick_deadzone, 0.05);
        assert_eq!(config.drive.max_duty, 255);
        assert_eq!(config.drive.spin_duty, 255);
        assert_eq!(config.arm.rotation_deadzone_low, 124);
        assert_eq!(config.arm.rotation_deadzone_high, 132);
        assert_eq!(config.arm.max_rotation_step, 5);
        assert_eq!(config.arm.lift_step, 3);
        assert_eq!(config.arm.gripper_step, 2);
        assert_eq!(config.arm.lift_buttons.increase, ButtonId::Triangle);
        assert_eq!(config.arm.gripper_buttons.decrease, ButtonId::Square);
        assert_eq!(config.arm.gripper.initial_angle, 90);
        assert_eq!(config.actuators.lift_servos.len(), 2);
        assert_eq!(config.control.poll_period(), Duration::from_millis(50));
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn test_transport_config_from_gamepad() {
        let gamepad = GamepadConfig::default();
        let transport = gamepad.transport_config();
        assert_eq!(transport.pins, gamepad.pins);
        assert!(transport.pressure_mode);
        assert!(transport.rumble);
    }

    #[test]
    fn test_device_path_empty_means_scan() {
        let mut gamepad = GamepadConfig::default();
        assert_eq!(gamepad.device_path(), None);
        gamepad.device_path = "/dev/input/event3".to_string();
        assert_eq!(gamepad.device_path().as_deref(), Some("/dev/input/event3"));
    }

    // ==================== Loading ====================

    #[test]
    fn test_load_empty_file_gives_defaults() {
        let file = write_config("");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_overlays_named_fields_only() {
        let file = write_config(
            r#"
            [gamepad]
            backend = "evdev"
            pressure_mode = false
            stick_deadzone = 0.1

            [arm]
            lift_step = 6

            [arm.gripper]
            min_angle = 20
            max_angle = 160

            [arm.lift_buttons]
            increase = "r1"
            decrease = "r2"

            [control]
            poll_period_ms = 20
            "#,
        );

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.gamepad.backend, GamepadBackend::Evdev);
        assert!(!config.gamepad.pressure_mode);
        assert!(config.gamepad.rumble);
        assert_eq!(config.gamepad.stick_deadzone, 0.1);
        assert_eq!(config.arm.lift_step, 6);
        assert_eq!(config.arm.gripper_step, 2);
        assert_eq!(config.arm.gripper.min_angle, 20);
        assert_eq!(config.arm.gripper.max_angle, 160);
        assert_eq!(config.arm.gripper.initial_angle, 90);
        assert_eq!(config.arm.lift_buttons.increase, ButtonId::R1);
        assert_eq!(config.arm.lift_buttons.decrease, ButtonId::R2);
        assert_eq!(config.control.poll_period_ms, 20);
        assert_eq!(config.drive, DriveConfig::default());
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/rover.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/rover.toml");
        assert!(matches!(result, Err(RoverBridgeError::Io(_))));
    }

    #[test]
    fn test_load_malformed_toml() {
        let file = write_config("[control\npoll_period_ms = ");
        assert!(matches!(Config::load(file.path()), Err(RoverBridgeError::Config(_))));
    }

    #[test]
    fn test_load_unknown_backend() {
        let file = write_config("[gamepad]\nbackend = \"usb\"\n");
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_runs_validation() {
        let file = write_config("[control]\npoll_period_ms = 0\n");
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("poll_period_ms"));
    }

    // ==================== Validation ====================

    #[test]
    fn test_validate_poll_period() {
        let mut config = Config::default();
        config.control.poll_period_ms = 1001;
        assert_invalid(&config, "poll_period_ms");
        config.control.poll_period_ms = 1000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_status_log_interval() {
        let mut config = Config::default();
        config.control.status_log_interval = 0;
        assert_invalid(&config, "status_log_interval");
    }

    #[test]
    fn test_validate_duty() {
        let mut config = Config::default();
        config.drive.max_duty = 0;
        assert_invalid(&config, "max_duty");

        let mut config = Config::default();
        config.drive.spin_duty = 0;
        assert_invalid(&config, "spin_duty");
    }

    #[test]
    fn test_validate_pwm_frequency() {
        let mut config = Config::default();
        config.drive.pwm_frequency_hz = 0.0;
        assert_invalid(&config, "pwm_frequency_hz");
        config.drive.pwm_frequency_hz = f64::NAN;
        assert_invalid(&config, "pwm_frequency_hz");
    }

    #[test]
    fn test_validate_deadzone_order() {
        let mut config = Config::default();
        config.arm.rotation_deadzone_low = 140;
        assert_invalid(&config, "rotation_deadzone_low");

        config.arm.rotation_deadzone_low = 132;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_step_sizes() {
        let mut config = Config::default();
        config.arm.lift_step = 0;
        assert_invalid(&config, "lift_step");

        let mut config = Config::default();
        config.arm.max_rotation_step = 31;
        assert_invalid(&config, "max_rotation_step");

        let mut config = Config::default();
        config.arm.gripper_step = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_joint_limits() {
        let mut config = Config::default();
        config.arm.rotation.min_angle = 180;
        assert_invalid(&config, "rotation min_angle");

        let mut config = Config::default();
        config.arm.vertical_lift.max_angle = 200;
        assert_invalid(&config, "vertical_lift max_angle");

        let mut config = Config::default();
        config.arm.gripper.min_angle = 100;
        assert_invalid(&config, "gripper initial_angle");
    }

    #[test]
    fn test_validate_lift_servo_count() {
        let mut config = Config::default();
        config.actuators.lift_servos = vec![];
        assert_invalid(&config, "lift_servos");

        config.actuators.lift_servos = vec![22, 23, 24];
        assert_invalid(&config, "lift_servos");

        config.actuators.lift_servos = vec![22];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_servo_pulse_range() {
        let mut config = Config::default();
        config.actuators.servo_min_pulse_us = 2400;
        assert_invalid(&config, "servo_min_pulse_us");
    }

    #[test]
    fn test_validate_pin_range() {
        let mut config = Config::default();
        config.actuators.gripper_servo = 28;
        assert_invalid(&config, "gripper servo pin 28 is out of range");
    }

    #[test]
    fn test_validate_duplicate_pins() {
        let mut config = Config::default();
        config.actuators.rotation_servo = config.actuators.left_motor.in1;
        assert_invalid(&config, "assigned twice");
    }

    #[test]
    fn test_gamepad_pins_ignored_for_evdev() {
        let mut config = Config::default();
        config.gamepad.backend = GamepadBackend::Evdev;
        config.gamepad.pressure_mode = false;
        config.gamepad.pins.clock = config.actuators.gripper_servo;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_evdev_pressure_mode() {
        let mut config = Config::default();
        config.gamepad.backend = GamepadBackend::Evdev;
        assert_invalid(&config, "pressure_mode");
    }

    #[test]
    fn test_validate_stick_deadzone() {
        let mut config = Config::default();
        config.gamepad.stick_deadzone = 0.0;
        assert!(config.validate().is_ok());
        config.gamepad.stick_deadzone = 0.25;
        assert!(config.validate().is_ok());

        config.gamepad.stick_deadzone = -0.1;
        assert_invalid(&config, "stick_deadzone");
        config.gamepad.stick_deadzone = 0.5;
        assert_invalid(&config, "stick_deadzone");
        config.gamepad.stick_deadzone = f32::NAN;
        assert_invalid(&config, "stick_deadzone");
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config::default();
        config.logging.level = "  ".to_string();
        assert_invalid(&config, "logging level");
    }
}
