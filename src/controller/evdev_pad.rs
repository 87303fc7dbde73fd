//! # evdev Gamepad Transport
//!
//! Reads gamepads the kernel already exposes under `/dev/input/event*`
//! (Bluetooth DualShock/DualSense, USB pads, 2.4 GHz receivers).
//!
//! State is queried synchronously on every refresh instead of draining the
//! event queue, so a poll never blocks.
//!
//! ## Axis Codes
//!
//! | Axis | evdev Code |
//! |------|------------|
//! | Left Stick X | ABS_X |
//! | Left Stick Y | ABS_Y |
//! | Right Stick X | ABS_RX (ABS_Z on older drivers) |
//! | Right Stick Y | ABS_RY (ABS_RZ on older drivers) |
//! | D-Pad | ABS_HAT0X / ABS_HAT0Y or BTN_DPAD_* |
//!
//! ## Button Codes
//!
//! | Button | evdev Code |
//! |--------|------------|
//! | Cross | BTN_SOUTH |
//! | Circle | BTN_EAST |
//! | Square | BTN_WEST |
//! | Triangle | BTN_NORTH |
//! | L1 / R1 | BTN_TL / BTN_TR |
//! | L2 / R2 | BTN_TL2 / BTN_TR2 |
//! | Select / Start | BTN_SELECT / BTN_START |
//! | L3 / R3 | BTN_THUMBL / BTN_THUMBR |

use evdev::{AbsoluteAxisType, BusType, Device, Key};
use std::path::Path;
use tracing::{debug, info, warn};

use super::transport::{GamepadTransport, TransportConfig};
use super::types::{AxisId, ButtonId, ButtonSet, DeviceType, ErrorCode, AXIS_MAX};
use crate::control::interpolate::map_range;
use crate::error::{Result, RoverBridgeError};

/// Hat axis pushed towards negative (left or up).
const HAT_NEGATIVE: i32 = -1;
/// Hat axis pushed towards positive (right or down).
const HAT_POSITIVE: i32 = 1;

/// Gamepad exposed through evdev.
pub struct EvdevGamepad {
    /// Fixed device path; scan `/dev/input` when `None`.
    configured_path: Option<String>,
    device: Option<Device>,
    device_path: Option<String>,
    /// Fraction of each half-range snapped to center
    stick_deadzone: f32,
    right_stick: (AbsoluteAxisType, AbsoluteAxisType),
    axes: [u8; 4],
    buttons: ButtonSet,
    changed: bool,
}

impl std::fmt::Debug for EvdevGamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevGamepad")
            .field("device_path", &self.device_path)
            .field("axes", &self.axes)
            .field("buttons", &self.buttons)
            .finish_non_exhaustive()
    }
}

impl EvdevGamepad {
    /// Creates a transport; the device is opened by `configure`.
    ///
    /// # Arguments
    ///
    /// * `device_path` - `/dev/input/eventX` to use, or `None` to pick the first gamepad
    /// * `stick_deadzone` - Fraction of each stick half-range that reads as centered
    #[must_use]
    pub fn new(device_path: Option<String>, stick_deadzone: f32) -> Self {
        Self {
            configured_path: device_path,
            device: None,
            device_path: None,
            stick_deadzone,
            right_stick: (AbsoluteAxisType::ABS_RX, AbsoluteAxisType::ABS_RY),
            axes: neutral_axes(),
            buttons: ButtonSet::empty(),
            changed: false,
        }
    }

    /// Path of the opened device, once configured.
    #[must_use]
    pub fn device_path(&self) -> Option<&str> {
        self.device_path.as_deref()
    }

    fn open_device(&self) -> Result<(Device, String)> {
        if let Some(path) = &self.configured_path {
            let device = Device::open(path).map_err(|e| {
                RoverBridgeError::Controller(format!("Failed to open {}: {}", path, e))
            })?;
            return Ok((device, path.clone()));
        }

        let input_dir = Path::new("/dev/input");
        if !input_dir.exists() {
            return Err(RoverBridgeError::Controller(
                "/dev/input directory not found".to_string(),
            ));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| {
                RoverBridgeError::Controller(format!("Failed to read /dev/input: {}", e))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                RoverBridgeError::Controller(format!("Failed to read directory entry: {}", e))
            })?;

        // Deterministic pick when several pads are connected
        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();

            match path.file_name() {
                Some(name) if name.to_string_lossy().starts_with("event") => {}
                _ => continue,
            }

            match Device::open(&path) {
                Ok(device) => {
                    let is_gamepad = device
                        .supported_keys()
                        .map_or(false, |keys| keys.contains(Key::BTN_SOUTH));
                    debug!(
                        "Found input device: {} ({:?}, gamepad: {})",
                        path.display(),
                        device.name(),
                        is_gamepad
                    );

                    if is_gamepad {
                        return Ok((device, path.to_string_lossy().to_string()));
                    }
                }
                Err(e) => {
                    // Permission denied or other errors - skip device
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(RoverBridgeError::ControllerNotFound)
    }

    fn axis_code(&self, axis: AxisId) -> AbsoluteAxisType {
        match axis {
            AxisId::LeftStickX => AbsoluteAxisType::ABS_X,
            AxisId::LeftStickY => AbsoluteAxisType::ABS_Y,
            AxisId::RightStickX => self.right_stick.0,
            AxisId::RightStickY => self.right_stick.1,
        }
    }

    fn reset(&mut self) {
        self.changed = !self.buttons.is_empty();
        self.axes = neutral_axes();
        self.buttons = ButtonSet::empty();
    }

    fn read_state(&self) -> Result<([u8; 4], ButtonSet)> {
        let device = self
            .device
            .as_ref()
            .ok_or_else(|| RoverBridgeError::Controller("evdev device not open".to_string()))?;

        let abs = device.get_abs_state()?;
        let keys = device.get_key_state()?;

        let mut axes = neutral_axes();
        for (slot, axis) in axes.iter_mut().zip(AxisId::ALL) {
            let info = abs[self.axis_code(axis).0 as usize];
            let band = dead_band(info.minimum, info.maximum, info.flat, self.stick_deadzone);
            *slot = normalize_axis(info.value, info.minimum, info.maximum, band, axis.center());
        }

        let mut buttons: ButtonSet = ButtonId::ALL
            .into_iter()
            .filter(|b| keys.contains(button_key(*b)))
            .collect();

        let hat_x = abs[AbsoluteAxisType::ABS_HAT0X.0 as usize].value;
        let hat_y = abs[AbsoluteAxisType::ABS_HAT0Y.0 as usize].value;
        for button in hat_buttons(hat_x, hat_y) {
            buttons.insert(button);
        }

        Ok((axes, buttons))
    }
}

impl GamepadTransport for EvdevGamepad {
    fn configure(&mut self, config: &TransportConfig) -> ErrorCode {
        debug!("evdev transport ignores controller pins {:?}", config.pins);
        self.device = None;
        self.device_path = None;
        self.reset();

        let (device, path) = match self.open_device() {
            Ok(found) => found,
            Err(e) => {
                warn!("No evdev gamepad available: {}", e);
                return ErrorCode::WrongControllerMode;
            }
        };

        if config.pressure_mode {
            warn!("{} cannot report button pressures", path);
            return ErrorCode::PressureModeError;
        }
        if config.rumble {
            debug!("Rumble is not driven through evdev");
        }

        self.right_stick = match device.supported_absolute_axes() {
            Some(axes) if axes.contains(AbsoluteAxisType::ABS_RX) => {
                (AbsoluteAxisType::ABS_RX, AbsoluteAxisType::ABS_RY)
            }
            _ => (AbsoluteAxisType::ABS_Z, AbsoluteAxisType::ABS_RZ),
        };

        info!(
            "Using evdev gamepad {} at {}",
            device.name().unwrap_or("(unnamed)"),
            path
        );
        self.device = Some(device);
        self.device_path = Some(path);
        ErrorCode::Success
    }

    fn device_type(&self) -> DeviceType {
        match &self.device {
            Some(device) => classify_device(
                device.input_id().bus_type(),
                device.name().unwrap_or_default(),
            ),
            None => DeviceType::Unknown,
        }
    }

    fn refresh(&mut self) {
        match self.read_state() {
            Ok((axes, buttons)) => {
                self.changed = buttons != self.buttons;
                self.axes = axes;
                self.buttons = buttons;
            }
            Err(e) => {
                warn!("Failed to read gamepad state, releasing all inputs: {}", e);
                self.reset();
            }
        }
    }

    fn axis_value(&self, axis: AxisId) -> u8 {
        self.axes[axis as usize]
    }

    fn is_held(&self, button: ButtonId) -> bool {
        self.buttons.contains(button)
    }

    fn held_set_changed(&self) -> bool {
        self.changed
    }
}

fn neutral_axes() -> [u8; 4] {
    AxisId::ALL.map(AxisId::center)
}

/// Raw distance from the midpoint that still reads as centered.
///
/// The larger of the driver's flat region and `deadzone` times the half-range.
fn dead_band(min: i32, max: i32, flat: i32, deadzone: f32) -> i32 {
    let half_range = (i64::from(max) - i64::from(min) + 1) / 2;
    let configured = (f64::from(deadzone) * half_range as f64) as i32;
    flat.max(configured)
}

/// Rescales a raw sample from `[min, max]` onto 0-255.
///
/// The two halves are scaled separately so the device midpoint lands on
/// `center` exactly. Samples within `dead_band` of the midpoint snap to it.
fn normalize_axis(value: i32, min: i32, max: i32, dead_band: i32, center: u8) -> u8 {
    if max <= min {
        return center;
    }

    let mid = min + (max - min + 1) / 2;
    if (value - mid).abs() <= dead_band {
        return center;
    }

    let center = i32::from(center);
    let scaled = if value < mid {
        map_range(value, min, mid, 0, center)
    } else {
        map_range(value, mid, max, center, i32::from(AXIS_MAX))
    };
    scaled.clamp(0, i32::from(AXIS_MAX)) as u8
}

/// Key code of a button.
fn button_key(button: ButtonId) -> Key {
    match button {
        ButtonId::Cross => Key::BTN_SOUTH,
        ButtonId::Circle => Key::BTN_EAST,
        ButtonId::Square => Key::BTN_WEST,
        ButtonId::Triangle => Key::BTN_NORTH,
        ButtonId::L1 => Key::BTN_TL,
        ButtonId::R1 => Key::BTN_TR,
        ButtonId::L2 => Key::BTN_TL2,
        ButtonId::R2 => Key::BTN_TR2,
        ButtonId::Select => Key::BTN_SELECT,
        ButtonId::Start => Key::BTN_START,
        ButtonId::L3 => Key::BTN_THUMBL,
        ButtonId::R3 => Key::BTN_THUMBR,
        ButtonId::DpadUp => Key::BTN_DPAD_UP,
        ButtonId::DpadDown => Key::BTN_DPAD_DOWN,
        ButtonId::DpadLeft => Key::BTN_DPAD_LEFT,
        ButtonId::DpadRight => Key::BTN_DPAD_RIGHT,
    }
}

/// D-pad buttons reported through the hat axes.
fn hat_buttons(hat_x: i32, hat_y: i32) -> impl Iterator<Item = ButtonId> {
    let x = match hat_x {
        HAT_NEGATIVE => Some(ButtonId::DpadLeft),
        HAT_POSITIVE => Some(ButtonId::DpadRight),
        _ => None,
    };
    let y = match hat_y {
        HAT_NEGATIVE => Some(ButtonId::DpadUp),
        HAT_POSITIVE => Some(ButtonId::DpadDown),
        _ => None,
    };
    x.into_iter().chain(y)
}

/// Derives the controller variant from the bus and the device name.
fn classify_device(bus: BusType, name: &str) -> DeviceType {
    let name = name.to_lowercase();
    if name.contains("guitar") {
        DeviceType::GuitarController
    } else if bus == BusType::BUS_BLUETOOTH || name.contains("wireless") {
        DeviceType::Wireless
    } else if bus == BusType::BUS_USB {
        DeviceType::Wired
    } else {
        DeviceType::Unknown
    }
}
