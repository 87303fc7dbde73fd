//! # PS2 Controller Transport
//!
//! Talks to DualShock-style controllers (wired, guitar, or 2.4 GHz wireless
//! receivers) over the four-line PS2 bus.
//!
//! ## Handshake
//!
//! 1. Poll once; an unknown mode byte means nothing usable is attached.
//! 2. Up to [`CONFIG_ATTEMPTS`] times: enter config, query the model, switch
//!    to analog (locked), optionally enable rumble and pressures, exit
//!    config, poll. Stop as soon as the poll reports an analog mode.
//! 3. If pressures were requested, the final mode must report them.

pub mod gpio;
pub mod protocol;

use tracing::{debug, info, warn};

use self::gpio::GpioBus;
use self::protocol::{
    decode_poll, device_type_from_model, is_analog_mode, poll_command, PollFrame, ENABLE_PRESSURES,
    ENABLE_RUMBLE, ENTER_CONFIG, EXIT_CONFIG, MODE_ANALOG_PRESSURE, QUERY_MODEL, SET_ANALOG_LOCKED,
};
use super::transport::{ControllerPins, GamepadTransport, TransportConfig};
use super::types::{AxisId, ButtonId, DeviceType, ErrorCode};
use crate::error::{Result, RoverBridgeError};

/// Configuration rounds before giving up on analog mode.
pub const CONFIG_ATTEMPTS: usize = 10;

/// Bad poll frames between two warnings.
const BAD_FRAME_LOG_INTERVAL: u64 = 100;

/// Full-duplex PS2 bus.
pub trait Ps2Bus {
    /// Clocks out `command` with attention held low and returns the bytes
    /// clocked in, one per byte sent.
    fn transfer(&mut self, command: &[u8]) -> Result<Vec<u8>>;
}

/// Opens a bus on the given pins during `configure`.
pub type Connector<B> = Box<dyn FnMut(&ControllerPins) -> Result<B> + Send>;

/// PS2 controller behind a [`Ps2Bus`].
pub struct Ps2Gamepad<B> {
    connector: Connector<B>,
    bus: Option<B>,
    pressures: bool,
    model: Option<u8>,
    frame: PollFrame,
    changed: bool,
    bad_frames: u64,
}

impl<B> std::fmt::Debug for Ps2Gamepad<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ps2Gamepad")
            .field("connected", &self.bus.is_some())
            .field("pressures", &self.pressures)
            .field("model", &self.model)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl Ps2Gamepad<GpioBus> {
    /// Controller on bit-banged Raspberry Pi GPIO.
    #[must_use]
    pub fn gpio() -> Self {
        Self::with_connector(GpioBus::open)
    }
}

impl<B: Ps2Bus> Ps2Gamepad<B> {
    /// Controller on a custom bus.
    pub fn with_connector<F>(connector: F) -> Self
    where
        F: FnMut(&ControllerPins) -> Result<B> + Send + 'static,
    {
        Self {
            connector: Box::new(connector),
            bus: None,
            pressures: false,
            model: None,
            frame: PollFrame::default(),
            changed: false,
            bad_frames: 0,
        }
    }

    /// Number of malformed poll responses seen since the last handshake.
    #[must_use]
    pub fn bad_frames(&self) -> u64 {
        self.bad_frames
    }

    fn send(&mut self, command: &[u8]) -> Result<Vec<u8>> {
        let bus = self
            .bus
            .as_mut()
            .ok_or_else(|| RoverBridgeError::Controller("PS2 bus not open".to_string()))?;
        bus.transfer(command)
    }

    fn read(&mut self) -> Result<PollFrame> {
        let response = self.send(&poll_command(0, 0, self.pressures))?;
        decode_poll(&response)
    }

    /// One configuration round. Returns the mode reported afterwards.
    fn configure_round(&mut self, config: &TransportConfig) -> Result<u8> {
        self.send(&ENTER_CONFIG)?;

        let model = self.send(&QUERY_MODEL)?;
        if let Some(&byte) = model.get(3) {
            self.model = Some(byte);
        }

        self.send(&SET_ANALOG_LOCKED)?;
        if config.rumble {
            self.send(&ENABLE_RUMBLE)?;
        }
        if config.pressure_mode {
            self.send(&ENABLE_PRESSURES)?;
        }
        self.send(&EXIT_CONFIG)?;

        self.pressures = config.pressure_mode;
        let frame = self.read()?;
        self.frame = frame;
        Ok(frame.mode)
    }
}

impl<B: Ps2Bus> GamepadTransport for Ps2Gamepad<B> {
    fn configure(&mut self, config: &TransportConfig) -> ErrorCode {
        self.model = None;
        self.pressures = false;
        self.frame = PollFrame::default();
        self.changed = false;
        self.bad_frames = 0;

        match (self.connector)(&config.pins) {
            Ok(bus) => self.bus = Some(bus),
            Err(e) => {
                warn!("Could not open PS2 bus: {}", e);
                self.bus = None;
                return ErrorCode::WrongControllerMode;
            }
        }

        if let Err(e) = self.read() {
            debug!("No usable controller on the bus: {}", e);
            return ErrorCode::WrongControllerMode;
        }

        let mut analog_mode = None;
        for attempt in 1..=CONFIG_ATTEMPTS {
            match self.configure_round(config) {
                Ok(mode) if is_analog_mode(mode) => {
                    debug!("Controller in mode 0x{:02X} after {} attempt(s)", mode, attempt);
                    analog_mode = Some(mode);
                    break;
                }
                Ok(mode) => debug!("Attempt {}: controller still in mode 0x{:02X}", attempt, mode),
                Err(e) => debug!("Attempt {}: {}", attempt, e),
            }
        }

        let Some(mode) = analog_mode else {
            return ErrorCode::ControllerNotAcceptingCommands;
        };

        if config.pressure_mode && mode != MODE_ANALOG_PRESSURE {
            return ErrorCode::PressureModeError;
        }

        info!(
            "PS2 controller configured (model 0x{:02X}, mode 0x{:02X})",
            self.model.unwrap_or(0),
            mode
        );
        ErrorCode::Success
    }

    fn device_type(&self) -> DeviceType {
        self.model.map(device_type_from_model).unwrap_or_default()
    }

    fn refresh(&mut self) {
        match self.read() {
            Ok(frame) => {
                self.changed = frame.buttons != self.frame.buttons;
                self.frame = frame;
            }
            Err(e) => {
                self.changed = false;
                self.bad_frames += 1;
                if self.bad_frames % BAD_FRAME_LOG_INTERVAL == 1 {
                    warn!("Dropped PS2 poll frame ({} so far): {}", self.bad_frames, e);
                }
            }
        }
    }

    fn axis_value(&self, axis: AxisId) -> u8 {
        match axis {
            AxisId::LeftStickX => self.frame.left_stick_x,
            AxisId::LeftStickY => self.frame.left_stick_y,
            AxisId::RightStickX => self.frame.right_stick_x,
            AxisId::RightStickY => self.frame.right_stick_y,
        }
    }

    fn is_held(&self, button: ButtonId) -> bool {
        self.frame.buttons.contains(button)
    }

    fn held_set_changed(&self) -> bool {
        self.changed
    }
}

#[cfg(test)]
mod tests {
    use super::protocol::{
        MODEL_DUALSHOCK, MODEL_WIRELESS_DUALSHOCK, MODE_ANALOG, MODE_CONFIG, MODE_DIGITAL, PS2_ACK,
        POLL_FRAME_PRESSURE_LEN,
    };
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Emulated controller state shared between the test and the bus.
    #[derive(Debug)]
    struct PadState {
        present: bool,
        accepts_commands: bool,
        supports_pressure: bool,
        garbage: bool,
        model: u8,
        in_config: bool,
        analog: bool,
        pressure: bool,
        buttons: u16,
        sticks: [u8; 4],
        sent: Vec<Vec<u8>>,
    }

    /// Bus answering like a DualShock.
    #[derive(Clone)]
    struct FakePad {
        state: Arc<Mutex<PadState>>,
    }

    impl FakePad {
        fn wireless() -> Self {
            Self {
                state: Arc::new(Mutex::new(PadState {
                    present: true,
                    accepts_commands: true,
                    supports_pressure: true,
                    garbage: false,
                    model: MODEL_WIRELESS_DUALSHOCK,
                    in_config: false,
                    analog: false,
                    pressure: false,
                    buttons: 0,
                    sticks: [128, 127, 128, 127],
                    sent: Vec::new(),
                })),
            }
        }

        fn with(self, f: impl FnOnce(&mut PadState)) -> Self {
            f(&mut self.state.lock().unwrap());
            self
        }

        fn sent_count(&self, opcode: u8) -> usize {
            self.state
                .lock()
                .unwrap()
                .sent
                .iter()
                .filter(|frame| frame[1] == opcode)
                .count()
        }

        fn gamepad(&self) -> Ps2Gamepad<FakePad> {
            let pad = self.clone();
            Ps2Gamepad::with_connector(move |_| Ok(pad.clone()))
        }
    }

    impl Ps2Bus for FakePad {
        fn transfer(&mut self, command: &[u8]) -> Result<Vec<u8>> {
            let mut s = self.state.lock().unwrap();
            s.sent.push(command.to_vec());

            if !s.present || s.garbage {
                return Ok(vec![0xFF; command.len()]);
            }

            let mode = if s.in_config {
                MODE_CONFIG
            } else if s.pressure {
                MODE_ANALOG_PRESSURE
            } else if s.analog {
                MODE_ANALOG
            } else {
                MODE_DIGITAL
            };

            let mut response = vec![0u8; command.len()];
            response[0] = 0xFF;
            response[1] = mode;
            response[2] = PS2_ACK;

            match command[1] {
                0x42 => {
                    let raw = !s.buttons;
                    response[3] = raw as u8;
                    response[4] = (raw >> 8) as u8;
                    for (i, value) in s.sticks.iter().enumerate() {
                        if let Some(byte) = response.get_mut(5 + i) {
                            *byte = *value;
                        }
                    }
                }
                0x43 => s.in_config = command[3] == 0x01,
                0x44 if s.in_config && s.accepts_commands => s.analog = command[3] == 0x01,
                0x4F if s.in_config && s.accepts_commands && s.supports_pressure => {
                    s.pressure = true
                }
                0x45 if s.in_config => response[3] = s.model,
                _ => {}
            }

            Ok(response)
        }
    }

    fn config(pressure_mode: bool, rumble: bool) -> TransportConfig {
        TransportConfig {
            pins: ControllerPins {
                clock: 11,
                command: 10,
                select: 8,
                data: 9,
            },
            pressure_mode,
            rumble,
        }
    }

    // ==================== Handshake Tests ====================

    #[test]
    fn test_configure_wireless_controller() {
        let pad = FakePad::wireless();
        let mut gamepad = pad.gamepad();

        assert_eq!(gamepad.configure(&config(true, true)), ErrorCode::Success);
        assert_eq!(gamepad.device_type(), DeviceType::Wireless);
        assert_eq!(pad.sent_count(0x4D), 1);
        assert_eq!(pad.sent_count(0x4F), 1);
    }

    #[test]
    fn test_configure_without_controller() {
        let pad = FakePad::wireless().with(|s| s.present = false);
        let mut gamepad = pad.gamepad();

        assert_eq!(
            gamepad.configure(&config(false, false)),
            ErrorCode::WrongControllerMode
        );
        assert_eq!(gamepad.device_type(), DeviceType::Unknown);
        // Only the probing poll went out
        assert_eq!(pad.sent_count(0x43), 0);
    }

    #[test]
    fn test_configure_bus_unavailable() {
        let mut gamepad: Ps2Gamepad<FakePad> = Ps2Gamepad::with_connector(|_| {
            Err(RoverBridgeError::Controller("no gpio".to_string()))
        });

        assert_eq!(
            gamepad.configure(&config(false, false)),
            ErrorCode::WrongControllerMode
        );
    }

    #[test]
    fn test_configure_controller_ignoring_commands() {
        let pad = FakePad::wireless().with(|s| s.accepts_commands = false);
        let mut gamepad = pad.gamepad();

        assert_eq!(
            gamepad.configure(&config(false, false)),
            ErrorCode::ControllerNotAcceptingCommands
        );
        assert_eq!(pad.sent_count(0x44), CONFIG_ATTEMPTS);
    }

    #[test]
    fn test_configure_pressure_refused() {
        let pad = FakePad::wireless().with(|s| s.supports_pressure = false);
        let mut gamepad = pad.gamepad();

        assert_eq!(
            gamepad.configure(&config(true, false)),
            ErrorCode::PressureModeError
        );
    }

    #[test]
    fn test_configure_without_pressure_on_basic_controller() {
        let pad = FakePad::wireless().with(|s| s.supports_pressure = false);
        let mut gamepad = pad.gamepad();

        assert_eq!(gamepad.configure(&config(false, false)), ErrorCode::Success);
        assert_eq!(pad.sent_count(0x4F), 0);
        assert_eq!(pad.sent_count(0x4D), 0);
    }

    #[test]
    fn test_configure_reports_wired_model() {
        let pad = FakePad::wireless().with(|s| s.model = MODEL_DUALSHOCK);
        let mut gamepad = pad.gamepad();

        assert_eq!(gamepad.configure(&config(true, true)), ErrorCode::Success);
        assert_eq!(gamepad.device_type(), DeviceType::Wired);
    }

    #[test]
    fn test_pressure_mode_uses_long_poll_frames() {
        let pad = FakePad::wireless();
        let mut gamepad = pad.gamepad();
        gamepad.configure(&config(true, false));
        gamepad.refresh();

        let state = pad.state.lock().unwrap();
        let last = state.sent.last().unwrap();
        assert_eq!(last[1], 0x42);
        assert_eq!(last.len(), POLL_FRAME_PRESSURE_LEN);
    }

    // ==================== Refresh Tests ====================

    #[test]
    fn test_refresh_reads_sticks_and_buttons() {
        let pad = FakePad::wireless();
        let mut gamepad = pad.gamepad();
        gamepad.configure(&config(false, true));

        {
            let mut s = pad.state.lock().unwrap();
            s.sticks = [10, 20, 30, 40];
            s.buttons = ButtonId::Triangle.mask() | ButtonId::Circle.mask();
        }
        gamepad.refresh();

        assert_eq!(gamepad.axis_value(AxisId::RightStickX), 10);
        assert_eq!(gamepad.axis_value(AxisId::RightStickY), 20);
        assert_eq!(gamepad.axis_value(AxisId::LeftStickX), 30);
        assert_eq!(gamepad.axis_value(AxisId::LeftStickY), 40);
        assert!(gamepad.is_held(ButtonId::Triangle));
        assert!(gamepad.is_held(ButtonId::Circle));
        assert!(!gamepad.is_held(ButtonId::Cross));
        assert!(gamepad.held_set_changed());

        gamepad.refresh();
        assert!(!gamepad.held_set_changed());
    }

    #[test]
    fn test_refresh_keeps_state_on_bad_frame() {
        let pad = FakePad::wireless();
        let mut gamepad = pad.gamepad();
        gamepad.configure(&config(false, false));

        {
            let mut s = pad.state.lock().unwrap();
            s.sticks = [0, 0, 255, 0];
            s.buttons = ButtonId::Cross.mask();
        }
        gamepad.refresh();

        pad.state.lock().unwrap().garbage = true;
        gamepad.refresh();

        assert_eq!(gamepad.bad_frames(), 1);
        assert_eq!(gamepad.axis_value(AxisId::LeftStickX), 255);
        assert!(gamepad.is_held(ButtonId::Cross));
        assert!(!gamepad.held_set_changed());
    }
}
