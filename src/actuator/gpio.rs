//! GPIO-driven wheels and servos.
//!
//! ## Wheels
//!
//! Each wheel is an H-bridge channel with two direction inputs and one enable
//! line carrying software PWM:
//!
//! | Direction | IN1 | IN2 |
//! |-----------|-----|-----|
//! | Forward | high | low |
//! | Backward | low | high |
//!
//! The enable line runs at the configured frequency with a duty fraction of
//! `duty / 255`.
//!
//! ## Joints
//!
//! Each joint is one or more hobby servos on 50 Hz PWM. Servos of the same
//! joint (the two lift servos) always receive the same pulse.

use rppal::gpio::{Gpio, OutputPin};
use std::time::Duration;
use tracing::debug;

use super::servo::{ServoTiming, SERVO_PERIOD};
use super::{JointDriver, WheelDriver};
use crate::config::{ActuatorConfig, MotorPins};
use crate::control::arm::Joint;
use crate::control::drive::{Direction, Wheel, WheelCommand, MAX_DUTY};
use crate::error::Result;

/// A single output line able to carry PWM.
pub trait OutputLine {
    fn drive(&mut self, high: bool);

    /// Free-running PWM at `frequency_hz` with `duty` in 0.0..=1.0.
    fn pwm_duty(&mut self, frequency_hz: f64, duty: f64) -> Result<()>;

    /// Fixed-period PWM with an explicit pulse width.
    fn pwm_pulse(&mut self, period: Duration, pulse: Duration) -> Result<()>;
}

impl OutputLine for OutputPin {
    fn drive(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    fn pwm_duty(&mut self, frequency_hz: f64, duty: f64) -> Result<()> {
        self.set_pwm_frequency(frequency_hz, duty)?;
        Ok(())
    }

    fn pwm_pulse(&mut self, period: Duration, pulse: Duration) -> Result<()> {
        self.set_pwm(period, pulse)?;
        Ok(())
    }
}

/// One H-bridge channel.
pub struct HBridge<L> {
    enable: L,
    in1: L,
    in2: L,
    frequency_hz: f64,
}

impl<L: OutputLine> HBridge<L> {
    pub fn new(enable: L, in1: L, in2: L, frequency_hz: f64) -> Self {
        Self {
            enable,
            in1,
            in2,
            frequency_hz,
        }
    }

    /// Sets direction lines, then the enable duty.
    pub fn apply(&mut self, command: WheelCommand) -> Result<()> {
        let forward = command.direction == Direction::Forward;
        self.in1.drive(forward);
        self.in2.drive(!forward);
        let duty = f64::from(command.duty_cycle) / f64::from(MAX_DUTY);
        self.enable.pwm_duty(self.frequency_hz, duty)
    }
}

/// Servos that always move together.
pub struct ServoGroup<L> {
    lines: Vec<L>,
    timing: ServoTiming,
}

impl<L: OutputLine> ServoGroup<L> {
    pub fn new(lines: Vec<L>, timing: ServoTiming) -> Self {
        Self { lines, timing }
    }

    pub fn move_to(&mut self, angle: u8) -> Result<()> {
        let pulse = self.timing.pulse_width(angle);
        for line in &mut self.lines {
            line.pwm_pulse(SERVO_PERIOD, pulse)?;
        }
        Ok(())
    }
}

/// All rover actuators.
pub struct GpioActuators<L = OutputPin> {
    left: HBridge<L>,
    right: HBridge<L>,
    rotation: ServoGroup<L>,
    vertical_lift: ServoGroup<L>,
    gripper: ServoGroup<L>,
}

impl<L> std::fmt::Debug for GpioActuators<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpioActuators")
            .field("lift_servos", &self.vertical_lift.lines.len())
            .field("pwm_frequency_hz", &self.left.frequency_hz)
            .finish()
    }
}

impl GpioActuators<OutputPin> {
    /// Claims every actuator line.
    ///
    /// Lines start low; nothing moves until the first command.
    ///
    /// # Errors
    ///
    /// Returns `Gpio` error if the GPIO peripheral or any pin is unavailable.
    pub fn open(config: &ActuatorConfig, pwm_frequency_hz: f64) -> Result<Self> {
        let gpio = Gpio::new()?;
        let timing = ServoTiming {
            min_pulse_us: config.servo_min_pulse_us,
            max_pulse_us: config.servo_max_pulse_us,
        };

        let bridge = |pins: &MotorPins| -> Result<HBridge<OutputPin>> {
            Ok(HBridge::new(
                gpio.get(pins.pwm)?.into_output_low(),
                gpio.get(pins.in1)?.into_output_low(),
                gpio.get(pins.in2)?.into_output_low(),
                pwm_frequency_hz,
            ))
        };
        let servos = |pins: &[u8]| -> Result<ServoGroup<OutputPin>> {
            let lines = pins
                .iter()
                .map(|pin| -> Result<OutputPin> { Ok(gpio.get(*pin)?.into_output_low()) })
                .collect::<Result<Vec<_>>>()?;
            Ok(ServoGroup::new(lines, timing))
        };

        let actuators = Self {
            left: bridge(&config.left_motor)?,
            right: bridge(&config.right_motor)?,
            rotation: servos(&[config.rotation_servo])?,
            vertical_lift: servos(&config.lift_servos)?,
            gripper: servos(&[config.gripper_servo])?,
        };
        debug!("Opened actuators: {:?}", actuators);
        Ok(actuators)
    }
}

impl<L: OutputLine> GpioActuators<L> {
    pub fn new(
        left: HBridge<L>,
        right: HBridge<L>,
        rotation: ServoGroup<L>,
        vertical_lift: ServoGroup<L>,
        gripper: ServoGroup<L>,
    ) -> Self {
        Self {
            left,
            right,
            rotation,
            vertical_lift,
            gripper,
        }
    }
}

impl<L: OutputLine> WheelDriver for GpioActuators<L> {
    fn set_wheel(&mut self, wheel: Wheel, command: WheelCommand) -> Result<()> {
        match wheel {
            Wheel::Left => self.left.apply(command),
            Wheel::Right => self.right.apply(command),
        }
    }
}

impl<L: OutputLine> JointDriver for GpioActuators<L> {
    fn set_joint(&mut self, joint: Joint, angle: u8) -> Result<()> {
        match joint {
            Joint::Rotation => self.rotation.move_to(angle),
            Joint::VerticalLift => self.vertical_lift.move_to(angle),
            Joint::Gripper => self.gripper.move_to(angle),
        }
    }
}
