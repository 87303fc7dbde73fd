//! # Actuator Module
//!
//! The boundary between the mapping pipeline and the hardware.
//!
//! - [`WheelDriver`] takes a duty cycle and direction per wheel
//! - [`JointDriver`] takes an absolute target angle per joint
//!
//! Both apply the command immediately; nothing is queued or motion-profiled.
//! [`gpio::GpioActuators`] implements both on Raspberry Pi GPIO lines.

pub mod gpio;
pub mod servo;

use crate::control::arm::{ArmCommand, Joint};
use crate::control::drive::{DriveCommand, Wheel, WheelCommand};
use crate::error::Result;

/// Wheel motor interface
pub trait WheelDriver {
    /// Applies duty cycle and direction to one wheel.
    fn set_wheel(&mut self, wheel: Wheel, command: WheelCommand) -> Result<()>;

    /// Applies a full drive command, left wheel first.
    fn apply_drive(&mut self, command: &DriveCommand) -> Result<()> {
        self.set_wheel(Wheel::Left, command.left)?;
        self.set_wheel(Wheel::Right, command.right)
    }
}

/// Joint servo interface
pub trait JointDriver {
    /// Moves one joint to an absolute angle in degrees.
    fn set_joint(&mut self, joint: Joint, angle: u8) -> Result<()>;

    /// Moves every joint to its target.
    fn apply_arm(&mut self, command: &ArmCommand) -> Result<()> {
        for joint in Joint::ALL {
            self.set_joint(joint, command.angle(joint))?;
        }
        Ok(())
    }
}
