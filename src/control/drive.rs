//! # Drive Mapper
//!
//! Maps the left stick onto differential-drive wheel commands.
//!
//! ## Behaviour
//!
//! | Stick Y | Stick X | Left wheel | Right wheel |
//! |---------|---------|------------|-------------|
//! | center | center | stopped | stopped |
//! | center | left | spin duty, backward | spin duty, forward |
//! | center | right | spin duty, forward | spin duty, backward |
//! | up/down | center | throttle | throttle |
//! | up/down | left/right | arc turn: inner wheel throttled | |
//!
//! ## Polarity
//!
//! The stick pushed up (Y below 127) drives both wheels [`Direction::Forward`],
//! pulled down drives them [`Direction::Backward`]. In an arc turn both wheels
//! keep the translation direction. This convention is fixed; a chassis wired
//! the other way round swaps its H-bridge inputs instead.
//!
//! ## Arc Turns
//!
//! The outer wheel runs at the throttle duty. The inner wheel is scaled by how
//! far X sits from its far edge: full deflection stops the inner wheel, a
//! stick just off center leaves it close to the outer duty. Moving forward,
//! X left makes the left wheel the inner one; moving backward it is mirrored.
//!
//! ## Usage
//!
//! ```
//! use rover_bridge::control::drive::{DriveMapper, Direction};
//!
//! let mapper = DriveMapper::default();
//!
//! // Stick pushed fully left without throttle: spin in place
//! let command = mapper.map(0, 127);
//! assert_eq!(command.left.duty_cycle, 255);
//! assert_eq!(command.left.direction, Direction::Backward);
//! assert_eq!(command.right.direction, Direction::Forward);
//! ```

use crate::control::interpolate::map_to_byte;
use crate::controller::types::{AXIS_MAX, STICK_X_CENTER, STICK_Y_CENTER};

/// Full PWM duty.
pub const MAX_DUTY: u8 = 255;

/// Rotation sense of one wheel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Chassis side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    Left,
    Right,
}

/// Duty cycle and direction for one wheel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WheelCommand {
    pub duty_cycle: u8,
    pub direction: Direction,
}

impl WheelCommand {
    /// Wheel stopped.
    pub const STOPPED: WheelCommand = WheelCommand::new(0, Direction::Forward);

    #[must_use]
    pub const fn new(duty_cycle: u8, direction: Direction) -> Self {
        Self {
            duty_cycle,
            direction,
        }
    }
}

/// Commands for both wheels, derived from one stick sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveCommand {
    pub left: WheelCommand,
    pub right: WheelCommand,
}

impl DriveCommand {
    /// Both wheels stopped.
    pub const STOPPED: DriveCommand = DriveCommand {
        left: WheelCommand::STOPPED,
        right: WheelCommand::STOPPED,
    };

    /// Command for one side.
    #[must_use]
    pub fn wheel(&self, wheel: Wheel) -> WheelCommand {
        match wheel {
            Wheel::Left => self.left,
            Wheel::Right => self.right,
        }
    }
}

/// Stick-to-wheel transform.
///
/// Holds only constants; [`DriveMapper::map`] has no side effects and is
/// defined for every (X, Y) sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveMapper {
    /// Duty at full stick deflection.
    max_duty: u8,
    /// Duty of both wheels when spinning in place.
    spin_duty: u8,
}

impl Default for DriveMapper {
    fn default() -> Self {
        Self::new(MAX_DUTY, MAX_DUTY)
    }
}

impl DriveMapper {
    /// Creates a mapper. `spin_duty` is capped at `max_duty`.
    #[must_use]
    pub fn new(max_duty: u8, spin_duty: u8) -> Self {
        Self {
            max_duty,
            spin_duty: spin_duty.min(max_duty),
        }
    }

    /// Maps one left-stick sample to wheel commands.
    ///
    /// # Arguments
    ///
    /// * `stick_x` - Left stick X (0 = full left, 128 = center, 255 = full right)
    /// * `stick_y` - Left stick Y (0 = full up, 127 = center, 255 = full down)
    #[must_use]
    pub fn map(&self, stick_x: u8, stick_y: u8) -> DriveCommand {
        if stick_y == STICK_Y_CENTER {
            return self.spin(stick_x);
        }

        let direction = translation_direction(stick_y);
        let outer = self.translation_duty(stick_y);

        if stick_x == STICK_X_CENTER {
            let wheel = WheelCommand::new(outer, direction);
            return DriveCommand {
                left: wheel,
                right: wheel,
            };
        }

        let inner = WheelCommand::new(inner_duty(stick_x, outer), direction);
        let outer = WheelCommand::new(outer, direction);

        let turning_left = stick_x < STICK_X_CENTER;
        let left_is_inner = match direction {
            Direction::Forward => turning_left,
            Direction::Backward => !turning_left,
        };

        if left_is_inner {
            DriveCommand {
                left: inner,
                right: outer,
            }
        } else {
            DriveCommand {
                left: outer,
                right: inner,
            }
        }
    }

    /// Zero-throttle case: stop, or spin in place towards X.
    fn spin(&self, stick_x: u8) -> DriveCommand {
        let (left, right) = match stick_x.cmp(&STICK_X_CENTER) {
            std::cmp::Ordering::Equal => return DriveCommand::STOPPED,
            std::cmp::Ordering::Less => (Direction::Backward, Direction::Forward),
            std::cmp::Ordering::Greater => (Direction::Forward, Direction::Backward),
        };
        DriveCommand {
            left: WheelCommand::new(self.spin_duty, left),
            right: WheelCommand::new(self.spin_duty, right),
        }
    }

    /// Throttle duty: 0 at center, `max_duty` at either end of Y.
    fn translation_duty(&self, stick_y: u8) -> u8 {
        let far_end = if stick_y < STICK_Y_CENTER { 0 } else { AXIS_MAX };
        map_to_byte(
            i32::from(stick_y),
            i32::from(STICK_Y_CENTER),
            i32::from(far_end),
            self.max_duty,
        )
    }
}

fn translation_direction(stick_y: u8) -> Direction {
    if stick_y > STICK_Y_CENTER {
        Direction::Backward
    } else {
        Direction::Forward
    }
}

/// Inner wheel duty: 0 at full X deflection, approaching `outer` near center.
fn inner_duty(stick_x: u8, outer: u8) -> u8 {
    // Distance from the far edge on the side X points to
    let (distance, half_range) = if stick_x < STICK_X_CENTER {
        (stick_x, STICK_X_CENTER)
    } else {
        (AXIS_MAX - stick_x, AXIS_MAX - STICK_X_CENTER)
    };
    map_to_byte(i32::from(distance), 0, i32::from(half_range), outer)
}
