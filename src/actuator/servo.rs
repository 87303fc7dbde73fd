//! Hobby-servo pulse timing.
//!
//! A servo expects one pulse every 20 ms; the pulse width selects the angle
//! linearly between the configured minimum (0°) and maximum (180°).

use std::time::Duration;

use crate::config::MAX_SERVO_ANGLE;

/// Servo frame period (50 Hz).
pub const SERVO_PERIOD: Duration = Duration::from_millis(20);

/// Pulse range of a servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoTiming {
    pub min_pulse_us: u64,
    pub max_pulse_us: u64,
}

impl Default for ServoTiming {
    fn default() -> Self {
        Self {
            min_pulse_us: 544,
            max_pulse_us: 2400,
        }
    }
}

impl ServoTiming {
    /// Pulse width for `angle`; angles past 180° are treated as 180°.
    #[must_use]
    pub fn pulse_width(&self, angle: u8) -> Duration {
        let angle = u64::from(angle.min(MAX_SERVO_ANGLE));
        let span = self.max_pulse_us.saturating_sub(self.min_pulse_us);
        Duration::from_micros(self.min_pulse_us + angle * span / u64::from(MAX_SERVO_ANGLE))
    }
}
