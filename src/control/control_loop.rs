//! # Control Loop
//!
//! Fixed-period polling cadence tying the controller link to the actuators.
//!
//! ## Cycle
//!
//! 1. Poll the [`ControllerLink`] once
//! 2. Map the left stick through the [`DriveMapper`]
//! 3. Step the arm joints through the [`ArmController`]
//! 4. Send both results to the actuators
//! 5. Sleep for the poll period
//!
//! Drive and arm commands always come from the same snapshot; the gamepad is
//! never read twice in a cycle. Nothing is actuated unless the link is
//! `Ready`, and a failed handshake ends [`ControlLoop::run`] before the first
//! command goes out.
//!
//! ## Usage
//!
//! ```no_run
//! use rover_bridge::actuator::gpio::GpioActuators;
//! use rover_bridge::config::Config;
//! use rover_bridge::control::control_loop::ControlLoop;
//! use rover_bridge::controller::ps2::Ps2Gamepad;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let actuators = GpioActuators::open(&config.actuators, config.drive.pwm_frequency_hz)?;
//! let control = ControlLoop::new(Ps2Gamepad::gpio(), actuators, &config);
//!
//! // Only returns if the handshake fails
//! let err = control.run(&config.gamepad.transport_config()).unwrap_err();
//! eprintln!("{}", err);
//! # Ok(())
//! # }
//! ```

use std::convert::Infallible;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::actuator::{JointDriver, WheelDriver};
use crate::config::Config;
use crate::control::arm::{ArmCommand, ArmController, ArmState};
use crate::control::drive::{DriveCommand, DriveMapper};
use crate::controller::link::{ControllerLink, ControllerLinkState};
use crate::controller::transport::{GamepadTransport, TransportConfig};
use crate::error::LinkError;

/// State carried from one cycle to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotState {
    pub arm: ArmState,
}

/// Commands produced by one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleCommands {
    pub drive: DriveCommand,
    pub arm: ArmCommand,
}

/// Single-threaded poll/map/actuate loop.
pub struct ControlLoop<T, A> {
    link: ControllerLink<T>,
    actuators: A,
    drive: DriveMapper,
    arm: ArmController,
    state: RobotState,
    period: Duration,
    status_log_interval: u64,
    cycles: u64,
    actuation_errors: u64,
}

impl<T, A> ControlLoop<T, A>
where
    T: GamepadTransport,
    A: WheelDriver + JointDriver,
{
    /// Wires a transport and actuators with the configured mapping constants.
    pub fn new(transport: T, actuators: A, config: &Config) -> Self {
        let arm = ArmController::new(config.arm.clone());
        let state = RobotState {
            arm: arm.initial_state(),
        };

        Self {
            link: ControllerLink::new(transport),
            actuators,
            drive: DriveMapper::new(config.drive.max_duty, config.drive.spin_duty),
            arm,
            state,
            period: config.control.poll_period(),
            status_log_interval: config.control.status_log_interval.max(1),
            cycles: 0,
            actuation_errors: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &RobotState {
        &self.state
    }

    #[must_use]
    pub fn link_state(&self) -> ControllerLinkState {
        self.link.state()
    }

    /// Completed cycles since start-up.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[must_use]
    pub fn actuation_errors(&self) -> u64 {
        self.actuation_errors
    }

    /// Runs the handshake and, once `Ready`, parks the actuators.
    ///
    /// Parking stops both wheels and moves every joint to its initial angle.
    ///
    /// # Errors
    ///
    /// Returns the [`LinkError`] that left the link `Failed`. No actuator
    /// is touched in that case.
    pub fn connect(&mut self, config: &TransportConfig) -> Result<(), LinkError> {
        self.link.connect(config);
        if let Some(err) = self.link.failure() {
            return Err(err);
        }

        let initial = self.state.arm.command();
        self.actuate(&CycleCommands {
            drive: DriveCommand::STOPPED,
            arm: initial,
        });
        info!(
            "Actuators parked (rotation={}, lift={}, gripper={})",
            initial.rotation, initial.vertical_lift, initial.gripper
        );
        Ok(())
    }

    /// One poll/map/actuate pass without the sleep.
    ///
    /// Returns `None` without reading the gamepad when the link is not
    /// `Ready`.
    pub fn run_cycle(&mut self) -> Option<CycleCommands> {
        if !self.link.is_ready() {
            return None;
        }

        let snapshot = self.link.poll();
        let commands = CycleCommands {
            drive: self.drive.map(snapshot.left_stick_x, snapshot.left_stick_y),
            arm: self.arm.update(&mut self.state.arm, &snapshot),
        };

        if snapshot.buttons_changed {
            debug!("Buttons held: {:?}", snapshot.buttons.iter().collect::<Vec<_>>());
        }

        self.actuate(&commands);
        self.cycles += 1;

        if self.cycles % self.status_log_interval == 0 {
            info!(
                "Cycle {}: left={} {:?}, right={} {:?}, rotation={}, lift={}, gripper={}, actuation errors={}",
                self.cycles,
                commands.drive.left.duty_cycle,
                commands.drive.left.direction,
                commands.drive.right.duty_cycle,
                commands.drive.right.direction,
                commands.arm.rotation,
                commands.arm.vertical_lift,
                commands.arm.gripper,
                self.actuation_errors
            );
        }

        Some(commands)
    }

    /// Connects, then cycles every poll period until power-off.
    ///
    /// # Errors
    ///
    /// Returns only if the handshake fails; the caller reports it and stays
    /// inert.
    pub fn run(mut self, config: &TransportConfig) -> Result<Infallible, LinkError> {
        self.connect(config)?;
        info!("Control loop running every {:?}", self.period);

        loop {
            self.run_cycle();
            thread::sleep(self.period);
        }
    }

    /// Sends both commands; a hardware error is logged and the cycle goes on.
    fn actuate(&mut self, commands: &CycleCommands) {
        if let Err(e) = self.actuators.apply_drive(&commands.drive) {
            self.actuation_errors += 1;
            warn!("Failed to apply drive command: {}", e);
        }
        if let Err(e) = self.actuators.apply_arm(&commands.arm) {
            self.actuation_errors += 1;
            warn!("Failed to apply arm command: {}", e);
        }
    }
}
