//! # Arm Controller
//!
//! Per-joint angle state for the gripper arm, stepped a little every poll.
//!
//! ## Joints
//!
//! | Joint | Input | Step |
//! |-------|-------|------|
//! | Rotation | right stick X, outside the deadzone | `map(x, 0..255 -> +max..-max)` |
//! | Vertical lift | increase / decrease buttons (triangle / cross) | fixed |
//! | Gripper | increase / decrease buttons (circle / square) | fixed |
//!
//! Every step is clamped to the joint's travel limits, so holding a button
//! past a limit parks the joint there. When both buttons of a pair are held,
//! the increase button wins.
//!
//! ## Ownership
//!
//! Joint angles live in an [`ArmState`]; the controller itself only holds
//! tuning constants. The control loop owns the single `ArmState` and hands it
//! in by mutable reference on every update.

use crate::config::{ArmConfig, ButtonPairConfig, JointConfig};
use crate::control::interpolate::map_range;
use crate::controller::types::{ControllerSnapshot, AXIS_MAX};

/// Arm joints driven by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    Rotation,
    VerticalLift,
    Gripper,
}

impl Joint {
    pub const ALL: [Joint; 3] = [Joint::Rotation, Joint::VerticalLift, Joint::Gripper];
}

/// Inclusive travel range of a joint, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointLimits {
    pub min: u8,
    pub max: u8,
}

impl JointLimits {
    /// Clamps `angle` into the range. Swapped bounds are treated as ordered.
    #[must_use]
    pub fn clamp(&self, angle: i32) -> u8 {
        let (low, high) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        angle.clamp(i32::from(low), i32::from(high)) as u8
    }
}

/// Current angle of one joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointState {
    angle: u8,
    limits: JointLimits,
}

impl JointState {
    /// Starts at `angle`, clamped into `limits`.
    #[must_use]
    pub fn new(angle: u8, limits: JointLimits) -> Self {
        Self {
            angle: limits.clamp(i32::from(angle)),
            limits,
        }
    }

    #[must_use]
    pub fn angle(&self) -> u8 {
        self.angle
    }

    #[must_use]
    pub fn limits(&self) -> JointLimits {
        self.limits
    }

    /// Adds a signed step and clamps. Returns the new angle.
    pub fn step(&mut self, delta: i32) -> u8 {
        self.angle = self.limits.clamp(i32::from(self.angle) + delta);
        self.angle
    }
}

impl From<&JointConfig> for JointState {
    fn from(config: &JointConfig) -> Self {
        JointState::new(
            config.initial_angle,
            JointLimits {
                min: config.min_angle,
                max: config.max_angle,
            },
        )
    }
}

/// Angles of all arm joints; persists across polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmState {
    pub rotation: JointState,
    pub vertical_lift: JointState,
    pub gripper: JointState,
}

impl ArmState {
    #[must_use]
    pub fn joint(&self, joint: Joint) -> &JointState {
        match joint {
            Joint::Rotation => &self.rotation,
            Joint::VerticalLift => &self.vertical_lift,
            Joint::Gripper => &self.gripper,
        }
    }

    /// Target angles as they stand.
    #[must_use]
    pub fn command(&self) -> ArmCommand {
        ArmCommand {
            rotation: self.rotation.angle(),
            vertical_lift: self.vertical_lift.angle(),
            gripper: self.gripper.angle(),
        }
    }
}

/// Absolute target angles for every joint, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmCommand {
    pub rotation: u8,
    pub vertical_lift: u8,
    pub gripper: u8,
}

impl ArmCommand {
    #[must_use]
    pub fn angle(&self, joint: Joint) -> u8 {
        match joint {
            Joint::Rotation => self.rotation,
            Joint::VerticalLift => self.vertical_lift,
            Joint::Gripper => self.gripper,
        }
    }
}

/// Turns right-stick and button input into bounded joint steps.
#[derive(Debug, Clone)]
pub struct ArmController {
    config: ArmConfig,
}

impl ArmController {
    #[must_use]
    pub fn new(config: ArmConfig) -> Self {
        Self { config }
    }

    /// Joint state at power-up.
    #[must_use]
    pub fn initial_state(&self) -> ArmState {
        ArmState {
            rotation: JointState::from(&self.config.rotation),
            vertical_lift: JointState::from(&self.config.vertical_lift),
            gripper: JointState::from(&self.config.gripper),
        }
    }

    /// Applies one snapshot to `state` and returns the resulting targets.
    pub fn update(&self, state: &mut ArmState, snapshot: &ControllerSnapshot) -> ArmCommand {
        state.rotation.step(self.rotation_step(snapshot.right_stick_x));
        state
            .vertical_lift
            .step(button_step(snapshot, self.config.lift_buttons, self.config.lift_step));
        state
            .gripper
            .step(button_step(snapshot, self.config.gripper_buttons, self.config.gripper_step));
        state.command()
    }

    /// Signed rotation step for a right stick X sample; 0 inside the deadzone.
    #[must_use]
    pub fn rotation_step(&self, stick_x: u8) -> i32 {
        if (self.config.rotation_deadzone_low..=self.config.rotation_deadzone_high)
            .contains(&stick_x)
        {
            return 0;
        }
        let max = i32::from(self.config.max_rotation_step);
        map_range(i32::from(stick_x), 0, i32::from(AXIS_MAX), max, -max)
    }
}

fn button_step(snapshot: &ControllerSnapshot, buttons: ButtonPairConfig, step: u8) -> i32 {
    if snapshot.is_held(buttons.increase) {
        i32::from(step)
    } else if snapshot.is_held(buttons.decrease) {
        -i32::from(step)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::types::{ButtonId, ButtonSet};

    fn controller() -> ArmController {
        ArmController::new(ArmConfig::default())
    }

    fn holding(buttons: &[ButtonId]) -> ControllerSnapshot {
        ControllerSnapshot {
            buttons: buttons.iter().copied().collect::<ButtonSet>(),
            ..ControllerSnapshot::neutral()
        }
    }

    fn right_stick(x: u8) -> ControllerSnapshot {
        ControllerSnapshot {
            right_stick_x: x,
            ..ControllerSnapshot::neutral()
        }
    }

    // ==================== JointState Tests ====================

    #[test]
    fn test_joint_step_clamps_at_limits() {
        let mut joint = JointState::new(90, JointLimits { min: 10, max: 170 });
        assert_eq!(joint.step(100), 170);
        assert_eq!(joint.step(5), 170);
        assert_eq!(joint.step(-500), 10);
        assert_eq!(joint.step(-1), 10);
        assert_eq!(joint.step(3), 13);
    }

    #[test]
    fn test_joint_new_clamps_initial_angle() {
        let joint = JointState::new(5, JointLimits { min: 20, max: 160 });
        assert_eq!(joint.angle(), 20);
    }

    #[test]
    fn test_swapped_limits_clamp_without_panicking() {
        let limits = JointLimits { min: 150, max: 30 };
        assert_eq!(limits.clamp(0), 30);
        assert_eq!(limits.clamp(200), 150);
        assert_eq!(limits.clamp(90), 90);

        let mut joint = JointState::new(10, limits);
        assert_eq!(joint.angle(), 30);
        assert_eq!(joint.step(500), 150);
    }

    #[test]
    fn test_joint_from_config() {
        let joint = JointState::from(&JointConfig {
            min_angle: 30,
            max_angle: 150,
            initial_angle: 45,
        });
        assert_eq!(joint.angle(), 45);
        assert_eq!(joint.limits(), JointLimits { min: 30, max: 150 });
    }

    // ==================== Idle Input ====================

    #[test]
    fn test_initial_state_is_centered() {
        let command = controller().initial_state().command();
        assert_eq!(command, ArmCommand { rotation: 90, vertical_lift: 90, gripper: 90 });
    }

    #[test]
    fn test_neutral_snapshot_leaves_arm_idle() {
        let arm = controller();
        let mut state = arm.initial_state();
        for _ in 0..50 {
            arm.update(&mut state, &ControllerSnapshot::neutral());
        }
        assert_eq!(state, arm.initial_state());
    }

    // ==================== Rotation ====================

    #[test]
    fn test_rotation_deadzone_is_inclusive() {
        let arm = controller();
        for x in 124..=132u8 {
            assert_eq!(arm.rotation_step(x), 0, "x={}", x);
        }
        assert_ne!(arm.rotation_step(123), 0);
    }

    #[test]
    fn test_rotation_step_extremes() {
        let arm = controller();
        assert_eq!(arm.rotation_step(0), 5);
        assert_eq!(arm.rotation_step(255), -5);
        // 5 - 1000 / 255 truncated
        assert_eq!(arm.rotation_step(100), 2);
    }

    #[test]
    fn test_rotation_step_never_exceeds_max() {
        let arm = controller();
        for x in 0..=255u8 {
            assert!(arm.rotation_step(x).abs() <= 5, "x={}", x);
        }
    }

    #[test]
    fn test_stick_left_increases_rotation() {
        let arm = controller();
        let mut state = arm.initial_state();
        let command = arm.update(&mut state, &right_stick(0));
        assert_eq!(command.rotation, 95);
        let command = arm.update(&mut state, &right_stick(255));
        assert_eq!(command.rotation, 90);
    }

    #[test]
    fn test_rotation_clamps_at_both_ends() {
        let arm = controller();
        let mut state = arm.initial_state();
        for _ in 0..100 {
            arm.update(&mut state, &right_stick(0));
        }
        assert_eq!(state.rotation.angle(), 180);
        for _ in 0..100 {
            arm.update(&mut state, &right_stick(255));
        }
        assert_eq!(state.rotation.angle(), 0);
    }

    #[test]
    fn test_custom_deadzone() {
        let arm = ArmController::new(ArmConfig {
            rotation_deadzone_low: 92,
            rotation_deadzone_high: 96,
            ..ArmConfig::default()
        });
        assert_eq!(arm.rotation_step(94), 0);
        // Outside the band, the center no longer rests
        assert_eq!(arm.rotation_step(80), 2);
    }

    // ==================== Vertical Lift ====================

    #[test]
    fn test_lift_increase_and_decrease() {
        let arm = controller();
        let mut state = arm.initial_state();
        assert_eq!(arm.update(&mut state, &holding(&[ButtonId::Triangle])).vertical_lift, 93);
        assert_eq!(arm.update(&mut state, &holding(&[ButtonId::Cross])).vertical_lift, 90);
    }

    #[test]
    fn test_lift_increase_wins_tie() {
        let arm = controller();
        let mut state = arm.initial_state();
        let command = arm.update(&mut state, &holding(&[ButtonId::Triangle, ButtonId::Cross]));
        assert_eq!(command.vertical_lift, 93);
    }

    #[test]
    fn test_lift_never_exceeds_limits() {
        let arm = controller();
        let mut state = arm.initial_state();
        for _ in 0..200 {
            let command = arm.update(&mut state, &holding(&[ButtonId::Triangle]));
            assert!(command.vertical_lift <= 180);
        }
        assert_eq!(state.vertical_lift.angle(), 180);

        for _ in 0..200 {
            arm.update(&mut state, &holding(&[ButtonId::Cross]));
        }
        assert_eq!(state.vertical_lift.angle(), 0);
    }

    // ==================== Gripper ====================

    #[test]
    fn test_gripper_steps_independently() {
        let arm = controller();
        let mut state = arm.initial_state();
        let command = arm.update(&mut state, &holding(&[ButtonId::Circle, ButtonId::Cross]));
        assert_eq!(command.gripper, 92);
        assert_eq!(command.vertical_lift, 87);
        assert_eq!(command.rotation, 90);

        let command = arm.update(&mut state, &holding(&[ButtonId::Square]));
        assert_eq!(command.gripper, 90);
    }

    #[test]
    fn test_gripper_increase_wins_tie() {
        let arm = controller();
        let mut state = arm.initial_state();
        let command = arm.update(&mut state, &holding(&[ButtonId::Circle, ButtonId::Square]));
        assert_eq!(command.gripper, 92);
    }

    #[test]
    fn test_gripper_respects_custom_limits() {
        let mut config = ArmConfig::default();
        config.gripper = JointConfig {
            min_angle: 40,
            max_angle: 100,
            initial_angle: 90,
        };
        let arm = ArmController::new(config);
        let mut state = arm.initial_state();
        for _ in 0..20 {
            arm.update(&mut state, &holding(&[ButtonId::Circle]));
        }
        assert_eq!(state.gripper.angle(), 100);
        for _ in 0..50 {
            arm.update(&mut state, &holding(&[ButtonId::Square]));
        }
        assert_eq!(state.gripper.angle(), 40);
    }

    #[test]
    fn test_gripper_with_swapped_limits_stays_in_range() {
        let mut config = ArmConfig::default();
        config.gripper = JointConfig {
            min_angle: 150,
            max_angle: 30,
            initial_angle: 90,
        };
        let arm = ArmController::new(config);
        let mut state = arm.initial_state();
        assert_eq!(state.gripper.angle(), 90);

        for _ in 0..100 {
            arm.update(&mut state, &holding(&[ButtonId::Circle]));
        }
        assert_eq!(state.gripper.angle(), 150);
        for _ in 0..100 {
            arm.update(&mut state, &holding(&[ButtonId::Square]));
        }
        assert_eq!(state.gripper.angle(), 30);
    }

    #[test]
    fn test_rebound_buttons() {
        let mut config = ArmConfig::default();
        config.lift_buttons = ButtonPairConfig {
            increase: ButtonId::R1,
            decrease: ButtonId::R2,
        };
        let arm = ArmController::new(config);
        let mut state = arm.initial_state();

        assert_eq!(arm.update(&mut state, &holding(&[ButtonId::Triangle])).vertical_lift, 90);
        assert_eq!(arm.update(&mut state, &holding(&[ButtonId::R2])).vertical_lift, 87);
    }

    // ==================== Accessors ====================

    #[test]
    fn test_joint_accessors_agree() {
        let arm = controller();
        let mut state = arm.initial_state();
        let command = arm.update(&mut state, &holding(&[ButtonId::Triangle]));
        for joint in Joint::ALL {
            assert_eq!(state.joint(joint).angle(), command.angle(joint));
        }
    }
}
