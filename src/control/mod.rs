//! # Control Module
//!
//! Turns controller snapshots into actuator commands.
//!
//! This module handles:
//! - Left stick to differential-drive wheel commands
//! - Right stick and face buttons to bounded arm joint steps
//! - The fixed-period loop sequencing poll, mapping and actuation

pub mod arm;
pub mod control_loop;
pub mod drive;
pub mod interpolate;
