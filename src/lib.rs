//! Odometry and chassis control for VEX V5 robots.
//!
//! Tracking wheels and an optional inertial sensor are fused into a field pose
//! by [`tracking::odom::Odometry`], and [`drive::Chassis`] turns drive inputs
//! and autonomous commands into motor power on top of that pose.

#![cfg_attr(not(test), no_std)]
extern crate alloc;

#[macro_use]
pub mod utils;

pub mod devices;
pub mod drive;
pub mod error;
pub mod runtime;
pub mod tracking;

#[cfg(target_os = "vexos")]
pub mod logger;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ChassisError, DeviceError, Result};
