//! Pose math, drivetrain mixing and the chassis facade.

pub mod chassis;
pub mod commands;
pub mod drivetrain;
pub mod motions;
pub mod pose;

pub use chassis::{CalibrationReport, Chassis};
pub use commands::{Command, CommandKind, CommandRecord};
pub use drivetrain::{Drivetrain, MotorConfig};
pub use pose::Pose;
