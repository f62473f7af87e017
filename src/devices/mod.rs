//! Hardware seams.
//!
//! The localization and chassis code only ever talks to these traits. On the
//! robot they are implemented for the vexide devices; under test they are
//! implemented by in-memory mocks.

use alloc::boxed::Box;

use crate::error::DeviceError;

#[cfg(target_os = "vexos")]
pub mod motor_group;
#[cfg(target_os = "vexos")]
pub mod vex;

/// A sensor that reports the rotation of a shaft.
pub trait RotationSource {
    /// Zero the internal position counter.
    fn reset_position(&mut self) -> Result<(), DeviceError>;

    /// Raw shaft position in centidegrees (36000 per revolution).
    fn raw_position(&self) -> Result<i32, DeviceError>;
}

/// Calibration state reported by an inertial sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStatus {
    Calibrating,
    Error,
    Ready,
}

/// An inertial sensor able to report heading.
pub trait InertialSource {
    /// Restart calibration. The sensor reports [`CalibrationStatus::Calibrating`] until done.
    fn reset(&mut self) -> Result<(), DeviceError>;

    /// Heading in degrees. May be NaN or infinite while the sensor is uncalibrated.
    fn heading(&self) -> Result<f64, DeviceError>;

    /// Accumulated rotation in degrees, counterclockwise positive and unbounded.
    fn rotation(&self) -> Result<f64, DeviceError>;

    fn calibration_status(&self) -> CalibrationStatus;
}

/// How a motor behaves when no power is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrakeMode {
    #[default]
    Coast,
    Brake,
    Hold,
}

/// A group of motors driven together.
pub trait MotorOutput {
    /// Normalized power in `[-1.0, 1.0]`.
    fn set_power(&mut self, power: f64);
    fn set_brake_mode(&mut self, mode: BrakeMode);
}

/// A gripper style action a manipulator can carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GripperAction {
    PickUp,
    Place,
    Scoop,
    Release,
    Clasp,
}

impl GripperAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PickUp => "pick up",
            Self::Place => "place",
            Self::Scoop => "scoop",
            Self::Release => "release",
            Self::Clasp => "clasp",
        }
    }
}

/// A mechanism that carries out gripper actions.
///
/// Actions may take time, so they are async. Implementations should not hold
/// borrows of shared devices across await points.
#[async_trait::async_trait(?Send)]
pub trait Manipulator {
    async fn perform(&self, action: GripperAction) -> Result<(), DeviceError>;
}
