//! [`RotationSource`], [`InertialSource`] and [`Manipulator`] for the V5 devices.

use alloc::{boxed::Box, format, rc::Rc};
use core::cell::RefCell;

use vexide::{
    devices::{
        adi::digital::LogicLevel,
        smart::{InertialSensor, RotationSensor, SmartDevice},
    },
    prelude::AdiDigitalOut,
};

use super::{CalibrationStatus, GripperAction, InertialSource, Manipulator, RotationSource};
use crate::error::DeviceError;

fn reported<E: core::fmt::Debug>(error: E) -> DeviceError {
    DeviceError::Reported(format!("{error:?}"))
}

impl RotationSource for RotationSensor {
    fn reset_position(&mut self) -> Result<(), DeviceError> {
        RotationSensor::reset_position(self).map_err(reported)
    }

    fn raw_position(&self) -> Result<i32, DeviceError> {
        let position = self.position().map_err(reported)?;
        Ok((position.as_degrees() * 100.0) as i32)
    }
}

/// An inertial sensor plus the scale applied to its rotation.
pub struct V5Inertial {
    sensor: InertialSensor,
    /// Use larger values to make the imu return a higher value.
    scalar: f64,
}

impl V5Inertial {
    pub fn new(sensor: InertialSensor, scalar: f64) -> Self {
        Self { sensor, scalar }
    }
}

impl InertialSource for V5Inertial {
    fn reset(&mut self) -> Result<(), DeviceError> {
        // The sdk reset starts calibration without awaiting it, the chassis polls status.
        let port = self.sensor.port_number();
        unsafe {
            let device = vex_sdk::vexDeviceGetByIndex(u32::from(port) - 1);
            vex_sdk::vexDeviceImuReset(device);
        }
        Ok(())
    }

    fn heading(&self) -> Result<f64, DeviceError> {
        self.sensor.heading().map_err(reported)
    }

    fn rotation(&self) -> Result<f64, DeviceError> {
        // V5 rotation is clockwise positive.
        self.sensor
            .rotation()
            .map(|rotation| -rotation * self.scalar)
            .map_err(reported)
    }

    fn calibration_status(&self) -> CalibrationStatus {
        match self.sensor.is_calibrating() {
            Ok(true) => CalibrationStatus::Calibrating,
            Ok(false) => CalibrationStatus::Ready,
            Err(_) => CalibrationStatus::Error,
        }
    }
}

/// A single acting pneumatic claw.
///
/// Closing actions drive the solenoid high and opening actions drive it low.
pub struct PneumaticClaw {
    solenoid: Rc<RefCell<AdiDigitalOut>>,
}

impl PneumaticClaw {
    pub fn new(solenoid: Rc<RefCell<AdiDigitalOut>>) -> Self {
        Self { solenoid }
    }
}

#[async_trait::async_trait(?Send)]
impl Manipulator for PneumaticClaw {
    async fn perform(&self, action: GripperAction) -> Result<(), DeviceError> {
        let level = match action {
            GripperAction::Clasp | GripperAction::PickUp | GripperAction::Scoop => LogicLevel::High,
            GripperAction::Release | GripperAction::Place => LogicLevel::Low,
        };
        self.solenoid.borrow_mut().set_level(level).map_err(reported)
    }
}
