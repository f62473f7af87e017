use alloc::{rc::Rc, vec, vec::Vec};
use core::cell::RefCell;

use nalgebra::{Rotation2, Vector2};

use crate::devices::{BrakeMode, MotorOutput};

/// One motor group and how much each drive axis contributes to its power.
#[derive(Clone)]
pub struct MotorConfig {
    pub motors: Rc<RefCell<dyn MotorOutput>>,
    pub horizontal: f64,
    pub vertical: f64,
    pub turn: f64,
}

impl MotorConfig {
    pub fn new(motors: Rc<RefCell<dyn MotorOutput>>, horizontal: f64, vertical: f64, turn: f64) -> Self {
        Self {
            motors,
            horizontal,
            vertical,
            turn,
        }
    }

    pub fn output(&self, horizontal: f64, vertical: f64, turn: f64) -> f64 {
        horizontal * self.horizontal + vertical * self.vertical + turn * self.turn
    }
}

/// Maps the three drive axes onto motor groups through a fixed coefficient table.
///
/// Axes are normalized powers: `horizontal` strafes right, `vertical` drives
/// forward and `turn` rotates clockwise.
pub struct Drivetrain {
    configs: Vec<MotorConfig>,
}

impl Drivetrain {
    pub fn new(configs: Vec<MotorConfig>) -> Self {
        Self { configs }
    }

    pub fn tank(left: Rc<RefCell<dyn MotorOutput>>, right: Rc<RefCell<dyn MotorOutput>>) -> Self {
        Self::new(vec![
            MotorConfig::new(left, 0.0, 1.0, 1.0),
            MotorConfig::new(right, 0.0, 1.0, -1.0),
        ])
    }

    pub fn x_drive(
        front_left: Rc<RefCell<dyn MotorOutput>>,
        front_right: Rc<RefCell<dyn MotorOutput>>,
        back_left: Rc<RefCell<dyn MotorOutput>>,
        back_right: Rc<RefCell<dyn MotorOutput>>,
    ) -> Self {
        Self::new(vec![
            MotorConfig::new(front_left, 1.0, 1.0, 1.0),
            MotorConfig::new(front_right, -1.0, 1.0, -1.0),
            MotorConfig::new(back_left, -1.0, 1.0, 1.0),
            MotorConfig::new(back_right, 1.0, 1.0, -1.0),
        ])
    }

    pub fn configs(&self) -> &[MotorConfig] {
        &self.configs
    }

    /// Power for each motor group, in configuration order.
    pub fn outputs(&self, horizontal: f64, vertical: f64, turn: f64) -> Vec<f64> {
        self.configs
            .iter()
            .map(|config| config.output(horizontal, vertical, turn))
            .collect()
    }

    pub fn drive(&self, horizontal: f64, vertical: f64, turn: f64) {
        for config in &self.configs {
            let power = config.output(horizontal, vertical, turn);
            config.motors.borrow_mut().set_power(power);
        }
    }

    pub fn stop(&self) {
        self.drive(0.0, 0.0, 0.0);
    }

    pub fn set_brake_mode(&self, mode: BrakeMode) {
        for config in &self.configs {
            config.motors.borrow_mut().set_brake_mode(mode);
        }
    }
}

/// Rotate a field frame `(horizontal, vertical)` input into the robot frame.
///
/// `heading` is the robot heading in radians, counterclockwise positive.
pub fn field_to_robot(horizontal: f64, vertical: f64, heading: f64) -> (f64, f64) {
    let local = Rotation2::new(-heading) * Vector2::new(horizontal, vertical);
    (local.x, local.y)
}
