use alloc::vec::Vec;

use vexide::devices::smart::motor::{BrakeMode as VexBrakeMode, Motor};

use super::{BrakeMode, MotorOutput};

/// Several motors on one gearbox, driven with the same power.
pub struct MotorGroup {
    motors: Vec<Motor>,
    brake_mode: BrakeMode,
}

impl MotorGroup {
    pub fn new(motors: Vec<Motor>) -> Self {
        Self {
            motors,
            brake_mode: BrakeMode::Coast,
        }
    }
    /// Voltage is scaled per motor so V5 and EXP motors share one power range.
    pub fn set_voltage_all(&mut self, power: f64) {
        for motor in self.motors.iter_mut() {
            let _ = motor.set_voltage(power * motor.max_voltage());
        }
    }
    fn brake_all(&mut self) {
        let mode = match self.brake_mode {
            BrakeMode::Coast => VexBrakeMode::Coast,
            BrakeMode::Brake => VexBrakeMode::Brake,
            BrakeMode::Hold => VexBrakeMode::Hold,
        };
        for motor in self.motors.iter_mut() {
            let _ = motor.brake(mode);
        }
    }
}

impl MotorOutput for MotorGroup {
    fn set_power(&mut self, power: f64) {
        let power = power.clamp(-1.0, 1.0);
        if power == 0.0 {
            self.brake_all();
        } else {
            self.set_voltage_all(power);
        }
    }
    fn set_brake_mode(&mut self, mode: BrakeMode) {
        self.brake_mode = mode;
    }
}
