use alloc::{boxed::Box, collections::VecDeque, rc::Rc};
use core::{cell::RefCell, time::Duration};

use bon::bon;
use log::{debug, error, info, warn};

use super::{
    commands::{Command, CommandRecord},
    drivetrain::{field_to_robot, Drivetrain},
    motions::{MotionHandler, MoveSettings},
    pose::Pose,
};
use crate::{
    devices::{BrakeMode, CalibrationStatus, GripperAction, InertialSource, Manipulator},
    error::{ChassisError, Result, WheelSide},
    runtime::Runtime,
    tracking::odom::{OdomSensors, Odometry, OdometryConfig},
};

const CALIBRATION_ATTEMPTS: usize = 5;
const CALIBRATION_POLL: Duration = Duration::from_millis(10);
/// Three seconds of polling before an attempt is given up.
const CALIBRATION_POLL_LIMIT: usize = 300;

/// What happened to the inertial sensor during [`Chassis::calibrate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationReport {
    /// Calibrated on the given attempt.
    Calibrated { attempts: usize },
    /// Every attempt failed. Odometry runs on tracking wheels alone.
    Disabled { attempts: usize },
    /// Calibration was not requested.
    Skipped,
    /// No inertial sensor is configured.
    NoInertial,
}

pub struct Chassis<R: Runtime> {
    pub(crate) runtime: R,
    pub(crate) drivetrain: Drivetrain,
    sensors: OdomSensors,
    pub(crate) odometry: Rc<Odometry<R>>,
    manipulator: Option<Box<dyn Manipulator>>,
    pub(crate) motion_handler: MotionHandler,
    pub(crate) move_settings: MoveSettings,
    commands: RefCell<VecDeque<Command>>,
}

#[bon]
impl<R: Runtime> Chassis<R> {
    #[builder]
    pub fn new(
        runtime: R,
        drivetrain: Drivetrain,
        sensors: OdomSensors,
        #[builder(default)] odometry_config: OdometryConfig,
        manipulator: Option<Box<dyn Manipulator>>,
        #[builder(default)] move_settings: MoveSettings,
    ) -> Self {
        Self {
            odometry: Rc::new(Odometry::new(runtime.clone(), odometry_config)),
            runtime,
            drivetrain,
            sensors,
            manipulator,
            motion_handler: MotionHandler::new(),
            move_settings,
            commands: RefCell::new(VecDeque::new()),
        }
    }
}

impl<R: Runtime> Chassis<R> {
    pub fn odometry(&self) -> &Rc<Odometry<R>> {
        &self.odometry
    }

    pub fn sensors(&self) -> &OdomSensors {
        &self.sensors
    }

    pub fn drivetrain(&self) -> &Drivetrain {
        &self.drivetrain
    }

    /// Calibrate the inertial sensor, zero the tracking wheels and start odometry.
    ///
    /// An inertial sensor that fails every attempt is dropped and odometry falls
    /// back to the tracking wheels. A missing left or right tracking wheel is an
    /// error; a missing back wheel is not.
    pub async fn calibrate(&mut self, calibrate_imu: bool) -> Result<CalibrationReport> {
        let report = match self.sensors.imu.clone() {
            None => CalibrationReport::NoInertial,
            Some(_) if !calibrate_imu => CalibrationReport::Skipped,
            Some(imu) => self.calibrate_inertial(&imu).await,
        };
        if let CalibrationReport::Disabled { .. } = report {
            self.sensors.imu = None;
        }

        if self.sensors.left.is_none() {
            return Err(ChassisError::MissingTrackingWheel(WheelSide::Left));
        }
        if self.sensors.right.is_none() {
            return Err(ChassisError::MissingTrackingWheel(WheelSide::Right));
        }
        if self.sensors.back.is_none() {
            info!("No back tracking wheel, sideways motion will not be tracked");
        }
        for wheel in self.sensors.wheels() {
            wheel.borrow_mut().reset();
        }

        self.odometry.set_sensors(self.sensors.clone());
        self.odometry.init();
        info!("Chassis calibrated: {report:?}");
        Ok(report)
    }

    async fn calibrate_inertial(&self, imu: &Rc<RefCell<dyn InertialSource>>) -> CalibrationReport {
        for attempt in 1..=CALIBRATION_ATTEMPTS {
            if let Err(error) = imu.borrow_mut().reset() {
                warn!("Inertial reset failed: {error}");
            }
            for _ in 0..CALIBRATION_POLL_LIMIT {
                self.runtime.sleep(CALIBRATION_POLL).await;
                let status = imu.borrow().calibration_status();
                if status != CalibrationStatus::Calibrating {
                    break;
                }
            }
            let heading = imu.borrow().heading();
            if heading.is_ok_and(f64::is_finite) {
                return CalibrationReport::Calibrated { attempts: attempt };
            }
            warn!("Inertial sensor failed to calibrate, attempt #{attempt}");
        }
        error!("Inertial calibration failed, falling back to tracking wheels");
        CalibrationReport::Disabled {
            attempts: CALIBRATION_ATTEMPTS,
        }
    }

    pub fn pose(&self, radians: bool) -> Pose {
        self.odometry.pose(radians)
    }

    pub fn set_pose(&self, pose: Pose, radians: bool) {
        self.odometry.set_pose(pose, radians);
    }

    pub fn speed(&self, radians: bool) -> Pose {
        self.odometry.speed(radians)
    }

    pub fn local_speed(&self, radians: bool) -> Pose {
        self.odometry.local_speed(radians)
    }

    pub fn estimate_pose(&self, time: Duration, radians: bool) -> Pose {
        self.odometry.estimate_pose(time, radians)
    }

    /// Zero the position while keeping the heading.
    pub fn reset_local_position(&self) {
        let heading = self.odometry.pose(true).orientation;
        self.odometry.set_pose(Pose::new(0.0, 0.0, heading), true);
    }

    /// Drive with normalized powers. `turn` is clockwise positive.
    ///
    /// With `field_centric`, `horizontal` and `vertical` are field axes and are
    /// rotated into the robot frame using the current heading.
    pub fn drive(&self, horizontal: f64, vertical: f64, turn: f64, field_centric: bool) {
        let (horizontal, vertical) = if field_centric {
            field_to_robot(horizontal, vertical, self.odometry.pose(true).orientation)
        } else {
            (horizontal, vertical)
        };
        self.drivetrain.drive(horizontal, vertical, turn);
    }

    pub fn set_brake_mode(&self, mode: BrakeMode) {
        self.drivetrain.set_brake_mode(mode);
    }

    pub fn add_command(&self, command: Command) {
        self.commands.borrow_mut().push_back(command);
    }

    pub fn queued_commands(&self) -> usize {
        self.commands.borrow().len()
    }

    /// Run queued commands in order until the queue is empty.
    ///
    /// A failing command is logged and the queue carries on. Returns how many
    /// commands ran.
    pub async fn execute_commands(&self) -> usize {
        let mut executed = 0;
        loop {
            let next = self.commands.borrow_mut().pop_front();
            let Some(command) = next else {
                break;
            };
            if let Err(error) = self.execute(command).await {
                warn!("Command {command:?} failed: {error}");
            }
            executed += 1;
        }
        executed
    }

    /// Run a path exported as flat records, skipping records that do not decode.
    ///
    /// Stops early if [`Chassis::cancel_all_motions`] is called. Returns how
    /// many commands ran.
    pub async fn follow_path(&self, path: &[CommandRecord]) -> usize {
        let generation = self.motion_handler.generation();
        let mut executed = 0;
        for (index, record) in path.iter().enumerate() {
            if self.motion_handler.generation() != generation {
                info!("Path cancelled after {executed} commands");
                break;
            }
            let command = match Command::try_from(record) {
                Ok(command) => command,
                Err(error) => {
                    error!("Skipping path entry {index}: {error}");
                    continue;
                }
            };
            if let Err(error) = self.execute(command).await {
                warn!("Path entry {index} failed: {error}");
            }
            executed += 1;
        }
        executed
    }

    pub async fn execute(&self, command: Command) -> Result<()> {
        debug!("Executing {command:?}");
        let action = match command {
            Command::MoveWithHeading {
                x,
                y,
                heading,
                speed,
            } => {
                self.move_with_heading()
                    .x(x)
                    .y(y)
                    .heading(heading)
                    .speed(speed)
                    .call()
                    .await;
                return Ok(());
            }
            Command::PickUp => GripperAction::PickUp,
            Command::Place => GripperAction::Place,
            Command::Scoop => GripperAction::Scoop,
            Command::Release => GripperAction::Release,
            Command::Clasp => GripperAction::Clasp,
        };
        let manipulator = self
            .manipulator
            .as_ref()
            .ok_or(ChassisError::NoManipulator(action.name()))?;
        manipulator.perform(action).await?;
        Ok(())
    }

    pub fn is_in_motion(&self) -> bool {
        self.motion_handler.in_motion()
    }

    /// Stop the running motion at its next iteration.
    pub fn cancel_motion(&self) {
        self.motion_handler.cancel_motion();
    }

    /// Stop the running motion and drop every queued command.
    pub fn cancel_all_motions(&self) {
        self.commands.borrow_mut().clear();
        self.motion_handler.cancel_all_motions();
    }
}
