use alloc::{
    format,
    rc::{Rc, Weak},
    string::String,
};
use core::{
    cell::{Cell, RefCell},
    ops::ControlFlow,
    time::Duration,
};

use bon::Builder;
use log::{info, warn};

use super::{
    fusion::{fuse, LocalDelta, OdomState, TickSample, WheelDelta},
    odom_wheels::TrackingWheel,
};
use crate::{
    devices::InertialSource,
    drive::pose::Pose,
    runtime::{PeriodicTask, Runtime},
};

/// The sensors odometry reads. Any of them may be missing.
///
/// This only bundles shared handles. Cloning it shares the same devices.
#[derive(Clone, Default)]
pub struct OdomSensors {
    pub left: Option<Rc<RefCell<TrackingWheel>>>,
    pub right: Option<Rc<RefCell<TrackingWheel>>>,
    pub back: Option<Rc<RefCell<TrackingWheel>>>,
    pub imu: Option<Rc<RefCell<dyn InertialSource>>>,
}

impl OdomSensors {
    pub fn new(
        left: Option<TrackingWheel>,
        right: Option<TrackingWheel>,
        back: Option<TrackingWheel>,
        imu: Option<Rc<RefCell<dyn InertialSource>>>,
    ) -> Self {
        let share = |wheel: Option<TrackingWheel>| wheel.map(|wheel| Rc::new(RefCell::new(wheel)));
        Self {
            left: share(left),
            right: share(right),
            back: share(back),
            imu,
        }
    }

    pub fn wheels(&self) -> impl Iterator<Item = &Rc<RefCell<TrackingWheel>>> {
        [&self.left, &self.right, &self.back].into_iter().flatten()
    }
}

/// Timing of the odometry tasks.
#[derive(Clone, Copy, Debug, PartialEq, Builder)]
pub struct OdometryConfig {
    /// Period of the fusion tick. Velocities assume ticks arrive at this rate.
    #[builder(default = Duration::from_millis(10))]
    pub tick_period: Duration,

    /// Period of the telemetry record. Zero disables telemetry.
    #[builder(default = Duration::from_millis(200))]
    pub telemetry_period: Duration,

    /// Weight of history in the velocity filters, in `[0, 1)`.
    #[builder(default = 0.95)]
    pub velocity_smoothing: f64,
}

/// Shortest tick period odometry will run at.
const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

impl Default for OdometryConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Owns the fused pose and velocity of the robot.
///
/// The update task is the only regular writer of the state. Everything else
/// reads snapshots, or writes the pose through [`Odometry::set_pose`]. The
/// state is never borrowed across an await so readers on the same executor
/// always see a whole tick.
pub struct Odometry<R: Runtime> {
    runtime: R,
    config: OdometryConfig,
    sensors: RefCell<OdomSensors>,
    state: RefCell<OdomState>,
    prev_imu_rotation: Cell<Option<f64>>,
    tracker: RefCell<PeriodicTask<R>>,
    telemetry: RefCell<PeriodicTask<R>>,
}

impl<R: Runtime> Odometry<R> {
    /// A tick period below one millisecond is raised to one millisecond.
    pub fn new(runtime: R, mut config: OdometryConfig) -> Self {
        if config.tick_period < MIN_TICK_PERIOD {
            warn!(
                "Odometry tick period {:?} is too short, using {:?}",
                config.tick_period, MIN_TICK_PERIOD
            );
            config.tick_period = MIN_TICK_PERIOD;
        }
        Self {
            runtime,
            config,
            sensors: RefCell::new(OdomSensors::default()),
            state: RefCell::new(OdomState::default()),
            prev_imu_rotation: Cell::new(None),
            tracker: RefCell::new(PeriodicTask::new("odometry", config.tick_period)),
            telemetry: RefCell::new(PeriodicTask::new(
                "odometry telemetry",
                config.telemetry_period,
            )),
        }
    }

    pub fn config(&self) -> &OdometryConfig {
        &self.config
    }

    /// Register the sensors to read. Readings accumulated before this are discarded.
    pub fn set_sensors(&self, sensors: OdomSensors) {
        for wheel in sensors.wheels() {
            wheel.borrow_mut().travel_delta();
        }
        self.prev_imu_rotation.set(
            sensors
                .imu
                .as_ref()
                .and_then(|imu| imu.borrow().rotation().ok()),
        );
        *self.sensors.borrow_mut() = sensors;
    }

    pub fn sensors(&self) -> OdomSensors {
        self.sensors.borrow().clone()
    }

    /// Start the update task, and the telemetry task if it has a period.
    ///
    /// Returns `false` if the update task was already running.
    pub fn init(self: &Rc<Self>) -> bool {
        let started = self.tracker.borrow_mut().start(&self.runtime, {
            let odometry = Rc::downgrade(self);
            move || {
                with_live(&odometry, |odometry| {
                    odometry.update();
                })
            }
        });
        if !self.config.telemetry_period.is_zero() {
            self.telemetry.borrow_mut().start(&self.runtime, {
                let odometry = Rc::downgrade(self);
                move || {
                    with_live(&odometry, |odometry| {
                        info!(target: "odometry::telemetry", "{}", odometry.telemetry_line());
                    })
                }
            });
        }
        started
    }

    pub fn stop(&self) {
        self.tracker.borrow_mut().stop();
        self.telemetry.borrow_mut().stop();
    }

    pub fn is_running(&self) -> bool {
        self.tracker.borrow().is_running()
    }

    /// Read every sensor once, consuming this tick's wheel deltas.
    pub fn sample(&self) -> TickSample {
        let sensors = self.sensors.borrow();
        let read_wheel = |wheel: &Option<Rc<RefCell<TrackingWheel>>>| {
            let mut wheel = wheel.as_ref()?.borrow_mut();
            if !wheel.has_sensor() {
                return None;
            }
            Some(WheelDelta::new(wheel.travel_delta(), wheel.offset()))
        };
        let inertial = sensors.imu.as_ref().and_then(|imu| match imu.borrow().rotation() {
            Ok(rotation) => self
                .prev_imu_rotation
                .replace(Some(rotation))
                .map(|previous| (rotation - previous).to_radians()),
            Err(error) => {
                warn!("Inertial read failed: {error}");
                None
            }
        });
        TickSample {
            left: read_wheel(&sensors.left),
            right: read_wheel(&sensors.right),
            back: read_wheel(&sensors.back),
            inertial,
        }
    }

    /// Run one fusion tick. Meant to be driven by the update task only.
    pub fn update(&self) -> LocalDelta {
        let sample = self.sample();
        let local = fuse(&sample);
        self.state.borrow_mut().integrate(
            &local,
            self.config.tick_period.as_secs_f64(),
            self.config.velocity_smoothing,
        );
        local
    }

    pub fn state(&self) -> OdomState {
        *self.state.borrow()
    }

    pub fn pose(&self, radians: bool) -> Pose {
        let pose = self.state.borrow().pose;
        if radians {
            pose
        } else {
            pose.to_degrees()
        }
    }

    pub fn set_pose(&self, pose: Pose, radians: bool) {
        self.state.borrow_mut().pose = if radians { pose } else { pose.to_radians() };
    }

    /// Global frame velocity per second.
    pub fn speed(&self, radians: bool) -> Pose {
        let speed = self.state.borrow().speed;
        if radians {
            speed
        } else {
            speed.to_degrees()
        }
    }

    /// Robot frame velocity per second, `x` to the right and `y` forward.
    pub fn local_speed(&self, radians: bool) -> Pose {
        let speed = self.state.borrow().local_speed;
        if radians {
            speed
        } else {
            speed.to_degrees()
        }
    }

    /// Where the robot will be after `time` if it keeps its current velocity.
    pub fn estimate_pose(&self, time: Duration, radians: bool) -> Pose {
        let pose = self.state.borrow().extrapolate(time.as_secs_f64());
        if radians {
            pose
        } else {
            pose.to_degrees()
        }
    }

    pub fn telemetry_line(&self) -> String {
        let pose = self.pose(false);
        format!("POS:{:.2},{:.2} ROT:{:.2}", pose.x(), pose.y(), pose.orientation)
    }
}

fn with_live<T>(weak: &Weak<T>, tick: impl FnOnce(&T)) -> ControlFlow<()> {
    match weak.upgrade() {
        Some(strong) => {
            tick(&strong);
            ControlFlow::Continue(())
        }
        None => ControlFlow::Break(()),
    }
}
