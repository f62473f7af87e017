//! Host side doubles for the hardware and scheduler seams.

use alloc::{boxed::Box, rc::Rc, vec::Vec};
use core::{
    cell::{Cell, RefCell},
    future::Future,
    pin::{pin, Pin},
    task::{Context, Poll, Waker},
    time::Duration,
};

use crate::{
    devices::{
        BrakeMode, CalibrationStatus, GripperAction, InertialSource, Manipulator, MotorOutput,
        RotationSource,
    },
    error::DeviceError,
    runtime::{Runtime, TaskHandle},
};

/// Poll a future until it completes.
pub fn block_on<F: Future>(future: F) -> F::Output {
    let mut future = pin!(future);
    let mut cx = Context::from_waker(Waker::noop());
    for _ in 0..1_000_000 {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
    }
    panic!("future never completed");
}

#[derive(Default)]
struct MockTaskState {
    cancelled: Cell<bool>,
    finished: Cell<bool>,
}

pub struct MockTask {
    state: Rc<MockTaskState>,
}

impl TaskHandle for MockTask {
    fn cancel(self) {
        self.state.cancelled.set(true);
    }
    fn is_finished(&self) -> bool {
        self.state.cancelled.get() || self.state.finished.get()
    }
}

struct TaskSlot {
    future: Option<Pin<Box<dyn Future<Output = ()>>>>,
    state: Rc<MockTaskState>,
}

#[derive(Default)]
struct MockRuntimeInner {
    clock: Cell<Duration>,
    spawned: Cell<usize>,
    tasks: RefCell<Vec<TaskSlot>>,
    sleep_hook: RefCell<Option<Box<dyn FnMut(Duration)>>>,
}

/// A manually stepped runtime with a virtual clock.
///
/// Every sleep advances the clock by its duration and yields once. Spawned
/// tasks only run when [`MockRuntime::run_tasks`] is called.
#[derive(Clone, Default)]
pub struct MockRuntime {
    inner: Rc<MockRuntimeInner>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawned(&self) -> usize {
        self.inner.spawned.get()
    }

    /// Called with the sleep duration each time anything sleeps.
    pub fn on_sleep(&self, hook: impl FnMut(Duration) + 'static) {
        *self.inner.sleep_hook.borrow_mut() = Some(Box::new(hook));
    }

    /// Poll every live task once per round.
    pub fn run_tasks(&self, rounds: usize) {
        let mut cx = Context::from_waker(Waker::noop());
        for _ in 0..rounds {
            let count = self.inner.tasks.borrow().len();
            for index in 0..count {
                let (future, state) = {
                    let mut tasks = self.inner.tasks.borrow_mut();
                    let slot = &mut tasks[index];
                    (slot.future.take(), slot.state.clone())
                };
                let Some(mut future) = future else {
                    continue;
                };
                if state.cancelled.get() {
                    continue;
                }
                match future.as_mut().poll(&mut cx) {
                    Poll::Ready(()) => state.finished.set(true),
                    Poll::Pending => self.inner.tasks.borrow_mut()[index].future = Some(future),
                }
            }
        }
    }
}

struct MockSleep {
    runtime: MockRuntime,
    duration: Duration,
    started: bool,
}

impl Future for MockSleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.started {
            return Poll::Ready(());
        }
        self.started = true;
        let inner = &self.runtime.inner;
        inner.clock.set(inner.clock.get() + self.duration);
        if let Some(hook) = inner.sleep_hook.borrow_mut().as_mut() {
            hook(self.duration);
        }
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

impl Runtime for MockRuntime {
    type Task = MockTask;

    fn spawn<F: Future<Output = ()> + 'static>(&self, future: F) -> MockTask {
        let state = Rc::new(MockTaskState::default());
        self.inner.spawned.set(self.inner.spawned.get() + 1);
        self.inner.tasks.borrow_mut().push(TaskSlot {
            future: Some(Box::pin(future)),
            state: state.clone(),
        });
        MockTask { state }
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        MockSleep {
            runtime: self.clone(),
            duration,
            started: false,
        }
    }

    fn now(&self) -> Duration {
        self.inner.clock.get()
    }
}

/// A rotation sensor whose position the test sets directly.
#[derive(Default)]
pub struct MockRotation {
    pub position: i32,
    pub disconnected: bool,
    pub resets: usize,
}

impl MockRotation {
    pub fn shared() -> Rc<RefCell<MockRotation>> {
        Rc::new(RefCell::new(Self::default()))
    }
}

impl RotationSource for MockRotation {
    fn reset_position(&mut self) -> Result<(), DeviceError> {
        self.resets += 1;
        self.position = 0;
        Ok(())
    }
    fn raw_position(&self) -> Result<i32, DeviceError> {
        if self.disconnected {
            Err(DeviceError::Disconnected)
        } else {
            Ok(self.position)
        }
    }
}

/// An inertial sensor that becomes valid after a set number of resets.
pub struct MockInertial {
    pub rotation: f64,
    pub disconnected: bool,
    pub resets: usize,
    /// Reset count from which heading reads are finite. `None` never calibrates.
    pub valid_from_reset: Option<usize>,
    /// Status polls reported as calibrating after each reset.
    pub calibrating_polls: usize,
    remaining_polls: Cell<usize>,
    pub status_polls: Cell<usize>,
}

impl MockInertial {
    pub fn new(valid_from_reset: Option<usize>) -> Self {
        Self {
            rotation: 0.0,
            disconnected: false,
            resets: 0,
            valid_from_reset,
            calibrating_polls: 3,
            remaining_polls: Cell::new(0),
            status_polls: Cell::new(0),
        }
    }
    pub fn shared(valid_from_reset: Option<usize>) -> Rc<RefCell<MockInertial>> {
        Rc::new(RefCell::new(Self::new(valid_from_reset)))
    }
}

impl InertialSource for MockInertial {
    fn reset(&mut self) -> Result<(), DeviceError> {
        self.resets += 1;
        self.remaining_polls.set(self.calibrating_polls);
        Ok(())
    }
    fn heading(&self) -> Result<f64, DeviceError> {
        match self.valid_from_reset {
            Some(valid) if self.resets >= valid => Ok(0.0),
            _ => Ok(f64::NAN),
        }
    }
    fn rotation(&self) -> Result<f64, DeviceError> {
        if self.disconnected {
            Err(DeviceError::Disconnected)
        } else {
            Ok(self.rotation)
        }
    }
    fn calibration_status(&self) -> CalibrationStatus {
        self.status_polls.set(self.status_polls.get() + 1);
        let remaining = self.remaining_polls.get();
        if remaining > 0 {
            self.remaining_polls.set(remaining - 1);
            CalibrationStatus::Calibrating
        } else {
            CalibrationStatus::Ready
        }
    }
}

/// A motor group that records every power it was given.
#[derive(Default)]
pub struct MockMotor {
    pub power: f64,
    pub history: Vec<f64>,
    pub brake_mode: BrakeMode,
}

impl MockMotor {
    pub fn shared() -> Rc<RefCell<MockMotor>> {
        Rc::new(RefCell::new(Self::default()))
    }
}

impl MotorOutput for MockMotor {
    fn set_power(&mut self, power: f64) {
        self.power = power;
        self.history.push(power);
    }
    fn set_brake_mode(&mut self, mode: BrakeMode) {
        self.brake_mode = mode;
    }
}

/// Records the actions it was asked to perform.
#[derive(Default)]
pub struct MockManipulator {
    pub performed: Rc<RefCell<Vec<GripperAction>>>,
}

#[async_trait::async_trait(?Send)]
impl Manipulator for MockManipulator {
    async fn perform(&self, action: GripperAction) -> Result<(), DeviceError> {
        self.performed.borrow_mut().push(action);
        Ok(())
    }
}
