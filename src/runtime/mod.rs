//! Cooperative scheduling seams and the supervised periodic task.

use core::{future::Future, ops::ControlFlow, time::Duration};

use log::{debug, info};

#[cfg(target_os = "vexos")]
pub mod vex;

/// A handle to a spawned task.
pub trait TaskHandle {
    /// Stop the task at its next suspension point.
    fn cancel(self);
    fn is_finished(&self) -> bool;
}

/// The scheduler the chassis and odometry run on.
///
/// All tasks share one thread and only yield at await points, so state borrowed
/// between two awaits is never observed half written by another task.
pub trait Runtime: Clone + 'static {
    type Task: TaskHandle;

    fn spawn<F: Future<Output = ()> + 'static>(&self, future: F) -> Self::Task;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;

    /// Monotonic time since the runtime was created.
    fn now(&self) -> Duration;
}

/// A restartable loop that calls a tick function once per period.
///
/// The time a tick takes is subtracted from the following sleep so the loop
/// holds its period as long as ticks are shorter than it.
pub struct PeriodicTask<R: Runtime> {
    name: &'static str,
    period: Duration,
    task: Option<R::Task>,
}

impl<R: Runtime> PeriodicTask<R> {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            period,
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Spawn the loop. Returns `false` without spawning if it is already running.
    ///
    /// The loop ends on its own when `tick` returns [`ControlFlow::Break`].
    pub fn start<F>(&mut self, runtime: &R, mut tick: F) -> bool
    where
        F: FnMut() -> ControlFlow<()> + 'static,
    {
        if self.is_running() {
            return false;
        }
        let name = self.name;
        let period = self.period;
        let task_runtime = runtime.clone();
        self.task = Some(runtime.spawn(async move {
            loop {
                let start = task_runtime.now();
                if tick().is_break() {
                    debug!("{name} task finished");
                    break;
                }
                let elapsed = task_runtime.now().saturating_sub(start);
                task_runtime.sleep(period.saturating_sub(elapsed)).await;
            }
        }));
        info!("{} task started every {}ms", self.name, self.period.as_millis());
        true
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
            info!("{} task stopped", self.name);
        }
    }
}

impl<R: Runtime> Drop for PeriodicTask<R> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use super::*;
    use crate::testing::MockRuntime;

    #[test]
    fn start_is_idempotent_while_running() {
        let runtime = MockRuntime::new();
        let mut task = PeriodicTask::<MockRuntime>::new("sampler", Duration::from_millis(10));
        assert!(!task.is_running());
        assert!(task.start(&runtime, || ControlFlow::Continue(())));
        assert!(!task.start(&runtime, || ControlFlow::Continue(())));
        assert!(task.is_running());
        assert_eq!(runtime.spawned(), 1);
    }

    #[test]
    fn ticks_once_per_poll_and_restarts_after_stop() {
        let runtime = MockRuntime::new();
        let ticks = Rc::new(Cell::new(0));
        let mut task = PeriodicTask::<MockRuntime>::new("sampler", Duration::from_millis(10));
        task.start(&runtime, {
            let ticks = ticks.clone();
            move || {
                ticks.set(ticks.get() + 1);
                ControlFlow::Continue(())
            }
        });
        runtime.run_tasks(3);
        assert_eq!(ticks.get(), 3);
        assert_eq!(runtime.now(), Duration::from_millis(30));

        task.stop();
        assert!(!task.is_running());
        runtime.run_tasks(2);
        assert_eq!(ticks.get(), 3);

        assert!(task.start(&runtime, || ControlFlow::Continue(())));
        assert_eq!(runtime.spawned(), 2);
    }

    #[test]
    fn break_finishes_the_task() {
        let runtime = MockRuntime::new();
        let mut task = PeriodicTask::<MockRuntime>::new("once", Duration::from_millis(10));
        task.start(&runtime, || ControlFlow::Break(()));
        runtime.run_tasks(1);
        assert!(!task.is_running());
    }
}
