use core::{future::Future, time::Duration};

use vexide::{
    task::{self, Task},
    time::{self, Instant},
};

use super::{Runtime, TaskHandle};

/// The vexide executor.
#[derive(Clone, Copy)]
pub struct VexideRuntime {
    epoch: Instant,
}

impl VexideRuntime {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for VexideRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskHandle for Task<()> {
    fn cancel(self) {
        // Dropping a vexide task cancels it.
        drop(self);
    }
    fn is_finished(&self) -> bool {
        Task::is_finished(self)
    }
}

impl Runtime for VexideRuntime {
    type Task = Task<()>;

    fn spawn<F: Future<Output = ()> + 'static>(&self, future: F) -> Self::Task {
        task::spawn(future)
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        time::sleep(duration)
    }

    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}
