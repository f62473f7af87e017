use core::cell::Cell;

pub mod move_with_heading;

pub use move_with_heading::{MoveOutcome, MoveSettings};

/// Tracks whether a motion is running and whether it was asked to stop.
///
/// Motions poll [`MotionHandler::should_stop`] between iterations, so a
/// cancellation takes effect at the motion's next loop.
#[derive(Default)]
pub struct MotionHandler {
    in_motion: Cell<bool>,
    cancel_requested: Cell<bool>,

    /// Bumped by [`MotionHandler::cancel_all_motions`] so running sequences
    /// can tell they were cancelled.
    generation: Cell<u32>,
}

impl MotionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_motion(&self) -> bool {
        self.in_motion.get()
    }

    pub fn begin_motion(&self) {
        self.in_motion.set(true);
        self.cancel_requested.set(false);
    }

    pub fn end_motion(&self) {
        self.in_motion.set(false);
        self.cancel_requested.set(false);
    }

    pub fn should_stop(&self) -> bool {
        self.cancel_requested.get()
    }

    pub fn generation(&self) -> u32 {
        self.generation.get()
    }

    /// Stop the current motion. Does nothing when idle.
    pub fn cancel_motion(&self) {
        if self.in_motion.get() {
            self.cancel_requested.set(true);
        }
    }

    /// Stop the current motion and every sequence waiting behind it.
    pub fn cancel_all_motions(&self) {
        self.cancel_motion();
        self.generation.set(self.generation.get().wrapping_add(1));
    }
}
