use core::time::Duration;

use bon::{bon, Builder};
use log::{debug, info};
use nalgebra::Vector2;

use crate::{
    drive::chassis::Chassis,
    runtime::Runtime,
    utils::math::{angle_error, AngularDirection},
};

/// Gains and exit conditions of [`Chassis::move_with_heading`].
#[derive(Clone, Copy, Debug, PartialEq, Builder)]
pub struct MoveSettings {
    /// Distance from the target that counts as arrived.
    #[builder(default = 1.0)]
    pub linear_tolerance: f64,

    /// Heading error that counts as settled, in degrees.
    #[builder(default = 2.0)]
    pub angular_tolerance: f64,

    /// Power per unit of distance error.
    #[builder(default = 0.1)]
    pub linear_gain: f64,

    /// Power per degree of heading error.
    #[builder(default = 0.02)]
    pub turn_gain: f64,

    #[builder(default = Duration::from_secs(5))]
    pub timeout: Duration,

    #[builder(default = Duration::from_millis(10))]
    pub period: Duration,
}

impl Default for MoveSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Settled,
    TimedOut,
    Cancelled,
}

#[bon]
impl<R: Runtime> Chassis<R> {
    /// Drive to a field position while turning to `heading` (degrees).
    ///
    /// Translation and rotation are both proportional to their error and share
    /// the `speed` limit, so the robot strafes and turns at once. The
    /// drivetrain is stopped whichever way the move ends.
    #[builder]
    pub async fn move_with_heading(
        &self,
        x: f64,
        y: f64,
        heading: f64,
        speed: Option<f64>,
        settings: Option<MoveSettings>,
    ) -> MoveOutcome {
        let settings = settings.unwrap_or(self.move_settings);
        let generation = self.motion_handler.generation();
        while self.motion_handler.in_motion() {
            self.runtime.sleep(settings.period).await;
        }
        if self.motion_handler.generation() != generation {
            debug!("Queued move to ({x:.2}, {y:.2}) cancelled before starting");
            return MoveOutcome::Cancelled;
        }
        self.motion_handler.begin_motion();

        let speed = speed.unwrap_or(1.0).clamp(0.0, 1.0);
        let target = Vector2::new(x, y);
        let target_heading = heading.to_radians();
        let start = self.runtime.now();
        debug!("Moving to ({x:.2}, {y:.2}) at {heading:.1} degrees");

        let outcome = loop {
            if self.motion_handler.should_stop() {
                break MoveOutcome::Cancelled;
            }
            let pose = self.odometry.pose(true);
            let error = target - pose.position;
            let heading_error =
                angle_error(target_heading, pose.orientation, true, AngularDirection::Auto)
                    .to_degrees();
            if error.norm() <= settings.linear_tolerance
                && heading_error.abs() <= settings.angular_tolerance
            {
                break MoveOutcome::Settled;
            }
            if self.runtime.now().saturating_sub(start) >= settings.timeout {
                break MoveOutcome::TimedOut;
            }

            let mut linear = error * settings.linear_gain;
            let magnitude = linear.norm();
            if magnitude > speed {
                linear *= speed / magnitude;
            }
            // Heading error is counterclockwise positive, turn power clockwise positive.
            let turn = (-heading_error * settings.turn_gain).clamp(-speed, speed);
            self.drive(linear.x, linear.y, turn, true);
            self.runtime.sleep(settings.period).await;
        };

        self.drivetrain.stop();
        self.motion_handler.end_motion();
        info!("Move to ({x:.2}, {y:.2}) ended: {outcome:?}");
        outcome
    }
}
