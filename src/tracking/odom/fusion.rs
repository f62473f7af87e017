//! One odometry tick as a pure function of the readings taken during it.
//!
//! Heading change comes from the best source present in the sample: a pair of
//! parallel tracking wheels, then the inertial sensor, then nothing. The
//! remaining wheels are treated as arcs of that heading change and reduced to
//! their chord, which is the exact displacement of the tracking center for
//! constant curvature motion within the tick.

use num_traits::Float;

use crate::drive::pose::Pose;

/// Travel of one tracking wheel during a tick, with its mounting offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelDelta {
    pub delta: f64,
    pub offset: f64,
}

impl WheelDelta {
    pub fn new(delta: f64, offset: f64) -> Self {
        Self { delta, offset }
    }

    /// Chord of the tracking center implied by this wheel for a heading change.
    ///
    /// `delta / delta_theta + offset` is the radius of the center's arc.
    pub fn chord(&self, delta_theta: f64) -> f64 {
        2.0 * (delta_theta / 2.0).sin() * (self.delta / delta_theta + self.offset)
    }
}

/// Every reading that goes into one tick. Absent entries are hardware that is
/// not configured or could not be read this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickSample {
    /// Forward facing wheel left of center.
    pub left: Option<WheelDelta>,
    /// Forward facing wheel right of center.
    pub right: Option<WheelDelta>,
    /// Sideways facing wheel.
    pub back: Option<WheelDelta>,
    /// Inertial rotation since the previous tick, radians counterclockwise.
    pub inertial: Option<f64>,
}

/// Where a tick's heading change came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadingSource {
    TrackingWheels,
    Inertial,
    None,
}

/// Robot frame displacement over one tick. `x` is to the right, `y` forward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalDelta {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub source: HeadingSource,
}

impl TickSample {
    /// Heading change for the tick and the source it came from.
    pub fn heading_delta(&self) -> (HeadingSource, f64) {
        if let (Some(left), Some(right)) = (self.left, self.right) {
            let track_width = left.offset - right.offset;
            if track_width != 0.0 {
                return (
                    HeadingSource::TrackingWheels,
                    (right.delta - left.delta) / track_width,
                );
            }
        }
        match self.inertial {
            Some(delta_theta) => (HeadingSource::Inertial, delta_theta),
            None => (HeadingSource::None, 0.0),
        }
    }
}

/// Reduce a sample to the robot frame displacement of the tracking center.
pub fn fuse(sample: &TickSample) -> LocalDelta {
    let (source, delta_theta) = sample.heading_delta();
    let verticals = [sample.left, sample.right];

    // Exactly zero is the only singular case, straight driving hits it constantly.
    let (x, y) = if delta_theta == 0.0 {
        (
            sample.back.map_or(0.0, |wheel| wheel.delta),
            avg_valid!(verticals.map(|wheel| wheel.map(|wheel| wheel.delta))).unwrap_or(0.0),
        )
    } else {
        (
            sample.back.map_or(0.0, |wheel| wheel.chord(delta_theta)),
            avg_valid!(verticals.map(|wheel| wheel.map(|wheel| wheel.chord(delta_theta))))
                .unwrap_or(0.0),
        )
    };

    LocalDelta {
        x,
        y,
        theta: delta_theta,
        source,
    }
}

/// Fused pose and smoothed velocities.
///
/// Headings are radians. Velocities are per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OdomState {
    pub pose: Pose,
    pub speed: Pose,
    pub local_speed: Pose,
}

impl OdomState {
    /// Apply one tick.
    ///
    /// The displacement is rotated by the heading halfway through the tick.
    /// Velocities are single pole low pass filters of `delta / period` with
    /// `smoothing` as the weight on history, the same for every channel.
    pub fn integrate(&mut self, local: &LocalDelta, period: f64, smoothing: f64) {
        let avg_heading = self.pose.orientation + local.theta / 2.0;
        let global = Pose::new(local.x, local.y, 0.0).rotate(avg_heading);

        self.pose.position += global.position;
        self.pose.orientation += local.theta;

        let blend = |previous: f64, delta: f64| previous * smoothing + delta / period * (1.0 - smoothing);
        self.speed = Pose::new(
            blend(self.speed.x(), global.x()),
            blend(self.speed.y(), global.y()),
            blend(self.speed.orientation, local.theta),
        );
        self.local_speed = Pose::new(
            blend(self.local_speed.x(), local.x),
            blend(self.local_speed.y(), local.y),
            blend(self.local_speed.orientation, local.theta),
        );
    }

    /// Dead reckon `seconds` ahead on the current local velocity.
    pub fn extrapolate(&self, seconds: f64) -> Pose {
        let delta_theta = self.local_speed.orientation * seconds;
        let arc = self.local_speed * seconds;
        let chord_scale = if delta_theta == 0.0 {
            1.0
        } else {
            2.0 * (delta_theta / 2.0).sin() / delta_theta
        };
        let global = (arc * chord_scale).rotate(self.pose.orientation + delta_theta / 2.0);
        Pose {
            position: self.pose.position + global.position,
            orientation: self.pose.orientation + delta_theta,
        }
    }
}
