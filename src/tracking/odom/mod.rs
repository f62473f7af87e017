pub mod fusion;
pub mod odom_tracking;
pub mod odom_wheels;

pub use fusion::{fuse, HeadingSource, LocalDelta, OdomState, TickSample, WheelDelta};
pub use odom_tracking::{OdomSensors, Odometry, OdometryConfig};
pub use odom_wheels::TrackingWheel;
