//! Localization from tracking wheels and an inertial sensor.

pub mod odom;
