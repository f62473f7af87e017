//! Error types for the chassis and its devices.

use alloc::string::String;
use core::fmt;

/// Result type alias for chassis operations.
pub type Result<T> = core::result::Result<T, ChassisError>;

/// Which tracking wheel a configuration error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelSide {
    Left,
    Right,
    Back,
}

impl fmt::Display for WheelSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Back => "back",
        })
    }
}

/// Chassis level failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChassisError {
    /// A tracking wheel required for localization was not configured.
    #[error("{0} tracking wheel not initialized")]
    MissingTrackingWheel(WheelSide),

    /// A path record carried a discriminant outside the known command set.
    #[error("unknown command discriminant {0}")]
    UnknownCommand(u32),

    /// A gripper command was issued without a manipulator attached.
    #[error("no manipulator attached for {0}")]
    NoManipulator(&'static str),

    /// The underlying device reported a failure.
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Failures reported by hardware providers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeviceError {
    /// The device is unplugged or not responding.
    #[error("device disconnected")]
    Disconnected,

    /// The device answered with an error of its own.
    #[error("device error: {0}")]
    Reported(String),
}
