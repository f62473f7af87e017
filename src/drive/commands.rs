//! Autonomous commands and the flat path record format.

use crate::error::ChassisError;

/// One step of an autonomous routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Drive to a field position and settle at a heading.
    ///
    /// `heading` is in degrees, `speed` is the largest normalized power the
    /// move may use.
    MoveWithHeading {
        x: f64,
        y: f64,
        heading: f64,
        speed: f64,
    },
    PickUp,
    Place,
    Scoop,
    Release,
    Clasp,
}

/// Discriminants of [`CommandRecord::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CommandKind {
    MoveWithHeading = 0,
    PickUp = 1,
    Place = 2,
    Scoop = 3,
    Release = 4,
    Clasp = 5,
}

impl TryFrom<u32> for CommandKind {
    type Error = ChassisError;

    fn try_from(kind: u32) -> Result<Self, Self::Error> {
        Ok(match kind {
            0 => Self::MoveWithHeading,
            1 => Self::PickUp,
            2 => Self::Place,
            3 => Self::Scoop,
            4 => Self::Release,
            5 => Self::Clasp,
            other => return Err(ChassisError::UnknownCommand(other)),
        })
    }
}

/// A path entry as exported by offline path tools.
///
/// The payload is only meaningful for [`CommandKind::MoveWithHeading`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct CommandRecord {
    pub kind: u32,
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub speed: f32,
}

impl CommandRecord {
    pub const fn new(kind: CommandKind, x: f32, y: f32, heading: f32, speed: f32) -> Self {
        Self {
            kind: kind as u32,
            x,
            y,
            heading,
            speed,
        }
    }

    pub const fn action(kind: CommandKind) -> Self {
        Self::new(kind, 0.0, 0.0, 0.0, 0.0)
    }
}

impl TryFrom<&CommandRecord> for Command {
    type Error = ChassisError;

    fn try_from(record: &CommandRecord) -> Result<Self, Self::Error> {
        Ok(match CommandKind::try_from(record.kind)? {
            CommandKind::MoveWithHeading => Self::MoveWithHeading {
                x: f64::from(record.x),
                y: f64::from(record.y),
                heading: f64::from(record.heading),
                speed: f64::from(record.speed),
            },
            CommandKind::PickUp => Self::PickUp,
            CommandKind::Place => Self::Place,
            CommandKind::Scoop => Self::Scoop,
            CommandKind::Release => Self::Release,
            CommandKind::Clasp => Self::Clasp,
        })
    }
}
