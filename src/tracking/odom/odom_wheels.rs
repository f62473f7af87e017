use alloc::rc::Rc;
use core::{cell::RefCell, f64::consts::PI};

use log::warn;

use crate::devices::RotationSource;

/// Raw rotation sensor units per revolution (centidegrees).
const TICKS_PER_REVOLUTION: f64 = 36000.0;

/// An unpowered wheel on a rotation sensor, used only for odometry.
pub struct TrackingWheel {
    rotation: Option<Rc<RefCell<dyn RotationSource>>>,

    /// Diameter in inches.
    wheel_diameter: f64,

    /// Signed distance from the tracking center to the wheel's line of action.
    ///
    /// Measured along the wheel's positive travel direction turned 90 degrees
    /// counterclockwise: positive to the left for a forward facing wheel,
    /// positive forward for a sideways facing wheel.
    offset: f64,

    /// Travel at the last call to [`TrackingWheel::travel_delta`].
    last_travel: f64,
}

impl TrackingWheel {
    pub fn from_rotation(
        rotation: Rc<RefCell<dyn RotationSource>>,
        wheel_diameter: f64,
        offset: f64,
    ) -> Self {
        Self {
            rotation: Some(rotation),
            wheel_diameter,
            offset,
            last_travel: 0.0,
        }
    }

    /// A wheel with no sensor. It always reports zero travel.
    pub fn detached(wheel_diameter: f64, offset: f64) -> Self {
        Self {
            rotation: None,
            wheel_diameter,
            offset,
            last_travel: 0.0,
        }
    }

    pub fn has_sensor(&self) -> bool {
        self.rotation.is_some()
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Zero the sensor and the delta baseline. Does nothing without a sensor.
    pub fn reset(&mut self) {
        if let Some(rotation) = &self.rotation {
            if let Err(error) = rotation.borrow_mut().reset_position() {
                warn!("Tracking wheel reset failed: {error}");
            }
            self.last_travel = self.distance_traveled().unwrap_or(0.0);
        }
    }

    /// Distance traveled since the last reset, in the units of the diameter.
    ///
    /// Returns `None` when there is no sensor or it could not be read.
    pub fn distance_traveled(&self) -> Option<f64> {
        let rotation = self.rotation.as_ref()?;
        let ticks = rotation.borrow().raw_position().ok()?;
        Some(f64::from(ticks) * self.wheel_diameter * PI / TICKS_PER_REVOLUTION)
    }

    /// Distance traveled since the last reset, zero without a sensor.
    ///
    /// A failed read reports the last polled travel so no motion is invented.
    pub fn travel(&self) -> f64 {
        match (&self.rotation, self.distance_traveled()) {
            (None, _) => 0.0,
            (Some(_), Some(travel)) => travel,
            (Some(_), None) => {
                warn!("Tracking wheel read failed, holding last travel");
                self.last_travel
            }
        }
    }

    /// Travel since the previous call. Call it once per odometry tick.
    pub fn travel_delta(&mut self) -> f64 {
        let current = self.travel();
        let delta = current - self.last_travel;
        self.last_travel = current;
        delta
    }
}
