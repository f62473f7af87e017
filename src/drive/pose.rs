use core::{
    fmt,
    ops::{Add, Div, Mul, Sub},
};

use nalgebra::{Rotation2, Vector2};
use num_traits::{AsPrimitive, Float, Num};

/// A position and heading in 2D.
///
/// Pose is unitless, callers keep the units consistent. Vector arithmetic only
/// touches the position: `+` and `-` keep the left operand's orientation and
/// scaling, `lerp` and `rotate` leave it unchanged.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Pose {
    pub position: Vector2<f64>,
    pub orientation: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl Pose {
    pub fn new<T: Num + AsPrimitive<f64>, U: Num + AsPrimitive<f64>, V: Num + AsPrimitive<f64>>(
        x: T,
        y: U,
        orientation: V,
    ) -> Self {
        Self {
            position: Vector2::<f64>::new(x.as_(), y.as_()),
            orientation: orientation.as_(),
        }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn with_orientation(self, orientation: f64) -> Self {
        Self {
            position: self.position,
            orientation,
        }
    }

    /// Same position, orientation converted from radians to degrees.
    pub fn to_degrees(self) -> Self {
        self.with_orientation(self.orientation.to_degrees())
    }

    /// Same position, orientation converted from degrees to radians.
    pub fn to_radians(self) -> Self {
        self.with_orientation(self.orientation.to_radians())
    }

    /// Linear interpolation of the position. `t` is not clamped.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            position: self.position.lerp(&other.position, t),
            orientation: self.orientation,
        }
    }

    pub fn distance(&self, other: &Self) -> f64 {
        self.position.metric_distance(&other.position)
    }

    /// Direction of the line from this position to `other`, in radians.
    pub fn angle(&self, other: &Self) -> f64 {
        let delta = other.position - self.position;
        Float::atan2(delta.y, delta.x)
    }

    /// Rotate the position about the origin by `angle` radians.
    pub fn rotate(&self, angle: f64) -> Self {
        Self {
            position: Rotation2::new(angle) * self.position,
            orientation: self.orientation,
        }
    }
}

impl Add for Pose {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            position: self.position + rhs.position,
            orientation: self.orientation,
        }
    }
}

impl Sub for Pose {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            position: self.position - rhs.position,
            orientation: self.orientation,
        }
    }
}

/// Dot product of the positions.
impl Mul for Pose {
    type Output = f64;

    fn mul(self, rhs: Self) -> f64 {
        self.position.dot(&rhs.position)
    }
}

impl Mul<f64> for Pose {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self {
            position: self.position * rhs,
            orientation: self.orientation,
        }
    }
}

impl Div<f64> for Pose {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self {
            position: self.position / rhs,
            orientation: self.orientation,
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pose {{ x: {:.3}, y: {:.3}, theta: {:.3} }}",
            self.position.x, self.position.y, self.orientation
        )
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use core::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    use approx::assert_relative_eq;

    use super::*;

    fn samples() -> [Pose; 4] {
        [
            Pose::new(5.0, 10.0, 1.57),
            Pose::new(5.2, 22.0, 2.22),
            Pose::new(-3.5, 0.25, -0.4),
            Pose::new(0, 0, 0),
        ]
    }

    #[test]
    fn add_and_sub_keep_left_orientation() {
        let a = Pose::new(5.0, 10.0, 1.57);
        let b = Pose::new(5.2, 22.0, 2.22);
        let sum = a + b;
        assert_relative_eq!(sum.x(), 10.2);
        assert_relative_eq!(sum.y(), 32.0);
        assert_eq!(sum.orientation, 1.57);
        let diff = a - b;
        assert_relative_eq!(diff.x(), -0.2, epsilon = 1e-12);
        assert_relative_eq!(diff.y(), -12.0);
        assert_eq!(diff.orientation, 1.57);
    }

    #[test]
    fn self_difference_is_zero_and_keeps_heading() {
        for a in samples() {
            let zero = a - a;
            assert_eq!(zero.x(), 0.0);
            assert_eq!(zero.y(), 0.0);
            assert_eq!(zero.orientation, a.orientation);
        }
    }

    #[test]
    fn dot_and_scale_ignore_heading() {
        let a = Pose::new(5.0, 10.0, 1.57);
        let b = Pose::new(5.2, 22.0, 2.22);
        assert_relative_eq!(a * b, 246.0);
        let scaled = Pose::new(1.0, 2.0, 0.3) * 4.0;
        assert_eq!(scaled, Pose::new(4.0, 8.0, 0.3));
        let halved = Pose::new(6.0, 8.0, 0.3) / 2.0;
        assert_eq!(halved, Pose::new(3.0, 4.0, 0.3));
    }

    #[test]
    fn lerp_hits_both_endpoints() {
        for a in samples() {
            for b in samples() {
                let start = a.lerp(&b, 0.0);
                let end = a.lerp(&b, 1.0);
                assert_relative_eq!(start.x(), a.x());
                assert_relative_eq!(start.y(), a.y());
                assert_relative_eq!(end.x(), b.x(), epsilon = 1e-12);
                assert_relative_eq!(end.y(), b.y(), epsilon = 1e-12);
                assert_eq!(end.orientation, a.orientation);
            }
        }
        let mid = Pose::new(0, 0, 0).lerp(&Pose::new(0, 2, 0), 0.5);
        assert_relative_eq!(mid.y(), 1.0);
    }

    #[test]
    fn distance_is_symmetric() {
        assert_relative_eq!(Pose::new(0, 0, 0).distance(&Pose::new(3, 4, 0)), 5.0);
        for a in samples() {
            for b in samples() {
                assert_eq!(a.distance(&b), b.distance(&a));
            }
        }
    }

    #[test]
    fn angle_between_positions() {
        let a = Pose::new(-1.0, -2.0, 3.0);
        let b = Pose::new(2.0, 1.0, 0.0);
        assert_relative_eq!(a.angle(&b), FRAC_PI_4);
    }

    #[test]
    fn rotate_keeps_heading() {
        let rotated = Pose::new(1.0, 0.0, 0.7).rotate(FRAC_PI_2);
        assert_relative_eq!(rotated.x(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(rotated.y(), 1.0);
        assert_eq!(rotated.orientation, 0.7);
    }

    #[test]
    fn unit_conversion_only_touches_heading() {
        let pose = Pose::new(1.0, 2.0, 90.0).to_radians();
        assert_relative_eq!(pose.orientation, FRAC_PI_2);
        assert_relative_eq!(pose.to_degrees().orientation, 90.0);
        assert_eq!(pose.position, Vector2::new(1.0, 2.0));
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(
            format!("{}", Pose::new(1.0, 2.0, 3.14)),
            "Pose { x: 1.000, y: 2.000, theta: 3.140 }"
        );
    }
}
