use core::ops::{Add, Rem};

use num_traits::{Float, FromPrimitive};

pub enum AngularDirection {
    Clockwise,
    CounterClockwise,
    Auto,
}

#[macro_export]
macro_rules! signed_mod {
    ($dividend:expr, $divisor:expr) => {
        (($dividend % $divisor) + $divisor) % $divisor
    };
}

/// Average of the `Some` values of a collection of `Option<f64>`.
#[macro_export]
macro_rules! avg_valid {
    ($vec:expr) => {{
        let (sum, count) = $vec
            .iter()
            .filter_map(|&x| x)
            .fold((0.0, 0), |(sum, count), x| (sum + x, count + 1));

        if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        }
    }};
}

pub use avg_valid;
pub use signed_mod;

fn remainder<T: Float>(a: T, b: T) -> T {
    let n = (a / b).round();
    a - b * n
}

/// Wrap an angle into `[0, 360)` degrees or `[0, τ)` radians.
pub fn sanitize_angle<T: FromPrimitive + Rem<Output = T> + Add<Output = T> + Default>(
    angle: T,
    radians: bool,
) -> T {
    if radians {
        signed_mod!(
            angle,
            T::from_f64(core::f64::consts::TAU).unwrap_or_default()
        )
    } else {
        signed_mod!(angle, T::from_u16(360).unwrap_or_default())
    }
}

/// Signed error from `current` to `target`, counterclockwise positive.
pub fn angle_error<T: Float + FromPrimitive + Default>(
    target: T,
    current: T,
    radians: bool,
    direction: AngularDirection,
) -> T {
    let target = sanitize_angle(target, radians);
    let current = sanitize_angle(current, radians);
    let max: T = if radians {
        T::from_f64(core::f64::consts::TAU).unwrap_or_default()
    } else {
        T::from_u16(360).unwrap_or_default()
    };
    let raw_error: T = target - current;
    match direction {
        AngularDirection::CounterClockwise => {
            if raw_error < T::zero() {
                raw_error + max
            } else {
                raw_error
            }
        }
        AngularDirection::Clockwise => {
            if raw_error > T::zero() {
                raw_error - max
            } else {
                raw_error
            }
        }
        AngularDirection::Auto => remainder(raw_error, max),
    }
}
