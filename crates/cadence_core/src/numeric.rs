//! Scalar float helpers shared by the curve math.
//!
//! Everything here is generic over [`num_traits::Float`], so the same
//! helpers serve `f32` and `f64` callers without any runtime type
//! inspection.

use num_traits::float::FloatConst;
use num_traits::{Float, NumCast};
use tracing::warn;

/// Rounding direction for [`FloatExt::rounded_by`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rounding {
    Up,
    Down,
    #[default]
    Nearest,
}

/// Extension helpers for floating-point scalars.
pub trait FloatExt: Float + FloatConst {
    /// Interpret `self` as degrees and convert to radians.
    fn radians(self) -> Self;

    /// Interpret `self` as radians and convert to degrees.
    fn degrees(self) -> Self;

    /// `self * self`.
    fn sqr(self) -> Self;

    /// Round to a scale: `rounded_by(8.0, Nearest)` keeps eighths.
    fn rounded_by(self, scale: Self, rule: Rounding) -> Self;

    /// Tolerant equality within [`Float::epsilon`].
    fn approx_eq(self, other: Self) -> bool;
}

impl<F: Float + FloatConst> FloatExt for F {
    fn radians(self) -> Self {
        self * F::PI() / cast(180.0)
    }

    fn degrees(self) -> Self {
        self * cast::<F>(180.0) / F::PI()
    }

    fn sqr(self) -> Self {
        self * self
    }

    fn rounded_by(self, scale: Self, rule: Rounding) -> Self {
        match rule {
            Rounding::Nearest => (self * scale).round() / scale,
            Rounding::Up => (self * scale).ceil() / scale,
            Rounding::Down => (self * scale).floor() / scale,
        }
    }

    fn approx_eq(self, other: Self) -> bool {
        (self - other).abs() < F::epsilon()
    }
}

/// Evaluate the line through `(left, left_value)` and `(right, right_value)`
/// at `x`.
///
/// A NaN `x` is treated as 1. A non-finite result (degenerate interval)
/// is logged and coerced to 0 instead of propagating.
pub fn linear_function<F: Float>(x: F, left: F, right: F, left_value: F, right_value: F) -> F {
    let k = (right_value - left_value) / (right - left);
    let b = right_value - k * right;
    let x = if x.is_nan() { F::one() } else { x };
    let res = k * x + b;
    if res.is_finite() {
        return res;
    }
    warn!("non-finite linear function result, coercing to 0");
    F::zero()
}

/// Solve the line through `(left, left_value)` and `(right, right_value)`
/// for the `x` that yields `value`.
///
/// Same degradation contract as [`linear_function`]: non-finite results
/// are logged and coerced to 0.
pub fn linear_function_solver<F: Float>(
    left: F,
    right: F,
    left_value: F,
    right_value: F,
    value: F,
) -> F {
    let k = (right_value - left_value) / (right - left);
    let b = right_value - k * right;
    let res = (value - b) / k;
    if res.is_finite() {
        return res;
    }
    warn!("non-finite linear solver result, coercing to 0");
    F::zero()
}

/// Parabola with zeros at `x0` and `x1`, scaled against `min_value`.
pub fn quadratic_function<F: Float>(x: F, x0: F, x1: F, min_value: F) -> F {
    let two = F::one() + F::one();
    let a = (x0 + x1) / two / min_value;
    let res = a * (x - x0) * (x - x1);
    if res.is_finite() {
        return res;
    }
    warn!("non-finite quadratic function result, coercing to 0");
    F::zero()
}

fn cast<F: Float>(v: f64) -> F {
    NumCast::from(v).unwrap_or_else(F::zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_radians_round_trip() {
        let deg = 90.0_f64;
        assert!((deg.radians() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((deg.radians().degrees() - deg).abs() < 1e-12);
    }

    #[test]
    fn sqr_and_approx_eq() {
        assert_eq!(3.0_f64.sqr(), 9.0);
        assert!(0.1_f64.approx_eq(0.1));
        assert!(!0.1_f64.approx_eq(0.2));
    }

    #[test]
    fn rounded_by_scale() {
        let v = 0.12345_f64;
        assert!((v.rounded_by(100.0, Rounding::Nearest) - 0.12).abs() < 1e-12);
        assert!((v.rounded_by(100.0, Rounding::Up) - 0.13).abs() < 1e-12);
        assert!((v.rounded_by(100.0, Rounding::Down) - 0.12).abs() < 1e-12);
    }

    #[test]
    fn linear_function_interpolates() {
        // Line through (0, 10) and (1, 20).
        let y = linear_function(0.5, 0.0, 1.0, 10.0, 20.0);
        assert!((y - 15.0).abs() < 1e-12);
    }

    #[test]
    fn linear_function_nan_x_maps_to_right_edge() {
        let y = linear_function(f64::NAN, 0.0, 1.0, 10.0, 20.0);
        assert!((y - 20.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_interval_coerces_to_zero() {
        // left == right divides by zero; the helper degrades to 0.
        let y = linear_function(0.5, 1.0, 1.0, 10.0, 20.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn solver_inverts_linear_function() {
        let y = linear_function(0.3, 0.0, 1.0, 2.0, 4.0);
        let x = linear_function_solver(0.0, 1.0, 2.0, 4.0, y);
        assert!((x - 0.3).abs() < 1e-12);
    }

    #[test]
    fn flat_line_solver_coerces_to_zero() {
        // k == 0 makes the inverse non-finite.
        let x = linear_function_solver(0.0, 1.0, 5.0, 5.0, 7.0);
        assert_eq!(x, 0.0);
    }

    #[test]
    fn quadratic_function_zeros() {
        let y0 = quadratic_function(0.0, 0.0, 1.0, -0.25);
        let y1 = quadratic_function(1.0, 0.0, 1.0, -0.25);
        assert!(y0.abs() < 1e-12);
        assert!(y1.abs() < 1e-12);
    }
}
