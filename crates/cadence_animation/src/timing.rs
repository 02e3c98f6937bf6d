//! Closed-form Bezier timing-value solving.
//!
//! [`TimingCurve`] inverts the time-fraction -> eased-value mapping frame by
//! frame, without a precomputed table: solve the x-cubic for the curve
//! parameter, evaluate y at the real roots, and pick the right root. Root
//! selection is the whole problem - a cubic can cross a vertical line up to
//! three times - and is anchored on the previously published value whenever
//! one exists.

use crate::curve::CurvePoint;
use cadence_core::{solve_cubic, FloatExt};
use num_traits::{Float, NumCast};

/// Roots with imaginary magnitude above this are not candidates.
const IMAGINARY_CUTOFF: f64 = 1e-4;

/// Constant-term nudge used to disambiguate roots on the very first frame.
const FIRST_FRAME_PERTURBATION: f64 = 0.001;

/// A cubic timing curve with fixed endpoints and two free control points.
///
/// Endpoints default to (0,0) and (1,1), the usual normalized-progress
/// frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingCurve {
    start: CurvePoint,
    c1: CurvePoint,
    c2: CurvePoint,
    end: CurvePoint,
}

impl TimingCurve {
    /// Curve through (0,0) and (1,1) shaped by the two control points.
    pub const fn new(c1: CurvePoint, c2: CurvePoint) -> Self {
        Self::with_endpoints(
            CurvePoint::new(0.0, 0.0),
            c1,
            c2,
            CurvePoint::new(1.0, 1.0),
        )
    }

    /// Fully general form with explicit endpoints.
    pub const fn with_endpoints(
        start: CurvePoint,
        c1: CurvePoint,
        c2: CurvePoint,
        end: CurvePoint,
    ) -> Self {
        Self { start, c1, c2, end }
    }

    /// CSS `linear`.
    pub const fn linear() -> Self {
        Self::new(CurvePoint::new(0.0, 0.0), CurvePoint::new(1.0, 1.0))
    }

    /// CSS `ease`.
    pub const fn ease() -> Self {
        Self::new(CurvePoint::new(0.25, 0.1), CurvePoint::new(0.25, 1.0))
    }

    /// CSS `ease-in`.
    pub const fn ease_in() -> Self {
        Self::new(CurvePoint::new(0.42, 0.0), CurvePoint::new(1.0, 1.0))
    }

    /// CSS `ease-out`.
    pub const fn ease_out() -> Self {
        Self::new(CurvePoint::new(0.0, 0.0), CurvePoint::new(0.58, 1.0))
    }

    /// CSS `ease-in-out`.
    pub const fn ease_in_out() -> Self {
        Self::new(CurvePoint::new(0.42, 0.0), CurvePoint::new(0.58, 1.0))
    }

    /// Bernstein evaluation of y at curve parameter `t`.
    pub fn y_at(&self, t: f64) -> f64 {
        let one_t = 1.0 - t;
        one_t * one_t.sqr() * self.start.y
            + 3.0 * t * one_t.sqr() * self.c1.y
            + 3.0 * t.sqr() * one_t * self.c2.y
            + t * t.sqr() * self.end.y
    }

    /// Eased value for time fraction `x`.
    ///
    /// `last_y` anchors root selection to the previously published value;
    /// pass NaN on the first frame of a run, where no anchor exists and a
    /// perturbation heuristic screens the candidates instead.
    pub fn solve_for_y<F: Float>(&self, x: F, last_y: F) -> F {
        let x = x.to_f64().unwrap_or(f64::NAN);
        let res = if last_y.is_nan() {
            self.solve_unanchored(x)
        } else {
            self.solve_anchored(x, last_y.to_f64().unwrap_or(0.0))
        };
        NumCast::from(res).unwrap_or_else(F::zero)
    }

    // First frame: no previous value to anchor on. Solve the x-cubic twice,
    // once with the constant term nudged, and keep the candidate whose two
    // estimates agree best after a monotonic-progress screen. Candidates two
    // and three collapse both estimates onto the nudged root, so only an
    // overshoot past 1 lets them through the screen. Opaque numerical
    // heuristic; it has no closed-form justification.
    fn solve_unanchored(&self, x: f64) -> f64 {
        let a = 3.0 * (self.c1.x - self.c2.x) + 1.0;
        let b = 3.0 * self.c2.x - 6.0 * self.c1.x;
        let c = 3.0 * self.c1.x;

        let nudged = solve_cubic(a, b, c, -x + FIRST_FRAME_PERTURBATION);
        let exact = solve_cubic(a, b, c, -x);

        let tmp = self.y_at(nudged[0].re);
        let first_result = self.y_at(exact[0].re);
        let first_diff =
            if (tmp < first_result || first_result - 1.0 > 0.0) && first_result >= 0.0 {
                (tmp - first_result).abs()
            } else {
                f64::MAX
            };

        let mut second_result = 0.0;
        let mut second_diff = f64::MAX;
        if nudged[1].im.abs() < IMAGINARY_CUTOFF && exact[1].im.abs() < IMAGINARY_CUTOFF {
            second_result = self.y_at(nudged[1].re);
            if second_result > 1.0 {
                second_diff = 0.0;
            }
        }

        let mut third_result = 0.0;
        let mut third_diff = f64::MAX;
        if nudged[2].im.abs() < IMAGINARY_CUTOFF && exact[2].im.abs() < IMAGINARY_CUTOFF {
            third_result = self.y_at(nudged[2].re);
            if third_result > 1.0 {
                third_diff = 0.0;
            }
        }

        pick(
            (first_result, first_diff),
            (second_result, second_diff),
            (third_result, third_diff),
        )
    }

    // Steady state: the root whose y lands closest to the last published
    // value wins. Near-complex roots are excluded outright.
    fn solve_anchored(&self, x: f64, last_y: f64) -> f64 {
        let roots = solve_cubic(
            3.0 * (self.c1.x - self.c2.x) - self.start.x + self.end.x,
            3.0 * self.c2.x - 6.0 * self.c1.x + 3.0 * self.start.x,
            3.0 * (self.c1.x - self.start.x),
            self.start.x - x,
        );

        let first_result = self.y_at(roots[0].re);
        let first_diff = (last_y - first_result).abs();

        let mut second_result = 0.0;
        let mut second_diff = f64::MAX;
        if roots[1].im.abs() < IMAGINARY_CUTOFF {
            second_result = self.y_at(roots[1].re);
            second_diff = (last_y - second_result).abs();
        }

        let mut third_result = 0.0;
        let mut third_diff = f64::MAX;
        if roots[2].im.abs() < IMAGINARY_CUTOFF {
            third_result = self.y_at(roots[2].re);
            third_diff = (last_y - third_result).abs();
        }

        pick(
            (first_result, first_diff),
            (second_result, second_diff),
            (third_result, third_diff),
        )
    }
}

// Nested comparison, not a min-fold: ties fall through to the later
// candidate.
fn pick(first: (f64, f64), second: (f64, f64), third: (f64, f64)) -> f64 {
    if first.1 < second.1 {
        if first.1 < third.1 {
            first.0
        } else {
            third.0
        }
    } else if second.1 < third.1 {
        second.0
    } else {
        third.0
    }
}
