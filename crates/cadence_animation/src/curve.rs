//! Sampled Bezier timing curves.
//!
//! A [`BezierCurve`] precomputes a lookup table of points along a general
//! (n-1)-degree Bezier, then answers "y at x" queries with a binary search
//! and a linear interpolation between the bracketing samples. Building the
//! table is the expensive part and happens once, off the per-frame path.

use cadence_core::linear_function;
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

/// A 2-D curve point, used both for control points and table samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

impl CurvePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A Bezier curve precomputed into a sample table.
#[derive(Clone, Debug)]
pub struct BezierCurve {
    samples: Vec<CurvePoint>,
}

impl BezierCurve {
    /// Sample the Bezier through `control_points` into a table of
    /// `points_count` points.
    ///
    /// Inputs below the minimum (more than 2 control points, more than 2
    /// samples) produce an empty sampler rather than an error; [`Self::y_of`]
    /// then answers 0 for every query. Check [`Self::is_empty`] when the
    /// distinction matters.
    pub fn new(control_points: &[CurvePoint], points_count: usize) -> Self {
        let mut samples = Vec::new();
        if control_points.len() > 2 && points_count > 2 {
            sample_into(control_points, points_count, &mut samples);
        }
        Self { samples }
    }

    /// True when construction was handed degenerate input.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of precomputed samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Sampled y for the given x. An empty table answers 0.
    pub fn y_of(&self, x: f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.bracket_search(x, 0, self.samples.len() - 1)
    }

    // Nearest-neighbor-biased bisection: narrow toward whichever of
    // mid/mid+1 sits closer to x, then interpolate over the final bracket.
    // Not a plain x-ordered bisection; edge agreement depends on it.
    fn bracket_search(&self, x: f64, left: usize, right: usize) -> f64 {
        let samples = &self.samples;
        let mut low = left;
        let mut high = right;
        while low < high {
            let mid = (low + high) / 2;
            let d1 = (samples[mid].x - x).abs();
            let d2 = (samples[mid + 1].x - x).abs();
            if d2 <= d1 {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        if high == 0 {
            samples[0].y
        } else {
            linear_function(
                x,
                samples[high - 1].x,
                samples[high].x,
                samples[high - 1].y,
                samples[high].y,
            )
        }
    }
}

fn sample_into(control_points: &[CurvePoint], points_count: usize, out: &mut Vec<CurvePoint>) {
    let n = control_points.len();
    let mut memo = FxHashMap::default();
    let coefficients: Vec<f64> = (0..n).map(|k| choose(n - 1, k, &mut memo) as f64).collect();

    let value_of = |t: f64| -> CurvePoint {
        let mut t_powers: SmallVec<[f64; 8]> = smallvec![1.0];
        let mut one_t_powers: SmallVec<[f64; 8]> = smallvec![1.0];
        for _ in 1..n {
            t_powers.push(t_powers[t_powers.len() - 1] * t);
            one_t_powers.push(one_t_powers[one_t_powers.len() - 1] * (1.0 - t));
        }
        let mut x = 0.0;
        let mut y = 0.0;
        for (i, point) in control_points.iter().enumerate() {
            let weight = coefficients[i] * t_powers[i] * one_t_powers[n - i - 1];
            x += point.x * weight;
            y += point.y * weight;
        }
        CurvePoint::new(x, y)
    };

    out.reserve(points_count);
    let step = 1.0 / points_count as f64;
    let mut t = 0.0;
    for _ in 0..points_count - 1 {
        out.push(value_of(t));
        t += step;
    }
    // The loop stops short of t = 1; the final sample is pinned there, which
    // leaves the last interval wider than the uniform step. The bracket
    // search above is tuned to this table; keep the sampling as is.
    out.push(value_of(1.0));
}

/// Memoizing recursive binomial coefficient.
fn choose(n: usize, k: usize, memo: &mut FxHashMap<(usize, usize), u64>) -> u64 {
    if k == 0 {
        return 1;
    }
    if k > n / 2 {
        return choose(n, n - k, memo);
    }
    if let Some(&hit) = memo.get(&(n, k)) {
        return hit;
    }
    let value = n as u64 * choose(n - 1, k - 1, memo) / k as u64;
    memo.insert((n, k), value);
    value
}
