//! Closed-form cubic root solving.
//!
//! The solver is purely deterministic: a discriminant case split between
//! the Cardano closed form and the trigonometric form, no iteration and no
//! convergence failures.

use std::f64::consts::PI;

/// One root of a cubic equation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// Solve `a*x^3 + b*x^2 + c*x + d = 0`, returning all three roots.
///
/// The first root is always real. When the discriminant is positive the
/// remaining two are a conjugate pair; otherwise all three are real.
///
/// Caller contract: `a != 0`. A zero leading coefficient yields non-finite
/// garbage, not an error.
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> [Complex; 3] {
    let b = b / a;
    let c = c / a;
    let d = d / a;

    let q = (3.0 * c - b * b) / 9.0;
    let r = (-(27.0 * d) + b * (9.0 * c - 2.0 * b * b)) / 54.0;
    let disc = q * q * q + r * r;
    let term1 = b / 3.0;

    if disc > 0.0 {
        // One real root, two complex conjugates. `cbrt` preserves sign.
        let s = (r + disc.sqrt()).cbrt();
        let t = (r - disc.sqrt()).cbrt();
        let re = -(term1 + (s + t) / 2.0);
        let im = 3.0_f64.sqrt() * (s - t) / 2.0;
        return [
            Complex::new(-term1 + s + t, 0.0),
            Complex::new(re, im),
            Complex::new(re, -im),
        ];
    }

    if disc == 0.0 {
        // Exact compare: the boundary case belongs here, not in the
        // trigonometric branch.
        let r13 = r.cbrt();
        return [
            Complex::new(-term1 + 2.0 * r13, 0.0),
            Complex::new(-(r13 + term1), 0.0),
            Complex::new(-(r13 + term1), 0.0),
        ];
    }

    // Three distinct real roots; q < 0 to reach this branch.
    let q = -q;
    let phi = (r / (q * q * q).sqrt()).acos();
    let r13 = 2.0 * q.sqrt();
    [
        Complex::new(-term1 + r13 * (phi / 3.0).cos(), 0.0),
        Complex::new(-term1 + r13 * ((phi + 2.0 * PI) / 3.0).cos(), 0.0),
        Complex::new(-term1 + r13 * ((phi + 4.0 * PI) / 3.0).cos(), 0.0),
    ]
}
