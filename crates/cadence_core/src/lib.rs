//! Cadence Core Primitives
//!
//! This crate provides the foundational pieces for the Cadence animation
//! workspace:
//!
//! - **Scalar helpers**: float extensions and linear/quadratic utilities,
//!   generic over any floating-point representation
//! - **Cubic solving**: closed-form roots for degree-3 polynomials
//! - **Synchronized cells**: guarded scalar slots shared between the ticking
//!   thread and control threads
//!
//! Numerically invalid situations degrade to sentinel values and a warning
//! log entry; nothing here panics or returns errors on the animation path.

pub mod cell;
pub mod cubic;
pub mod numeric;

pub use cell::SyncCell;
pub use cubic::{solve_cubic, Complex};
pub use numeric::{
    linear_function, linear_function_solver, quadratic_function, FloatExt, Rounding,
};
