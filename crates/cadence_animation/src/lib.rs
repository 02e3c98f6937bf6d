//! Cadence Animation System
//!
//! Frame-synchronized animation timing: a duration plus a progress-shaping
//! curve drive a per-frame callback with an eased value.
//!
//! # Features
//!
//! - **Sampled curves**: precomputed Bezier lookup tables queried by binary
//!   search, built once off the real-time path
//! - **Closed-form curves**: per-frame cubic solving with continuity-anchored
//!   root selection, no table required
//! - **The driver**: start/pause/stop/restart semantics against a pluggable
//!   frame clock, safe from any thread
//!
//! # Example
//!
//! ```rust
//! use cadence_animation::{Animation, Animator, ManualClock, TimingCurve};
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::new());
//! let animator = Animator::new(clock.clone());
//!
//! animator.start(
//!     Animation::new()
//!         .duration(1.0)
//!         .timing_curve(TimingCurve::ease_in_out())
//!         .on_tick(|elapsed, eased| println!("{elapsed:.2}s -> {eased:.3}"))
//!         .on_complete(|success| println!("done, success = {success}")),
//! );
//!
//! clock.advance_to(0.5);
//! clock.advance_to(1.2); // past the duration: completes with success
//! ```

pub mod animator;
pub mod clock;
pub mod curve;
pub mod timing;

pub use animator::{Animation, Animator};
pub use clock::{FrameCallback, FrameClock, FrameSubscription, ManualClock, ThreadClock};
pub use curve::{BezierCurve, CurvePoint};
pub use timing::TimingCurve;
