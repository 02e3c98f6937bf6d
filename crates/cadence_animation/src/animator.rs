//! The frame-driven animation driver.
//!
//! An [`Animator`] runs one progress value per run: each clock firing maps
//! elapsed time to a progress fraction, shapes it through the run's timing
//! source, and hands the eased value to the tick callback. Pause, stop and
//! restart are safe from any thread; the per-frame path stays on the
//! clock's thread.

use crate::clock::{FrameClock, FrameSubscription};
use crate::curve::BezierCurve;
use crate::timing::TimingCurve;
use cadence_core::SyncCell;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace};

/// Per-frame callback: `(elapsed seconds, eased value)`.
pub type TickFn = Box<dyn FnMut(f64, f64) + Send>;
/// Completion callback; `success` is true only for natural completion.
pub type CompleteFn = Box<dyn FnOnce(bool) + Send>;
/// Timing function: maps `(progress, last eased value)` to an eased value.
/// The last value is NaN on the first frame of a run.
pub type TimingFn = Box<dyn FnMut(f64, f64) -> f64 + Send>;
/// Deferred sampler construction, run off the ticking path.
pub type CurveBuilder = Box<dyn FnOnce() -> BezierCurve + Send>;

const DEFAULT_DURATION: f64 = 0.25;

enum TimingSource {
    Identity,
    Function(TimingFn),
    Curve(BezierCurve),
    LazyCurve(CurveBuilder),
}

/// Configuration for one animation run.
///
/// Chained setters over defaults: 0.25 s duration, identity timing, no
/// callbacks.
pub struct Animation {
    duration: f64,
    need_complete_after_stop: bool,
    timing: TimingSource,
    on_tick: Option<TickFn>,
    on_complete: Option<CompleteFn>,
}

impl Animation {
    pub fn new() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            need_complete_after_stop: false,
            timing: TimingSource::Identity,
            on_tick: None,
            on_complete: None,
        }
    }

    /// Run length in seconds.
    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    /// Treat every stop of this run as completing: a final progress-1 tick
    /// is published before teardown even when [`Animator::stop`] is called
    /// without `complete_first`.
    pub fn need_complete_after_stop(mut self, need: bool) -> Self {
        self.need_complete_after_stop = need;
        self
    }

    /// Shape progress through an arbitrary timing function.
    pub fn timing_function(
        mut self,
        timing: impl FnMut(f64, f64) -> f64 + Send + 'static,
    ) -> Self {
        self.timing = TimingSource::Function(Box::new(timing));
        self
    }

    /// Shape progress through a closed-form timing curve.
    pub fn timing_curve(self, curve: TimingCurve) -> Self {
        self.timing_function(move |x, last_y| curve.solve_for_y(x, last_y))
    }

    /// Shape progress through a prebuilt sampled curve.
    pub fn bezier_curve(mut self, curve: BezierCurve) -> Self {
        self.timing = TimingSource::Curve(curve);
        self
    }

    /// Shape progress through a sampled curve built lazily on a worker
    /// thread; the run's first tick waits for the build.
    pub fn bezier_curve_with(
        mut self,
        build: impl FnOnce() -> BezierCurve + Send + 'static,
    ) -> Self {
        self.timing = TimingSource::LazyCurve(Box::new(build));
        self
    }

    /// Per-frame callback.
    pub fn on_tick(mut self, on_tick: impl FnMut(f64, f64) + Send + 'static) -> Self {
        self.on_tick = Some(Box::new(on_tick));
        self
    }

    /// Completion callback; receives `true` only when the run played out
    /// its full duration without a force stop.
    pub fn on_complete(mut self, on_complete: impl FnOnce(bool) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(on_complete));
        self
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum StopRequest {
    #[default]
    None,
    Stop,
    CompleteThenStop,
}

enum ResolvedTiming {
    Identity,
    Function(TimingFn),
    Curve(BezierCurve),
}

struct Run {
    generation: u64,
    /// None while a lazy curve build is still pending.
    subscription: Option<FrameSubscription>,
    start_time: f64,
    duration: f64,
    elapsed: f64,
    last_timing_value: f64,
    complete_after_stop: bool,
    timing: ResolvedTiming,
    on_tick: Option<TickFn>,
    on_complete: Option<CompleteFn>,
}

impl Run {
    fn publish(&mut self, progress: f64) {
        let value = match &mut self.timing {
            ResolvedTiming::Identity => progress,
            ResolvedTiming::Function(timing) => timing(progress, self.last_timing_value),
            ResolvedTiming::Curve(curve) => curve.y_of(progress),
        };
        self.last_timing_value = value;
        if let Some(on_tick) = &mut self.on_tick {
            on_tick(self.elapsed, value);
        }
    }
}

struct Inner {
    clock: Arc<dyn FrameClock>,
    is_paused: SyncCell<bool>,
    stop_request: SyncCell<StopRequest>,
    generation: AtomicU64,
    run: Mutex<Option<Run>>,
}

/// Drives one eased progress value per run against a frame clock.
pub struct Animator {
    inner: Arc<Inner>,
}

impl Animator {
    pub fn new(clock: Arc<dyn FrameClock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                clock,
                is_paused: SyncCell::new(false),
                stop_request: SyncCell::new(StopRequest::None),
                generation: AtomicU64::new(0),
                run: Mutex::new(None),
            }),
        }
    }

    /// Start a run, superseding any run in flight.
    ///
    /// The superseded run's completion fires synchronously with
    /// `success = false`. The new run's timebase is captured from the clock
    /// immediately - or, for a lazily built curve, once the build worker
    /// hands the sampler back - so build latency is never charged to the
    /// animation.
    pub fn start(&self, animation: Animation) {
        let inner = &self.inner;
        if let Some(run) = inner.run.lock().take() {
            debug!("superseding in-flight animation");
            cancel(run);
        }
        inner.is_paused.write(false);
        inner.stop_request.write(StopRequest::None);
        let generation = inner.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let Animation {
            duration,
            need_complete_after_stop,
            timing,
            on_tick,
            on_complete,
        } = animation;
        let run = Run {
            generation,
            subscription: None,
            start_time: 0.0,
            duration,
            elapsed: 0.0,
            last_timing_value: f64::NAN,
            complete_after_stop: need_complete_after_stop,
            timing: ResolvedTiming::Identity,
            on_tick,
            on_complete,
        };
        trace!(duration, "starting animation");

        match timing {
            TimingSource::LazyCurve(build) => {
                *inner.run.lock() = Some(run);
                let inner = Arc::clone(inner);
                thread::spawn(move || {
                    let curve = build();
                    let mut slot = inner.run.lock();
                    match slot.as_mut() {
                        Some(run) if run.generation == generation => {
                            run.timing = ResolvedTiming::Curve(curve);
                            run.start_time = inner.clock.now();
                            run.subscription = Some(subscribe(&inner, generation));
                        }
                        // Superseded while building; the result is stale.
                        _ => trace!("discarding superseded curve build"),
                    }
                });
            }
            source => {
                let mut run = run;
                run.timing = match source {
                    TimingSource::Function(timing) => ResolvedTiming::Function(timing),
                    TimingSource::Curve(curve) => ResolvedTiming::Curve(curve),
                    _ => ResolvedTiming::Identity,
                };
                run.start_time = inner.clock.now();
                let mut slot = inner.run.lock();
                run.subscription = Some(subscribe(inner, generation));
                *slot = Some(run);
            }
        }
    }

    /// Request a stop; takes effect on the next clock firing.
    ///
    /// `complete_first` publishes one final progress-1 tick before
    /// teardown; a run configured with
    /// [`Animation::need_complete_after_stop`] publishes it either way.
    /// Completion reports `success = false`.
    pub fn stop(&self, complete_first: bool) {
        self.inner.stop_request.write(if complete_first {
            StopRequest::CompleteThenStop
        } else {
            StopRequest::Stop
        });
    }

    /// Freeze visible progress from the next clock firing on.
    pub fn pause(&self) {
        self.inner.is_paused.write(true);
    }

    /// Resume a paused run; elapsed time continues where it froze.
    pub fn resume(&self) {
        self.inner.is_paused.write(false);
    }

    /// Flip the pause flag, returning the new state.
    pub fn toggle_pause(&self) -> bool {
        self.inner.is_paused.toggle()
    }

    pub fn is_paused(&self) -> bool {
        self.inner.is_paused.read()
    }

    /// True iff an active frame-clock subscription exists.
    pub fn is_working(&self) -> bool {
        self.inner
            .run
            .lock()
            .as_ref()
            .is_some_and(|run| run.subscription.is_some())
    }

    /// Seconds of unpaused run time; 0 when idle.
    pub fn elapsed_time(&self) -> f64 {
        self.inner.run.lock().as_ref().map_or(0.0, |run| run.elapsed)
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        // Dropping the driver stops the run; the cancelled completion still
        // reports back.
        if let Some(run) = self.inner.run.lock().take() {
            cancel(run);
        }
    }
}

fn subscribe(inner: &Arc<Inner>, generation: u64) -> FrameSubscription {
    // The clock holds only a weak handle: an animator nobody owns must not
    // be kept alive by its own subscription.
    let weak = Arc::downgrade(inner);
    inner.clock.subscribe(Box::new(move |now| {
        if let Some(inner) = weak.upgrade() {
            on_frame(&inner, generation, now);
        }
    }))
}

fn on_frame(inner: &Arc<Inner>, generation: u64, now: f64) {
    // Claim the run for this tick. Stale generations get nothing; the slot
    // stays empty while callbacks execute so control calls from inside a
    // callback cannot deadlock.
    let mut run = {
        let mut slot = inner.run.lock();
        match slot.take() {
            Some(run) if run.generation == generation => run,
            other => {
                *slot = other;
                return;
            }
        }
    };

    let stop = inner.stop_request.read();
    if stop != StopRequest::None {
        if stop == StopRequest::CompleteThenStop || run.complete_after_stop {
            run.publish(1.0);
        }
        inner.stop_request.write(StopRequest::None);
        finish(run, false);
        return;
    }

    if inner.is_paused.read() {
        // Rebase the start so elapsed time holds still; progress resumes
        // without a jump once unpaused.
        run.start_time = now - run.elapsed;
        restore(inner, run);
        return;
    }

    let elapsed = now - run.start_time;
    run.elapsed = elapsed;

    if elapsed > run.duration {
        run.publish(1.0);
        finish(run, true);
        return;
    }

    run.publish(elapsed / run.duration);
    restore(inner, run);
}

fn restore(inner: &Arc<Inner>, run: Run) {
    let mut slot = inner.run.lock();
    if slot.is_none() && inner.generation.load(Ordering::Acquire) == run.generation {
        *slot = Some(run);
    } else {
        // A new run started while this one was mid-callback.
        drop(slot);
        cancel(run);
    }
}

fn finish(mut run: Run, success: bool) {
    if let Some(subscription) = run.subscription.take() {
        subscription.invalidate();
    }
    // Clear the handles before reporting: completion observes an idle
    // driver.
    run.on_tick = None;
    run.timing = ResolvedTiming::Identity;
    trace!(success, "animation finished");
    if let Some(on_complete) = run.on_complete.take() {
        on_complete(success);
    }
}

fn cancel(run: Run) {
    finish(run, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::curve::CurvePoint;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    type TickLog = Arc<Mutex<Vec<(f64, f64)>>>;
    type CompletionLog = Arc<Mutex<Vec<bool>>>;

    fn harness() -> (Arc<ManualClock>, Animator, TickLog, CompletionLog) {
        let clock = Arc::new(ManualClock::new());
        let animator = Animator::new(clock.clone());
        (clock, animator, Arc::default(), Arc::default())
    }

    fn identity_run(duration: f64, ticks: &TickLog, completions: &CompletionLog) -> Animation {
        let ticks = Arc::clone(ticks);
        let completions = Arc::clone(completions);
        Animation::new()
            .duration(duration)
            .on_tick(move |elapsed, value| ticks.lock().push((elapsed, value)))
            .on_complete(move |success| completions.lock().push(success))
    }

    #[test]
    fn identity_run_completes() {
        let (clock, animator, ticks, completions) = harness();
        animator.start(identity_run(1.0, &ticks, &completions));
        assert!(animator.is_working());

        clock.advance_to(0.5);
        {
            let ticks = ticks.lock();
            assert_eq!(ticks.len(), 1);
            assert!((ticks[0].0 - 0.5).abs() < 1e-12);
            assert!((ticks[0].1 - 0.5).abs() < 1e-12);
        }
        assert!((animator.elapsed_time() - 0.5).abs() < 1e-12);

        clock.advance_to(1.2);
        {
            let ticks = ticks.lock();
            assert_eq!(ticks.len(), 2);
            assert_eq!(ticks[1].1, 1.0);
        }
        assert_eq!(*completions.lock(), vec![true]);
        assert!(!animator.is_working());
        assert_eq!(animator.elapsed_time(), 0.0);
    }

    #[test]
    fn restart_cancels_previous_run() {
        let (clock, animator, ticks, completions) = harness();
        animator.start(identity_run(1.0, &ticks, &completions));
        clock.advance_to(0.4);

        // The second start fires the first completion synchronously with
        // success = false, then runs from elapsed = 0.
        animator.start(identity_run(1.0, &ticks, &completions));
        assert_eq!(*completions.lock(), vec![false]);

        clock.advance_to(0.9);
        let ticks = ticks.lock();
        let last = ticks.last().copied().unwrap();
        assert!((last.0 - 0.5).abs() < 1e-12, "elapsed was {}", last.0);
        assert!((last.1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn pause_is_idempotent() {
        let (clock, animator, ticks, completions) = harness();
        animator.start(identity_run(1.0, &ticks, &completions));
        clock.advance_to(0.2);

        animator.pause();
        animator.pause();
        clock.advance_to(0.4);
        clock.advance_to(0.5);
        // Paused frames rebase the clock without publishing.
        assert_eq!(ticks.lock().len(), 1);
        assert!((animator.elapsed_time() - 0.2).abs() < 1e-12);

        animator.resume();
        clock.advance_to(0.7);
        let last = ticks.lock().last().copied().unwrap();
        assert!((last.0 - 0.4).abs() < 1e-12, "elapsed drifted: {}", last.0);
        assert!((last.1 - 0.4).abs() < 1e-12);
    }

    #[test]
    fn stop_completes_first_when_asked() {
        let (clock, animator, ticks, completions) = harness();
        animator.start(identity_run(1.0, &ticks, &completions));
        clock.advance_to(0.3);

        animator.stop(true);
        clock.advance_to(0.35);
        {
            let ticks = ticks.lock();
            assert_eq!(ticks.len(), 2);
            assert_eq!(ticks[1].1, 1.0);
        }
        assert_eq!(*completions.lock(), vec![false]);
        assert!(!animator.is_working());
    }

    #[test]
    fn plain_stop_skips_the_final_tick() {
        let (clock, animator, ticks, completions) = harness();
        animator.start(identity_run(1.0, &ticks, &completions));
        clock.advance_to(0.3);

        animator.stop(false);
        clock.advance_to(0.35);
        assert_eq!(ticks.lock().len(), 1);
        assert_eq!(*completions.lock(), vec![false]);
    }

    #[test]
    fn need_complete_after_stop_overrides_plain_stop() {
        let (clock, animator, ticks, completions) = harness();
        animator.start(identity_run(1.0, &ticks, &completions).need_complete_after_stop(true));
        clock.advance_to(0.3);

        animator.stop(false);
        clock.advance_to(0.35);
        let ticks = ticks.lock();
        assert_eq!(ticks.last().unwrap().1, 1.0);
    }

    #[test]
    fn stop_beats_natural_completion() {
        let (clock, animator, ticks, completions) = harness();
        animator.start(identity_run(1.0, &ticks, &completions));
        clock.advance_to(0.3);

        // Even past the duration, a pending stop suppresses success.
        animator.stop(false);
        clock.advance_to(2.0);
        assert_eq!(*completions.lock(), vec![false]);
    }

    #[test]
    fn drop_stops_running_animation() {
        let (clock, animator, ticks, completions) = harness();
        animator.start(identity_run(1.0, &ticks, &completions));
        clock.advance_to(0.2);

        drop(animator);
        assert_eq!(*completions.lock(), vec![false]);
        // The clock keeps firing; nobody listens.
        clock.advance_to(0.5);
        assert_eq!(ticks.lock().len(), 1);
    }

    #[test]
    fn sampled_curve_shapes_the_output() {
        let (clock, animator, ticks, completions) = harness();
        let curve = BezierCurve::new(
            &[
                CurvePoint::new(0.0, 0.0),
                CurvePoint::new(0.5, 0.5),
                CurvePoint::new(1.0, 1.0),
            ],
            64,
        );
        let expected = curve.y_of(0.5);
        animator.start(identity_run(1.0, &ticks, &completions).bezier_curve(curve));

        clock.advance_to(0.5);
        let got = ticks.lock()[0].1;
        assert_eq!(got, expected);
    }

    #[test]
    fn timing_curve_runs_monotone() {
        let (clock, animator, ticks, completions) = harness();
        animator.start(
            identity_run(1.0, &ticks, &completions).timing_curve(TimingCurve::ease_in_out()),
        );

        for i in 1..=20 {
            clock.advance_to(i as f64 * 0.045);
        }
        let ticks = ticks.lock();
        assert!(ticks.len() >= 20);
        for pair in ticks.windows(2) {
            assert!(pair[1].1 >= pair[0].1 - 1e-9, "eased value regressed");
        }
    }

    #[test]
    fn lazy_curve_build_hands_back_before_first_tick() {
        let (clock, animator, ticks, completions) = harness();
        animator.start(identity_run(1.0, &ticks, &completions).bezier_curve_with(|| {
            BezierCurve::new(
                &[
                    CurvePoint::new(0.0, 0.0),
                    CurvePoint::new(0.5, 0.5),
                    CurvePoint::new(1.0, 1.0),
                ],
                256,
            )
        }));

        // The subscription appears only once the worker hands the table back.
        let mut waited = 0;
        while !animator.is_working() && waited < 500 {
            thread::sleep(Duration::from_millis(10));
            waited += 10;
        }
        assert!(animator.is_working(), "curve build never completed");

        clock.advance_to(0.5);
        let got = ticks.lock()[0].1;
        assert!((got - 0.5).abs() < 1e-6);
    }

    #[test]
    fn superseded_lazy_build_never_ticks() {
        let (clock, animator, ticks, completions) = harness();
        let built = Arc::new(AtomicBool::new(false));
        let built_flag = Arc::clone(&built);
        animator.start(identity_run(1.0, &ticks, &completions).bezier_curve_with(move || {
            thread::sleep(Duration::from_millis(100));
            built_flag.store(true, Ordering::SeqCst);
            BezierCurve::new(
                &[
                    CurvePoint::new(0.0, 0.0),
                    CurvePoint::new(0.0, 1.0),
                    CurvePoint::new(1.0, 1.0),
                ],
                16,
            )
        }));

        // Supersede while the build is still sleeping.
        animator.start(identity_run(1.0, &ticks, &completions));
        assert_eq!(*completions.lock(), vec![false]);

        while !built.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(10));
        }
        thread::sleep(Duration::from_millis(20));

        clock.advance_to(0.5);
        // Only the identity run publishes; the stale build was discarded.
        let ticks = ticks.lock();
        assert_eq!(ticks.len(), 1);
        assert!((ticks[0].1 - 0.5).abs() < 1e-12);
    }
}
