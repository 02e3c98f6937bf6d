//! Frame clock abstraction.
//!
//! The driver is clock-agnostic: anything that reports a monotonic "now"
//! and delivers one callback per display refresh can drive animations.
//! [`ThreadClock`] stands in for a platform display link; [`ManualClock`]
//! is a deterministic source for headless tests.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Callback invoked once per refresh with the clock's monotonic timestamp
/// in seconds.
pub type FrameCallback = Box<dyn FnMut(f64) + Send>;

/// A source of per-refresh callbacks sharing a monotonic timebase.
pub trait FrameClock: Send + Sync {
    /// Current monotonic time in seconds.
    fn now(&self) -> f64;

    /// Begin delivering per-refresh callbacks. Delivery stops when the
    /// returned subscription is invalidated or dropped.
    fn subscribe(&self, callback: FrameCallback) -> FrameSubscription;

    /// Target refresh rate hint.
    fn frames_per_second(&self) -> u32 {
        60
    }
}

/// Handle to an active frame subscription.
///
/// The handle is the single owner of its slot in the clock: dropping it
/// invalidates the subscription, so a leaked run can never keep callbacks
/// firing.
#[derive(Debug)]
pub struct FrameSubscription {
    active: Arc<AtomicBool>,
}

impl FrameSubscription {
    pub fn new(active: Arc<AtomicBool>) -> Self {
        Self { active }
    }

    /// Stop callback delivery.
    pub fn invalidate(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl Drop for FrameSubscription {
    fn drop(&mut self) {
        self.invalidate();
    }
}

/// A clock driven by a dedicated thread ticking at a fixed rate.
///
/// Callbacks fire on the clock's thread. The rate is set at construction;
/// pass the screen's preferred rate in rather than reading global display
/// state.
#[derive(Debug)]
pub struct ThreadClock {
    fps: u32,
    epoch: Instant,
}

impl ThreadClock {
    pub fn new(fps: u32) -> Self {
        Self {
            fps: fps.max(1),
            epoch: Instant::now(),
        }
    }
}

impl Default for ThreadClock {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FrameClock for ThreadClock {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    fn subscribe(&self, mut callback: FrameCallback) -> FrameSubscription {
        let active = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&active);
        let period = Duration::from_secs_f64(1.0 / f64::from(self.fps));
        let epoch = self.epoch;
        thread::spawn(move || {
            while flag.load(Ordering::Acquire) {
                thread::sleep(period);
                if !flag.load(Ordering::Acquire) {
                    break;
                }
                callback(epoch.elapsed().as_secs_f64());
            }
        });
        FrameSubscription::new(active)
    }

    fn frames_per_second(&self) -> u32 {
        self.fps
    }
}

struct Subscriber {
    active: Arc<AtomicBool>,
    callback: FrameCallback,
}

/// A manually advanced clock for deterministic, headless testing.
///
/// Time only moves when told to; every advance delivers exactly one frame
/// to each live subscriber, on the calling thread.
#[derive(Default)]
pub struct ManualClock {
    now: Mutex<f64>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock to an absolute timestamp and fire one frame.
    pub fn advance_to(&self, timestamp: f64) {
        *self.now.lock() = timestamp;
        self.fire();
    }

    /// Advance by `dt` seconds and fire one frame.
    pub fn advance_by(&self, dt: f64) {
        *self.now.lock() += dt;
        self.fire();
    }

    /// Deliver one frame at the current timestamp to every live subscriber.
    pub fn fire(&self) {
        let now = *self.now.lock();
        // Callbacks run outside the subscriber lock so they may subscribe
        // or invalidate without deadlocking.
        let mut current = std::mem::take(&mut *self.subscribers.lock());
        current.retain_mut(|sub| {
            if !sub.active.load(Ordering::Acquire) {
                return false;
            }
            (sub.callback)(now);
            sub.active.load(Ordering::Acquire)
        });
        let mut subscribers = self.subscribers.lock();
        let added_during_fire = std::mem::replace(&mut *subscribers, current);
        subscribers.extend(added_during_fire);
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock()
    }

    fn subscribe(&self, callback: FrameCallback) -> FrameSubscription {
        let active = Arc::new(AtomicBool::new(true));
        self.subscribers.lock().push(Subscriber {
            active: Arc::clone(&active),
            callback,
        });
        FrameSubscription::new(active)
    }
}
