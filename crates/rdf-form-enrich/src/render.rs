//! Render coalescing
//!
//! [`RenderScheduler`] is a trailing-edge debounce modelled as an explicit
//! state machine:
//!
//! ```text
//! Idle ──request──▶ Pending(deadline) ──tick ≥ deadline──▶ Idle (+1 redraw)
//!                       │  ▲
//!                       └──┘ request: deadline = now + window
//! ```
//!
//! Time comes from an injectable [`Clock`]. Tests drive the machine with a
//! [`ManualClock`] and explicit [`RenderScheduler::tick`] calls; production
//! code runs a [`RenderDriver`] task that sleeps until the deadline.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Tokio's clock; honours paused time in tests
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Create clock frozen at the current instant
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::default(),
        }
    }

    /// Move forward by `by`
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Nothing to draw
    Idle,
    /// A redraw fires once `deadline` has passed
    Pending {
        /// When the coalesced redraw fires
        deadline: Instant,
    },
}

/// Downstream redraw trigger
pub type RedrawFn = Arc<dyn Fn() + Send + Sync>;

struct Inner {
    state: Mutex<RenderState>,
    window: Duration,
    clock: Arc<dyn Clock>,
    redraw: RedrawFn,
    armed: Notify,
    redraws: AtomicU64,
}

/// Coalesces redraw requests into one redraw per quiet window
#[derive(Clone)]
pub struct RenderScheduler {
    inner: Arc<Inner>,
}

impl RenderScheduler {
    /// Create scheduler using tokio's clock
    pub fn new(window: Duration, redraw: RedrawFn) -> Self {
        Self::with_clock(window, Arc::new(TokioClock), redraw)
    }

    /// Create scheduler with a custom clock
    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>, redraw: RedrawFn) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(RenderState::Idle),
                window,
                clock,
                redraw,
                armed: Notify::new(),
                redraws: AtomicU64::new(0),
            }),
        }
    }

    /// Ask for a redraw; re-arms the pending timer if one is armed
    pub fn request_render(&self) {
        let deadline = self.inner.clock.now() + self.inner.window;
        *self.inner.state.lock() = RenderState::Pending { deadline };
        self.inner.armed.notify_one();
    }

    /// Fire the redraw if the deadline has passed
    ///
    /// Returns whether a redraw was invoked.
    pub fn tick(&self) -> bool {
        {
            let mut state = self.inner.state.lock();
            match *state {
                RenderState::Pending { deadline } if self.inner.clock.now() >= deadline => {
                    *state = RenderState::Idle;
                }
                _ => return false,
            }
        }
        self.inner.redraws.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("coalesced redraw");
        (self.inner.redraw)();
        true
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> RenderState {
        *self.inner.state.lock()
    }

    /// Deadline of the pending redraw
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        match self.state() {
            RenderState::Idle => None,
            RenderState::Pending { deadline } => Some(deadline),
        }
    }

    /// Number of redraws fired so far
    #[must_use]
    pub fn redraw_count(&self) -> u64 {
        self.inner.redraws.load(Ordering::Relaxed)
    }

    /// Coalescing window
    #[must_use]
    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Spawn the background task that fires redraws on time
    ///
    /// Sleeps on tokio's timer, so it is meant for schedulers on
    /// [`TokioClock`]. Must be called within a tokio runtime.
    #[must_use]
    pub fn spawn_driver(&self) -> RenderDriver {
        let scheduler = self.clone();
        RenderDriver {
            task: tokio::spawn(async move { scheduler.drive().await }),
        }
    }

    async fn drive(self) {
        loop {
            match self.deadline() {
                None => self.inner.armed.notified().await,
                Some(deadline) => {
                    tokio::select! {
                        () = tokio::time::sleep_until(deadline) => {
                            self.tick();
                        }
                        () = self.inner.armed.notified() => {}
                    }
                }
            }
        }
    }
}

impl fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("state", &self.state())
            .field("window", &self.inner.window)
            .field("redraws", &self.redraw_count())
            .finish_non_exhaustive()
    }
}

/// Background redraw task; stops when dropped
#[derive(Debug)]
pub struct RenderDriver {
    task: JoinHandle<()>,
}

impl Drop for RenderDriver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting(clock: Arc<dyn Clock>) -> (RenderScheduler, Arc<AtomicU64>) {
        let count = Arc::new(AtomicU64::new(0));
        let seen = count.clone();
        let scheduler = RenderScheduler::with_clock(
            Duration::from_millis(100),
            clock,
            Arc::new(move || {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (scheduler, count)
    }

    #[test]
    fn ten_requests_in_window_draw_once() {
        let clock = ManualClock::new();
        let (scheduler, count) = counting(Arc::new(clock.clone()));

        for _ in 0..10 {
            scheduler.request_render();
            clock.advance(Duration::from_millis(5));
            assert!(!scheduler.tick());
        }
        clock.advance(Duration::from_millis(100));

        assert!(scheduler.tick());
        assert!(!scheduler.tick());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.state(), RenderState::Idle);
    }

    #[test]
    fn request_rearms_deadline() {
        let clock = ManualClock::new();
        let (scheduler, count) = counting(Arc::new(clock.clone()));

        scheduler.request_render();
        clock.advance(Duration::from_millis(90));
        scheduler.request_render();
        clock.advance(Duration::from_millis(20));

        // 110ms after the first request, 20ms after the second.
        assert!(!scheduler.tick());
        clock.advance(Duration::from_millis(80));
        assert!(scheduler.tick());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn idle_tick_does_nothing() {
        let (scheduler, count) = counting(Arc::new(ManualClock::new()));
        assert!(!scheduler.tick());
        assert_eq!(scheduler.deadline(), None);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn driver_fires_after_window() {
        let (scheduler, count) = counting(Arc::new(TokioClock));
        let _driver = scheduler.spawn_driver();

        for _ in 0..10 {
            scheduler.request_render();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.redraw_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_draw_separately() {
        let (scheduler, count) = counting(Arc::new(TokioClock));
        let _driver = scheduler.spawn_driver();

        scheduler.request_render();
        tokio::time::sleep(Duration::from_millis(200)).await;
        scheduler.request_render();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
