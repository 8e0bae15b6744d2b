//! Time source and the auto-deselect deadline.
//!
//! The editor never spawns timers. It keeps one deadline and the host either
//! polls [`crate::Editor::tick`] from its frame loop or schedules a single
//! callback at [`DeselectTimer::deadline`].

use std::cell::Cell;
use std::rc::Rc;

use web_time::{Duration, Instant};

/// Default auto-deselect window.
pub const DEFAULT_DESELECT_AFTER: Duration = Duration::from_secs(3);

/// Source of monotonic time.
pub trait Clock: std::fmt::Debug {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Wall clock: `std::time` natively, `performance.now()` on wasm.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for tests and replayed command scripts.
///
/// Clones share the same time, so a test can keep one handle and advance the
/// clock owned by an editor.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    /// Start at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Debounced one-shot deadline.
#[derive(Debug, Clone)]
pub struct DeselectTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl DeselectTimer {
    /// Create a disarmed timer.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self { window, deadline: None }
    }

    /// Arm (or re-arm) the deadline `window` after `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Cancel the pending deadline.
    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// The live deadline, if armed.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether a deadline is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The debounce window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for DeselectTimer {
    fn default() -> Self {
        Self::new(DEFAULT_DESELECT_AFTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_window() {
        let clock = ManualClock::new();
        let mut timer = DeselectTimer::default();
        timer.arm(clock.now());

        clock.advance(Duration::from_millis(2_999));
        assert!(!timer.poll(clock.now()));

        clock.advance(Duration::from_millis(1));
        assert!(timer.poll(clock.now()));
        assert!(!timer.poll(clock.now()));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_rearm_debounces() {
        let clock = ManualClock::new();
        let mut timer = DeselectTimer::default();
        timer.arm(clock.now());
        clock.advance(Duration::from_millis(2_900));
        timer.arm(clock.now());
        clock.advance(Duration::from_millis(2_900));
        assert!(!timer.poll(clock.now()));
        clock.advance(Duration::from_millis(100));
        assert!(timer.poll(clock.now()));
    }

    #[test]
    fn test_disarm() {
        let clock = ManualClock::new();
        let mut timer = DeselectTimer::new(Duration::from_millis(10));
        timer.arm(clock.now());
        timer.disarm();
        clock.advance(Duration::from_secs(1));
        assert!(!timer.poll(clock.now()));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let before = clock.now();
        handle.advance(Duration::from_secs(5));
        assert_eq!(clock.now() - before, Duration::from_secs(5));
    }
}
