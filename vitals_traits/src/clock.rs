use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Monotonic clock abstraction for acquisition timing across the stack.
///
/// - now(): returns a monotonic Instant (microsecond resolution or better)
/// - sleep(): coarse delay; implementations may yield the thread
/// - spin_for(): tight busy-wait for sub-millisecond pulses
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Busy-wait for `d` without yielding the thread.
    ///
    /// The default spins on `now()`; clocks whose `now()` does not advance on
    /// its own must override this.
    fn spin_for(&self, d: Duration) {
        let until = self.now() + d;
        while self.now() < until {
            std::hint::spin_loop();
        }
    }

    /// Microseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn us_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        dur.as_micros().min(u128::from(u64::MAX)) as u64
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> Instant {
        (**self).now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        (**self).sleep(d);
    }

    #[inline]
    fn spin_for(&self, d: Duration) {
        (**self).spin_for(d);
    }
}

/// Default, real-time monotonic clock backed by std::time::Instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

/// Deterministic clock whose time only moves when told to.
///
/// now() = origin + offset
/// sleep(d) and spin_for(d) advance internal time by d without blocking.
/// Clones share the same timeline, so a simulated device can advance the
/// clock the acquisition code is reading.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = off.saturating_add(d);
        }
    }

    /// Time elapsed since this clock was created.
    pub fn elapsed(&self) -> Duration {
        self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }

    fn spin_for(&self, d: Duration) {
        self.advance(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);
        clock.sleep(Duration::from_millis(2));
        clock.spin_for(Duration::from_micros(10));
        assert_eq!(clock.us_since(t0), 2_010);
    }

    #[test]
    fn clones_share_a_timeline() {
        let a = ManualClock::new();
        let b = a.clone();
        b.advance(Duration::from_micros(250));
        assert_eq!(a.elapsed(), Duration::from_micros(250));
    }

    #[test]
    fn monotonic_spin_waits_at_least_requested() {
        let clock = MonotonicClock::new();
        let t0 = clock.now();
        clock.spin_for(Duration::from_micros(50));
        assert!(clock.us_since(t0) >= 50);
    }
}
