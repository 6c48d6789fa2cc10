//! Time source and periodic ticker for samplers

use crate::services::cancel::CancellationToken;

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The deadline was reached
    Tick,
    /// The cancellation signal was raised
    Cancelled,
}

/// Monotonic time source
///
/// Samplers never read the wall clock directly so tests can substitute a
/// manually advanced clock.
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;

    /// Block until `deadline` or cancellation, whichever comes first
    fn wait_until(&self, deadline: Duration, cancel: &CancellationToken) -> Wake;
}

/// Clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wait_until(&self, deadline: Duration, cancel: &CancellationToken) -> Wake {
        loop {
            if cancel.is_cancelled() {
                return Wake::Cancelled;
            }
            let now = self.now();
            if now >= deadline {
                return Wake::Tick;
            }
            if cancel.wait_timeout(deadline - now) {
                return Wake::Cancelled;
            }
        }
    }
}

/// Fixed-period ticker
///
/// Ticks fall on multiples of the period from creation. Ticks missed while
/// the owner was busy are dropped rather than delivered in a burst.
pub struct Ticker {
    clock: Arc<dyn Clock>,
    period: Duration,
    next: Duration,
}

impl Ticker {
    pub fn new(clock: Arc<dyn Clock>, period: Duration) -> Self {
        let next = clock.now() + period;
        Self {
            clock,
            period,
            next,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick or cancellation
    pub fn tick(&mut self, cancel: &CancellationToken) -> Wake {
        let wake = self.clock.wait_until(self.next, cancel);
        if wake == Wake::Tick {
            let now = self.clock.now();
            self.next += self.period;
            while self.next <= now && !self.period.is_zero() {
                self.next += self.period;
            }
        }
        wake
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ManualClock;

    #[test]
    fn test_system_clock_reaches_deadline() {
        let clock = SystemClock::new();
        let cancel = CancellationToken::new();
        let deadline = clock.now() + Duration::from_millis(15);

        assert_eq!(clock.wait_until(deadline, &cancel), Wake::Tick);
        assert!(clock.now() >= deadline);
    }

    #[test]
    fn test_system_clock_cancelled_first() {
        let clock = SystemClock::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(
            clock.wait_until(Duration::from_secs(3600), &cancel),
            Wake::Cancelled
        );
    }

    #[test]
    fn test_ticker_drops_missed_ticks() {
        let clock = Arc::new(ManualClock::new());
        let cancel = CancellationToken::new();
        let mut ticker = Ticker::new(clock.clone(), Duration::from_secs(10));

        // Three periods pass at once: one tick, then the schedule realigns
        clock.advance(Duration::from_secs(35));
        assert_eq!(ticker.tick(&cancel), Wake::Tick);
        assert_eq!(ticker.next, Duration::from_secs(40));
    }

    #[test]
    fn test_ticker_cancelled() {
        let clock = Arc::new(ManualClock::new());
        let cancel = CancellationToken::new();
        let mut ticker = Ticker::new(clock, Duration::from_secs(10));

        cancel.cancel();
        assert_eq!(ticker.tick(&cancel), Wake::Cancelled);
    }
}
