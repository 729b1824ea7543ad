//! Monotonic millisecond tick counter.
//!
//! Advanced once per tick interrupt, read by anyone. The counter is 32 bits
//! and wraps after ~49.7 days; every interval computation goes through
//! [`elapsed_ms`] so it stays correct across the wrap.
//!
//! On a host there is no tick interrupt; [`TickPacer`] tells the loop that
//! injects ticks how long to sleep, or how many deadlines it already missed.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct TickClock {
    ticks: AtomicU32,
}

impl TickClock {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Clock preset to `ticks`, e.g. to exercise the wrap.
    pub const fn starting_at(ticks: u32) -> Self {
        Self {
            ticks: AtomicU32::new(ticks),
        }
    }

    /// Count one tick and return the new uptime [ms].
    #[inline]
    pub fn advance(&self) -> u32 {
        self.ticks.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    /// Ticks since start [ms], modulo 2^32.
    #[inline]
    pub fn uptime_ms(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }
}

/// Milliseconds from `since` to `now`, correct across one counter wrap.
#[inline]
pub const fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

// ─── Host Pacing ────────────────────────────────────────────────────

/// What the tick loop should do after finishing a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// On time: sleep until the next deadline.
    Sleep(Duration),
    /// Late: the next tick is due now and `missed` further deadlines have
    /// passed as well. Those ticks must be issued immediately.
    Behind { missed: u32 },
}

/// Deadline tracker for host-injected ticks.
#[derive(Debug, Clone)]
pub struct TickPacer {
    period: Duration,
    next: Instant,
}

impl TickPacer {
    /// First deadline one period after `start`.
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next: start + period,
        }
    }

    #[inline]
    pub fn next_deadline(&self) -> Instant {
        self.next
    }

    /// Advance past the deadlines reached by `now`.
    pub fn pace(&mut self, now: Instant) -> Pacing {
        if self.next > now {
            let wait = self.next - now;
            self.next += self.period;
            return Pacing::Sleep(wait);
        }
        let late = (now - self.next).as_nanos();
        let missed = u32::try_from(late / self.period.as_nanos().max(1)).unwrap_or(u32::MAX);
        self.next += self.period.saturating_mul(missed.saturating_add(1));
        Pacing::Behind { missed }
    }
}
