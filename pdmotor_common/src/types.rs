//! Shared enums used by the control core and its configuration.

use serde::{Deserialize, Serialize};

// ─── Timer Selection ────────────────────────────────────────────────

/// Hardware timer/counter instance.
///
/// Counter2 is reserved by the board support package and is not offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimerCounter {
    /// 8-bit Timer/Counter0 (drives the system tick).
    #[default]
    Counter0,
    /// 16-bit Timer/Counter1.
    Counter1,
    /// 16-bit Timer/Counter3.
    Counter3,
}

impl TimerCounter {
    /// Diagnostic name used in log output.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Counter0 => "TIMER_COUNTER0",
            Self::Counter1 => "TIMER_COUNTER1",
            Self::Counter3 => "TIMER_COUNTER3",
        }
    }
}

impl std::fmt::Display for TimerCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Waveform generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Clear timer on compare match: periodic interrupt every `top` counts.
    #[default]
    ClearOnCompareMatch,
}

/// Counter register width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterWidth {
    Bits8,
    Bits16,
}

impl CounterWidth {
    /// Largest compare value the counter can hold.
    #[inline]
    pub const fn max_top(self) -> u32 {
        match self {
            Self::Bits8 => 0x00FF,
            Self::Bits16 => 0xFFFF,
        }
    }
}

// ─── Scheduler ──────────────────────────────────────────────────────

/// Release state of a periodic task.
///
/// `Idle → Ready` happens in the tick path; `Ready → Running → Idle`
/// happens in the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TaskState {
    #[default]
    Idle = 0,
    Ready = 1,
    Running = 2,
}

impl TaskState {
    /// Decode from the raw representation stored in an atomic.
    ///
    /// Unknown values decode as `Idle`.
    #[inline]
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Ready,
            2 => Self::Running,
            _ => Self::Idle,
        }
    }
}

// ─── Interpolator ───────────────────────────────────────────────────

/// Dwell state machine of the interpolator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EndzoneState {
    /// Not yet close enough to the head target.
    #[default]
    OutOfEndzone,
    /// Close enough; dwelling since `entered_ms`.
    InEndzone {
        /// Uptime [ms] at which the end-zone was entered.
        entered_ms: u32,
    },
}

impl EndzoneState {
    #[inline]
    pub const fn is_in_endzone(&self) -> bool {
        matches!(self, Self::InEndzone { .. })
    }
}
