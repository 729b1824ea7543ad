//! Error taxonomy of the control core.
//!
//! Configuration-time errors (timer programming, task table) halt startup.
//! Runtime conditions (full target queue, malformed commands) are reported
//! to the caller and never stop the control loop.

use thiserror::Error;

use crate::types::TimerCounter;

/// Timer programming failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimerError {
    /// No prescaler keeps `top` within the counter width for this period.
    #[error("no feasible divider for {period_us}us on {timer}")]
    NoFeasibleDivider {
        /// Timer that was searched.
        timer: TimerCounter,
        /// Requested period [µs].
        period_us: u32,
    },

    /// A zero period cannot be programmed.
    #[error("requested period on {timer} is zero")]
    ZeroPeriod {
        /// Timer that was requested.
        timer: TimerCounter,
    },
}

/// Task table configuration errors, reported by scheduler init.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// More tasks than the fixed table holds.
    #[error("task table full: capacity {capacity}, rejected task '{name}'")]
    TaskTableFull {
        /// Table capacity.
        capacity: usize,
        /// First task that did not fit.
        name: &'static str,
    },

    /// A task declared a zero period.
    #[error("task '{name}' has invalid period 0ms")]
    InvalidPeriod {
        /// Offending task.
        name: &'static str,
    },
}

/// Interpolator queue errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InterpolatorError {
    /// The target queue is at capacity; the target was dropped.
    #[error("target queue full ({capacity} entries), dropped target {position} deg")]
    TargetQueueFull {
        /// Queue capacity.
        capacity: usize,
        /// Rejected absolute position [deg].
        position: i32,
    },
}

/// Command interface errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command \"{0}\"")]
    UnknownVerb(String),

    #[error("command '{verb}' requires an argument")]
    MissingArgument {
        /// Verb that was missing its argument.
        verb: &'static str,
    },

    #[error("invalid number \"{0}\"")]
    InvalidNumber(String),

    #[error("invalid argument \"{value}\" for '{verb}'")]
    InvalidArgument {
        /// Verb the argument belongs to.
        verb: &'static str,
        /// Rejected argument text.
        value: String,
    },

    #[error("command line exceeds {capacity} bytes, discarded")]
    LineTooLong {
        /// Line buffer capacity.
        capacity: usize,
    },
}
