//! Timer programmer: prescaler/top search for a requested interrupt period.
//!
//! In clear-on-compare-match mode the counter runs at `cpu_clock / divisor`
//! and resets every `top` counts, so the achieved period is
//! `divisor * top / cpu_ticks_per_us` microseconds. For every divisor in the
//! timer's table the largest `top` not exceeding the request is computed;
//! the pair with the smallest absolute error wins, ties going to the
//! earliest divisor in the table.
//!
//! The search is pure. [`setup_timer`] runs it and, only on success, commits
//! the resulting register set to a [`TimerPeripheral`] in one call.

use pdmotor_common::error::TimerError;
use pdmotor_common::hw::{TimerPeripheral, TimerRegisters};
use pdmotor_common::types::{CounterWidth, TimerCounter, TimerMode};
use static_assertions::{const_assert, const_assert_eq};
use tracing::{info, warn};

// ─── Divisor Tables ─────────────────────────────────────────────────

/// Clock-select bit 0 (`CSn0`).
pub const CS_BIT0: u8 = 1 << 0;
/// Clock-select bit 1 (`CSn1`).
pub const CS_BIT1: u8 = 1 << 1;
/// Clock-select bit 2 (`CSn2`).
pub const CS_BIT2: u8 = 1 << 2;

/// One prescaler option of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockDivider {
    /// Prescaler ratio.
    pub denominator: u16,
    /// Clock-select bits that enable this ratio.
    pub clock_select: u8,
}

impl ClockDivider {
    pub const fn new(denominator: u16, clock_select: u8) -> Self {
        Self {
            denominator,
            clock_select,
        }
    }
}

/// Prescaler table shared by Timer/Counter0, 1 and 3.
pub const STANDARD_DIVISORS: [ClockDivider; 5] = [
    ClockDivider::new(1, CS_BIT0),
    ClockDivider::new(8, CS_BIT1),
    ClockDivider::new(64, CS_BIT1 | CS_BIT0),
    ClockDivider::new(256, CS_BIT2),
    ClockDivider::new(1024, CS_BIT2 | CS_BIT0),
];

const_assert_eq!(STANDARD_DIVISORS[0].denominator, 1);
const_assert!(STANDARD_DIVISORS[1].denominator < STANDARD_DIVISORS[2].denominator);
const_assert!(STANDARD_DIVISORS[3].denominator < STANDARD_DIVISORS[4].denominator);

/// Static description of a timer/counter: prescalers and counter width.
#[derive(Debug, Clone, Copy)]
pub struct TimerSpec {
    pub counter: TimerCounter,
    /// Candidate prescalers in enumeration (tie-break) order.
    pub divisors: &'static [ClockDivider],
    pub width: CounterWidth,
}

static TC0: TimerSpec = TimerSpec {
    counter: TimerCounter::Counter0,
    divisors: &STANDARD_DIVISORS,
    width: CounterWidth::Bits8,
};

static TC1: TimerSpec = TimerSpec {
    counter: TimerCounter::Counter1,
    divisors: &STANDARD_DIVISORS,
    width: CounterWidth::Bits16,
};

static TC3: TimerSpec = TimerSpec {
    counter: TimerCounter::Counter3,
    divisors: &STANDARD_DIVISORS,
    width: CounterWidth::Bits16,
};

/// Look up the hardware description of a timer.
pub fn timer_spec(counter: TimerCounter) -> &'static TimerSpec {
    match counter {
        TimerCounter::Counter0 => &TC0,
        TimerCounter::Counter1 => &TC1,
        TimerCounter::Counter3 => &TC3,
    }
}

// ─── Search Result ──────────────────────────────────────────────────

/// Outcome of a successful divisor/top search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgrammedTimer {
    pub counter: TimerCounter,
    pub mode: TimerMode,
    /// Selected prescaler ratio.
    pub divisor: u16,
    /// Clock-select bits for `divisor`.
    pub clock_select: u8,
    /// Compare-match value.
    pub top: u16,
    /// Requested period [µs].
    pub target_period_us: u32,
    /// Period actually produced by `divisor`/`top` [µs].
    pub achieved_period_us: u32,
    /// `|achieved - target|` [µs].
    pub error_us: u32,
}

impl ProgrammedTimer {
    /// Register set to commit to the peripheral.
    #[inline]
    pub const fn registers(&self) -> TimerRegisters {
        TimerRegisters {
            mode: self.mode,
            clock_select: self.clock_select,
            top: self.top,
        }
    }

    /// Relative deviation from the requested period (0.01 = 1%).
    pub fn relative_error(&self) -> f64 {
        if self.target_period_us == 0 {
            return 0.0;
        }
        self.error_us as f64 / self.target_period_us as f64
    }
}

/// Candidate evaluated for a single divisor.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    top: u32,
    achieved_us: u32,
    error_us: u32,
}

/// Largest feasible `top` for one divisor, or `None` when it does not fit.
///
/// A `top` of zero would make the compare unit fire on every prescaled
/// clock and is treated as infeasible.
fn find_top_value(
    target_period_us: u32,
    cpu_ticks_per_us: u32,
    divisor: u16,
    width: CounterWidth,
) -> Option<Candidate> {
    if divisor == 0 || cpu_ticks_per_us == 0 {
        return None;
    }
    let top = (cpu_ticks_per_us as u64 * target_period_us as u64) / divisor as u64;
    if top == 0 || top > width.max_top() as u64 {
        return None;
    }
    let achieved = (divisor as u64 * top) / cpu_ticks_per_us as u64;
    let achieved_us = u32::try_from(achieved).ok()?;
    Some(Candidate {
        top: top as u32,
        achieved_us,
        error_us: achieved_us.abs_diff(target_period_us),
    })
}

// ─── Programmer ─────────────────────────────────────────────────────

/// Divisor/top search parameterised by the CPU clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerProgrammer {
    cpu_ticks_per_us: u32,
}

impl TimerProgrammer {
    pub const fn new(cpu_ticks_per_us: u32) -> Self {
        Self { cpu_ticks_per_us }
    }

    #[inline]
    pub const fn cpu_ticks_per_us(&self) -> u32 {
        self.cpu_ticks_per_us
    }

    /// Find the best divisor/top pair for `target_period_us` on `counter`.
    pub fn program(
        &self,
        counter: TimerCounter,
        target_period_us: u32,
        mode: TimerMode,
    ) -> Result<ProgrammedTimer, TimerError> {
        self.program_spec(timer_spec(counter), target_period_us, mode)
    }

    /// Same as [`program`](Self::program) for an explicit timer description.
    pub fn program_spec(
        &self,
        spec: &TimerSpec,
        target_period_us: u32,
        mode: TimerMode,
    ) -> Result<ProgrammedTimer, TimerError> {
        if target_period_us == 0 {
            return Err(TimerError::ZeroPeriod {
                timer: spec.counter,
            });
        }

        let mut best: Option<(ClockDivider, Candidate)> = None;
        for divider in spec.divisors {
            let Some(candidate) = find_top_value(
                target_period_us,
                self.cpu_ticks_per_us,
                divider.denominator,
                spec.width,
            ) else {
                continue;
            };
            // Strict comparison keeps the earliest divisor on ties.
            let better = match best {
                Some((_, current)) => candidate.error_us < current.error_us,
                None => true,
            };
            if better {
                best = Some((*divider, candidate));
            }
        }

        let (divider, candidate) = best.ok_or(TimerError::NoFeasibleDivider {
            timer: spec.counter,
            period_us: target_period_us,
        })?;

        Ok(ProgrammedTimer {
            counter: spec.counter,
            mode,
            divisor: divider.denominator,
            clock_select: divider.clock_select,
            // Bounded by the counter width, which is at most 16 bits.
            top: candidate.top as u16,
            target_period_us,
            achieved_period_us: candidate.achieved_us,
            error_us: candidate.error_us,
        })
    }
}

/// Program `peripheral` for `target_period_us`.
///
/// The peripheral is untouched when no feasible divisor exists.
pub fn setup_timer<P: TimerPeripheral + ?Sized>(
    peripheral: &mut P,
    programmer: &TimerProgrammer,
    counter: TimerCounter,
    mode: TimerMode,
    target_period_us: u32,
) -> Result<ProgrammedTimer, TimerError> {
    info!(
        "Setting up timer {} (period_us: {})",
        counter, target_period_us
    );
    let programmed = programmer
        .program(counter, target_period_us, mode)
        .inspect_err(|e| warn!("Search found no workable divisor/top value pair: {e}"))?;

    peripheral.commit(programmed.registers());
    info!(
        "Setting divider: {}, top: {} (achieved {}us, error {}us)",
        programmed.divisor, programmed.top, programmed.achieved_period_us, programmed.error_us
    );
    Ok(programmed)
}

// ─── Tests ──────────────────────────────────────────────────────────
