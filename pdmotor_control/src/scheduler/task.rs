//! Task declarations and per-slot bookkeeping.

use std::num::NonZeroU16;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use pdmotor_common::types::TaskState;

/// Work executed when a task is dispatched.
///
/// `C` is the context handed to every task by the dispatch loop. Closures
/// taking `&mut C` implement this trait directly.
pub trait Runnable<C: ?Sized> {
    fn run(&mut self, ctx: &mut C);
}

impl<C: ?Sized, F: FnMut(&mut C)> Runnable<C> for F {
    #[inline]
    fn run(&mut self, ctx: &mut C) {
        self(ctx)
    }
}

/// Static declaration of a periodic task.
#[derive(Debug, Clone)]
pub struct Task<R> {
    pub name: &'static str,
    /// Release period in ticks [ms].
    pub period_ms: u16,
    pub runnable: R,
}

impl<R> Task<R> {
    pub const fn new(name: &'static str, period_ms: u16, runnable: R) -> Self {
        Self {
            name,
            period_ms,
            runnable,
        }
    }
}

/// Point-in-time counters of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub name: &'static str,
    pub period_ms: u16,
    pub state: TaskState,
    /// Completed dispatches.
    pub runs: u32,
    /// Releases that found the task still Ready or Running.
    pub absorbed_releases: u32,
}

/// Registered task.
///
/// `state` is the only field shared with the tick path. The tick path only
/// performs `Idle → Ready`; dispatch performs `Ready → Running → Idle`.
#[derive(Debug)]
pub(crate) struct TaskSlot<R> {
    pub(crate) name: &'static str,
    pub(crate) period: NonZeroU16,
    pub(crate) runnable: R,
    state: AtomicU8,
    runs: u32,
    absorbed: AtomicU32,
}

impl<R> TaskSlot<R> {
    pub(crate) fn new(name: &'static str, period: NonZeroU16, runnable: R) -> Self {
        Self {
            name,
            period,
            runnable,
            state: AtomicU8::new(TaskState::Idle as u8),
            runs: 0,
            absorbed: AtomicU32::new(0),
        }
    }

    #[inline]
    pub(crate) fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn is_due(&self, tick: u32) -> bool {
        tick % u32::from(self.period.get()) == 0
    }

    /// Tick-path release. Returns `true` if the task became Ready.
    pub(crate) fn release(&self) -> bool {
        match self.state.compare_exchange(
            TaskState::Idle as u8,
            TaskState::Ready as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => true,
            Err(_) => {
                self.absorbed.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Claim a Ready task for execution.
    #[inline]
    pub(crate) fn try_start(&self) -> bool {
        self.state
            .compare_exchange(
                TaskState::Ready as u8,
                TaskState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    #[inline]
    pub(crate) fn finish(&mut self) {
        self.state.store(TaskState::Idle as u8, Ordering::Release);
        self.runs = self.runs.wrapping_add(1);
    }

    pub(crate) fn stats(&self) -> TaskStats {
        TaskStats {
            name: self.name,
            period_ms: self.period.get(),
            state: self.state(),
            runs: self.runs,
            absorbed_releases: self.absorbed.load(Ordering::Relaxed),
        }
    }
}
