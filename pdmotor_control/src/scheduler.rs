//! Cooperative periodic task scheduler.
//!
//! A fixed table of tasks is registered once. Each tick, [`Scheduler::release`]
//! marks every task whose period divides the tick count as Ready; the main
//! loop then calls [`Scheduler::dispatch`], which runs Ready tasks to
//! completion in registration order. There is no preemption between tasks:
//! priority is registration order, and a release that arrives while a task
//! is still Ready or Running collapses into the pending one.
//!
//! Releasing only needs `&self`, so it can be driven from a tick interrupt
//! (or another thread) while dispatch holds the table mutably in the main
//! loop. The only shared word per task is its atomic state.

mod task;

pub use task::{Runnable, Task, TaskStats};

use std::num::NonZeroU16;

use heapless::Vec;
use pdmotor_common::consts::MAX_TASKS;
use pdmotor_common::error::SchedulerError;
use pdmotor_common::types::TaskState;
use tracing::{debug, trace};

use task::TaskSlot;

/// Fixed table of periodic tasks, released by the tick and run by `dispatch`.
pub struct Scheduler<R, const N: usize = MAX_TASKS> {
    tasks: Vec<TaskSlot<R>, N>,
}

impl<R, const N: usize> Scheduler<R, N> {
    /// Register `tasks` in order. Fails on a zero period or when more than
    /// `N` tasks are supplied.
    pub fn init<I>(tasks: I) -> Result<Self, SchedulerError>
    where
        I: IntoIterator<Item = Task<R>>,
    {
        let mut table = Vec::new();
        for task in tasks {
            let period = NonZeroU16::new(task.period_ms)
                .ok_or(SchedulerError::InvalidPeriod { name: task.name })?;
            let name = task.name;
            table
                .push(TaskSlot::new(name, period, task.runnable))
                .map_err(|_| SchedulerError::TaskTableFull { capacity: N, name })?;
            debug!("Registered task '{}' every {}ms", name, period);
        }
        Ok(Self { tasks: table })
    }

    /// Tick-path release for `tick`. Returns how many tasks became Ready.
    pub fn release(&self, tick: u32) -> usize {
        let mut released = 0;
        for slot in self.tasks.iter().filter(|slot| slot.is_due(tick)) {
            if slot.release() {
                released += 1;
            } else {
                trace!("Release of '{}' absorbed at tick {}", slot.name, tick);
            }
        }
        released
    }

    /// Run every Ready task once, in registration order. Returns the number
    /// of tasks executed.
    pub fn dispatch<C: ?Sized>(&mut self, ctx: &mut C) -> usize
    where
        R: Runnable<C>,
    {
        let mut executed = 0;
        for slot in self.tasks.iter_mut() {
            if !slot.try_start() {
                continue;
            }
            trace!(task = slot.name, "Dispatching");
            slot.runnable.run(ctx);
            slot.finish();
            executed += 1;
        }
        executed
    }

    /// Tasks currently Ready.
    pub fn pending(&self) -> usize {
        self.tasks
            .iter()
            .filter(|slot| slot.state() == TaskState::Ready)
            .count()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn task_state(&self, index: usize) -> Option<TaskState> {
        self.tasks.get(index).map(|slot| slot.state())
    }

    pub fn task_stats(&self, index: usize) -> Option<TaskStats> {
        self.tasks.get(index).map(|slot| slot.stats())
    }

    /// Counters for every task, in registration order.
    pub fn stats(&self) -> impl Iterator<Item = TaskStats> + '_ {
        self.tasks.iter().map(|slot| slot.stats())
    }

    /// Registered runnables, in registration order.
    pub fn runnables(&self) -> impl Iterator<Item = (&'static str, &R)> + '_ {
        self.tasks.iter().map(|slot| (slot.name, &slot.runnable))
    }
}
