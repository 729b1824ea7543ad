//! Rig assembly: tick clock, task table and motor system.
//!
//! Four tasks are registered in this order, which is also their dispatch
//! priority:
//!
//! | Task         | Work                                   |
//! |--------------|----------------------------------------|
//! | interpolator | end-zone state machine, target retire  |
//! | velocity     | finite-difference velocity estimate    |
//! | controller   | PD law, torque write                   |
//! | status       | status snapshot for the operator       |
//!
//! [`MotorRig::tick`] is the body of the tick interrupt: advance the clock,
//! release due tasks. [`MotorRig::dispatch`] is one pass of the main loop.

use std::fmt;

use pdmotor_common::config::{ConfigError, RigConfig};
use pdmotor_common::consts::TARGET_QUEUE_CAPACITY;
use pdmotor_common::error::{CommandError, InterpolatorError, SchedulerError, TimerError};
use pdmotor_common::hw::{MotorDriver, PositionSensor, TimerPeripheral};
use pdmotor_common::types::EndzoneState;
use thiserror::Error;
use tracing::{debug, info};

use crate::clock::TickClock;
use crate::command::{Command, GainChange, LoggingChange};
use crate::control::{ControllerStatus, PdController};
use crate::interpolator::Interpolator;
use crate::scheduler::{Runnable, Scheduler, Task};
use crate::timer::{ProgrammedTimer, TimerProgrammer, setup_timer};

// ─── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RigError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Interpolator(#[from] InterpolatorError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

// ─── Tasks ──────────────────────────────────────────────────────────

/// Periodic work items of the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlTask {
    ServiceInterpolator,
    ServiceVelocity,
    ServiceController,
    ReportStatus,
}

impl ControlTask {
    pub const fn name(self) -> &'static str {
        match self {
            Self::ServiceInterpolator => "interpolator",
            Self::ServiceVelocity => "velocity",
            Self::ServiceController => "controller",
            Self::ReportStatus => "status",
        }
    }
}

/// Context handed to every [`ControlTask`] on dispatch.
pub struct TaskContext<'a, H, const N: usize = TARGET_QUEUE_CAPACITY> {
    pub clock: &'a TickClock,
    pub system: &'a mut MotorSystem<H, N>,
}

impl<H, const N: usize> Runnable<TaskContext<'_, H, N>> for ControlTask
where
    H: PositionSensor + MotorDriver,
{
    fn run(&mut self, ctx: &mut TaskContext<'_, H, N>) {
        let now = ctx.clock.uptime_ms();
        let system = &mut *ctx.system;
        match self {
            Self::ServiceInterpolator => {
                system.interpolator.service(&system.hardware, now);
            }
            Self::ServiceVelocity => {
                system.interpolator.service_velocity(&system.hardware, now);
            }
            Self::ServiceController => {
                system
                    .controller
                    .service(&system.interpolator, &mut system.hardware);
            }
            Self::ReportStatus => {
                let status = system.status(now);
                debug!("{status}");
                system.last_status = Some(status);
            }
        }
    }
}

// ─── Motor System ───────────────────────────────────────────────────

/// Everything the tasks operate on.
#[derive(Debug)]
pub struct MotorSystem<H, const N: usize = TARGET_QUEUE_CAPACITY> {
    pub hardware: H,
    pub interpolator: Interpolator<N>,
    pub controller: PdController,
    last_status: Option<RigStatus>,
}

impl<H, const N: usize> MotorSystem<H, N>
where
    H: PositionSensor + MotorDriver,
{
    pub fn new(config: &RigConfig, hardware: H) -> Self {
        Self {
            hardware,
            interpolator: Interpolator::new(config.interpolator),
            controller: PdController::new(&config.controller),
            last_status: None,
        }
    }

    /// Snapshot of positions, queue and controller at `uptime_ms`.
    pub fn status(&self, uptime_ms: u32) -> RigStatus {
        let position = self.interpolator.current_position(&self.hardware);
        RigStatus {
            uptime_ms,
            position,
            target: self.interpolator.target_for(position),
            absolute_target: self.interpolator.absolute_target_position(&self.hardware),
            velocity: self.interpolator.current_velocity(),
            queue_len: self.interpolator.queue_len(),
            endzone: self.interpolator.endzone_state(),
            controller: self.controller.status(),
        }
    }

    /// Snapshot taken by the most recent status task run.
    pub fn last_status(&self) -> Option<&RigStatus> {
        self.last_status.as_ref()
    }
}

/// Operator-facing status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RigStatus {
    pub uptime_ms: u32,
    /// Current position [deg].
    pub position: i32,
    /// Rate-limited effective target [deg].
    pub target: i32,
    /// Head of the target queue [deg].
    pub absolute_target: i32,
    /// Velocity estimate [deg/s].
    pub velocity: i32,
    pub queue_len: usize,
    pub endzone: EndzoneState,
    pub controller: ControllerStatus,
}

impl fmt::Display for RigStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:03}s pos={} tgt={} ({}) vel={} trq={} q={} kp={} kd={}",
            self.uptime_ms / 1000,
            self.uptime_ms % 1000,
            self.position,
            self.target,
            self.absolute_target,
            self.velocity,
            self.controller.last_torque,
            self.queue_len,
            self.controller.kp,
            self.controller.kd,
        )?;
        if self.endzone.is_in_endzone() {
            f.write_str(" [endzone]")?;
        }
        if self.controller.paused {
            f.write_str(" [paused]")?;
        }
        Ok(())
    }
}

// ─── Commands ───────────────────────────────────────────────────────

/// Result of an accepted operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Accepted,
    Status(RigStatus),
    Help,
}

// ─── Rig ────────────────────────────────────────────────────────────

/// Tick clock, scheduler and control system of one motor.
pub struct MotorRig<H, const N: usize = TARGET_QUEUE_CAPACITY> {
    clock: TickClock,
    scheduler: Scheduler<ControlTask>,
    system: MotorSystem<H, N>,
    tick_timer: Option<ProgrammedTimer>,
}

impl<H, const N: usize> MotorRig<H, N>
where
    H: PositionSensor + MotorDriver,
{
    /// Build the rig without programming a tick timer.
    pub fn new(config: &RigConfig, hardware: H) -> Result<Self, RigError> {
        config.validate()?;
        let periods = &config.tasks;
        let scheduler = Scheduler::init([
            Task::new(
                ControlTask::ServiceInterpolator.name(),
                periods.interpolator_ms,
                ControlTask::ServiceInterpolator,
            ),
            Task::new(
                ControlTask::ServiceVelocity.name(),
                periods.velocity_ms,
                ControlTask::ServiceVelocity,
            ),
            Task::new(
                ControlTask::ServiceController.name(),
                periods.controller_ms,
                ControlTask::ServiceController,
            ),
            Task::new(
                ControlTask::ReportStatus.name(),
                periods.status_ms,
                ControlTask::ReportStatus,
            ),
        ])?;

        Ok(Self {
            clock: TickClock::new(),
            scheduler,
            system: MotorSystem::new(config, hardware),
            tick_timer: None,
        })
    }

    /// Program the tick timer on `peripheral`, then build the rig.
    ///
    /// Timer programming failure is fatal: the rig has no time base.
    pub fn start<P>(config: &RigConfig, hardware: H, peripheral: &mut P) -> Result<Self, RigError>
    where
        P: TimerPeripheral + ?Sized,
    {
        config.validate()?;
        let programmer = TimerProgrammer::new(config.timer.cpu_ticks_per_us);
        let programmed = setup_timer(
            peripheral,
            &programmer,
            config.timer.counter,
            config.timer.mode,
            config.timer.tick_period_us,
        )?;
        let mut rig = Self::new(config, hardware)?;
        rig.tick_timer = Some(programmed);
        info!(
            "Rig '{}' started with {} tasks",
            config.shared.service_name,
            rig.scheduler.len()
        );
        Ok(rig)
    }

    /// Tick interrupt body. Returns the new uptime [ms].
    #[inline]
    pub fn tick(&self) -> u32 {
        let now = self.clock.advance();
        self.scheduler.release(now);
        now
    }

    /// One main-loop pass: run every Ready task.
    pub fn dispatch(&mut self) -> usize {
        let mut ctx = TaskContext {
            clock: &self.clock,
            system: &mut self.system,
        };
        self.scheduler.dispatch(&mut ctx)
    }

    /// Tick once and dispatch.
    pub fn step(&mut self) -> usize {
        self.tick();
        self.dispatch()
    }

    /// Apply an operator command.
    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome, RigError> {
        let system = &mut self.system;
        let controller = &mut system.controller;
        match command {
            Command::AddTarget(position) => system.interpolator.add_target(position)?,
            Command::AddRelativeTarget(delta) => system
                .interpolator
                .add_relative_target(&system.hardware, delta)?,
            Command::Kp(GainChange::Set(kp)) => controller.set_kp(kp),
            Command::Kp(GainChange::Adjust(delta)) => controller.adjust_kp(delta),
            Command::Kd(GainChange::Set(kd)) => controller.set_kd(kd),
            Command::Kd(GainChange::Adjust(delta)) => controller.adjust_kd(delta),
            Command::Logging(change) => {
                let enabled = match change {
                    LoggingChange::On => true,
                    LoggingChange::Off => false,
                    LoggingChange::Toggle => !controller.logging(),
                };
                controller.set_logging(enabled);
            }
            Command::Pause => controller.pause(),
            Command::Resume => controller.resume(),
            Command::PollRate(divisor) => controller.set_poll_divisor(divisor),
            Command::ClearTargets => system.interpolator.clear_targets(),
            Command::Status => return Ok(CommandOutcome::Status(self.status())),
            Command::Help => return Ok(CommandOutcome::Help),
        }
        debug!("Applied {:?}", command);
        Ok(CommandOutcome::Accepted)
    }

    /// Parse and apply one command line.
    pub fn execute_line(&mut self, line: &str) -> Result<CommandOutcome, RigError> {
        let command: Command = line.parse()?;
        self.execute(command)
    }

    // ─── Accessors ──────────────────────────────────────────────────

    pub fn status(&self) -> RigStatus {
        self.system.status(self.clock.uptime_ms())
    }

    #[inline]
    pub fn uptime_ms(&self) -> u32 {
        self.clock.uptime_ms()
    }

    #[inline]
    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    #[inline]
    pub fn scheduler(&self) -> &Scheduler<ControlTask> {
        &self.scheduler
    }

    #[inline]
    pub fn system(&self) -> &MotorSystem<H, N> {
        &self.system
    }

    #[inline]
    pub fn system_mut(&mut self) -> &mut MotorSystem<H, N> {
        &mut self.system
    }

    #[inline]
    pub fn hardware(&self) -> &H {
        &self.system.hardware
    }

    #[inline]
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.system.hardware
    }

    /// Tick timer programming, when started through [`start`](Self::start).
    #[inline]
    pub fn tick_timer(&self) -> Option<&ProgrammedTimer> {
        self.tick_timer.as_ref()
    }
}
