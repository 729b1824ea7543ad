//! Prelude module for common re-exports.
//!
//! ```rust
//! use pdmotor_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, ControllerConfig, InterpolatorConfig, LogLevel, RigConfig,
    SharedConfig, TaskPeriods, TimerConfig,
};

// ─── Hardware Capabilities ──────────────────────────────────────────
pub use crate::hw::{MotorDriver, PositionSensor, TimerPeripheral, TimerRegisters};

// ─── Errors ─────────────────────────────────────────────────────────
pub use crate::error::{CommandError, InterpolatorError, SchedulerError, TimerError};

// ─── Shared Types ───────────────────────────────────────────────────
pub use crate::types::{CounterWidth, EndzoneState, TaskState, TimerCounter, TimerMode};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{
    MAX_TASKS, MAX_TORQUE, TARGET_QUEUE_CAPACITY, TICK_PERIOD_US, TRANSITIONS_PER_REVOLUTION,
};
