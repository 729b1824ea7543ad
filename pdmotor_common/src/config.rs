//! Rig configuration types and TOML loading.
//!
//! Every field has a serde default, so an empty file (or no file at all)
//! yields the stock rig. Unknown keys are rejected to catch typos early.
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! log_level = "debug"
//! service_name = "bench-rig"
//!
//! [timer]
//! counter = "counter0"
//! tick_period_us = 1000
//!
//! [tasks]
//! controller_ms = 5
//!
//! [controller]
//! kp = 2500
//! kd = 120
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::consts::{
    CLOSE_ENOUGH_DEGREES, CONTROLLER_PERIOD_MS, CPU_TICKS_PER_US, DEFAULT_KD, DEFAULT_KP,
    DEFAULT_POLL_DIVISOR, ENDZONE_MS, GAIN_SCALE, INTERPOLATOR_PERIOD_MS, MAX_DELTA_DEGREES,
    MAX_TORQUE, STATUS_PERIOD_MS, TICK_PERIOD_US, TRANSITIONS_PER_REVOLUTION, VELOCITY_PERIOD_MS,
};
use crate::types::{TimerCounter, TimerMode};

// ─── Error Type ─────────────────────────────────────────────────────

/// Configuration loading/validation error.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the given path.
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// File could not be read.
    #[error("failed to read configuration: {0}")]
    Io(String),

    /// TOML parsing failed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A value is outside its allowed range.
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

// ─── Bounds ─────────────────────────────────────────────────────────

/// Accepted range for `timer.cpu_ticks_per_us`.
pub const CPU_TICKS_PER_US_MIN: u32 = 1;
pub const CPU_TICKS_PER_US_MAX: u32 = 400;

/// Accepted range for `interpolator.endzone_ms`.
pub const ENDZONE_MS_MAX: u32 = 60_000;

// ─── Shared ─────────────────────────────────────────────────────────

/// Log level for application logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Fields common to every rig instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Instance identifier used in log output.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

fn default_service_name() -> String {
    "pdmotor-rig".to_string()
}

// ─── Timer ──────────────────────────────────────────────────────────

/// Tick timer programming parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimerConfig {
    /// Timer/counter that generates the system tick.
    #[serde(default)]
    pub counter: TimerCounter,

    /// Waveform mode for the tick timer.
    #[serde(default)]
    pub mode: TimerMode,

    /// CPU clock ticks per microsecond (default: 20 = 20 MHz).
    #[serde(default = "default_cpu_ticks_per_us")]
    pub cpu_ticks_per_us: u32,

    /// Requested tick period [µs]. Must be 1000: one tick is one millisecond
    /// of uptime.
    #[serde(default = "default_tick_period_us")]
    pub tick_period_us: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            counter: TimerCounter::default(),
            mode: TimerMode::default(),
            cpu_ticks_per_us: CPU_TICKS_PER_US,
            tick_period_us: TICK_PERIOD_US,
        }
    }
}

fn default_cpu_ticks_per_us() -> u32 {
    CPU_TICKS_PER_US
}
fn default_tick_period_us() -> u32 {
    TICK_PERIOD_US
}

// ─── Task Periods ───────────────────────────────────────────────────

/// Periods [ms] of the statically registered control tasks.
///
/// Zero periods are not rejected here; scheduler init reports them as
/// `SchedulerError::InvalidPeriod`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskPeriods {
    #[serde(default = "default_interpolator_ms")]
    pub interpolator_ms: u16,
    #[serde(default = "default_velocity_ms")]
    pub velocity_ms: u16,
    #[serde(default = "default_controller_ms")]
    pub controller_ms: u16,
    #[serde(default = "default_status_ms")]
    pub status_ms: u16,
}

impl Default for TaskPeriods {
    fn default() -> Self {
        Self {
            interpolator_ms: INTERPOLATOR_PERIOD_MS,
            velocity_ms: VELOCITY_PERIOD_MS,
            controller_ms: CONTROLLER_PERIOD_MS,
            status_ms: STATUS_PERIOD_MS,
        }
    }
}

fn default_interpolator_ms() -> u16 {
    INTERPOLATOR_PERIOD_MS
}
fn default_velocity_ms() -> u16 {
    VELOCITY_PERIOD_MS
}
fn default_controller_ms() -> u16 {
    CONTROLLER_PERIOD_MS
}
fn default_status_ms() -> u16 {
    STATUS_PERIOD_MS
}

// ─── Interpolator ───────────────────────────────────────────────────

/// Trajectory interpolator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterpolatorConfig {
    /// Encoder transitions per output revolution (default: 64).
    #[serde(default = "default_transitions")]
    pub transitions_per_revolution: i32,

    /// End-zone radius [deg] (default: 15).
    #[serde(default = "default_close_enough")]
    pub close_enough_degrees: i32,

    /// Dwell time before the head target is retired [ms] (default: 1000).
    #[serde(default = "default_endzone_ms")]
    pub endzone_ms: u32,

    /// Rate limit between effective target and position [deg] (default: 90).
    #[serde(default = "default_max_delta")]
    pub max_delta_degrees: i32,
}

impl Default for InterpolatorConfig {
    fn default() -> Self {
        Self {
            transitions_per_revolution: TRANSITIONS_PER_REVOLUTION,
            close_enough_degrees: CLOSE_ENOUGH_DEGREES,
            endzone_ms: ENDZONE_MS,
            max_delta_degrees: MAX_DELTA_DEGREES,
        }
    }
}

fn default_transitions() -> i32 {
    TRANSITIONS_PER_REVOLUTION
}
fn default_close_enough() -> i32 {
    CLOSE_ENOUGH_DEGREES
}
fn default_endzone_ms() -> u32 {
    ENDZONE_MS
}
fn default_max_delta() -> i32 {
    MAX_DELTA_DEGREES
}

impl InterpolatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transitions_per_revolution <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "transitions_per_revolution {} must be positive",
                self.transitions_per_revolution
            )));
        }
        if self.close_enough_degrees <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "close_enough_degrees {} must be positive",
                self.close_enough_degrees
            )));
        }
        if self.max_delta_degrees <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "max_delta_degrees {} must be positive",
                self.max_delta_degrees
            )));
        }
        if self.close_enough_degrees >= self.max_delta_degrees {
            return Err(ConfigError::ValidationError(format!(
                "close_enough_degrees {} must be below max_delta_degrees {}",
                self.close_enough_degrees, self.max_delta_degrees
            )));
        }
        if self.endzone_ms > ENDZONE_MS_MAX {
            return Err(ConfigError::ValidationError(format!(
                "endzone_ms {} out of range [0, {}]",
                self.endzone_ms, ENDZONE_MS_MAX
            )));
        }
        Ok(())
    }
}

// ─── Controller ─────────────────────────────────────────────────────

/// PD controller tuning.
///
/// Gains are fixed-point: the applied gain is `kp / gain_scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    /// Proportional gain, scaled by `gain_scale` (default: 2000).
    #[serde(default = "default_kp")]
    pub kp: i32,

    /// Derivative gain, scaled by `gain_scale` (default: 100).
    #[serde(default = "default_kd")]
    pub kd: i32,

    /// Fixed-point divisor (default: 1000).
    #[serde(default = "default_gain_scale")]
    pub gain_scale: i32,

    /// Torque saturation limit, 1..=255 (default: 255).
    #[serde(default = "default_max_torque")]
    pub max_torque: i16,

    /// Evaluate the law on every N-th service (default: 1).
    #[serde(default = "default_poll_divisor")]
    pub poll_divisor: u8,

    /// Emit per-evaluation debug events at startup.
    #[serde(default)]
    pub logging: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            kp: DEFAULT_KP,
            kd: DEFAULT_KD,
            gain_scale: GAIN_SCALE,
            max_torque: MAX_TORQUE,
            poll_divisor: DEFAULT_POLL_DIVISOR,
            logging: false,
        }
    }
}

fn default_kp() -> i32 {
    DEFAULT_KP
}
fn default_kd() -> i32 {
    DEFAULT_KD
}
fn default_gain_scale() -> i32 {
    GAIN_SCALE
}
fn default_max_torque() -> i16 {
    MAX_TORQUE
}
fn default_poll_divisor() -> u8 {
    DEFAULT_POLL_DIVISOR
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gain_scale <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "gain_scale {} must be positive",
                self.gain_scale
            )));
        }
        if self.max_torque <= 0 || self.max_torque > MAX_TORQUE {
            return Err(ConfigError::ValidationError(format!(
                "max_torque {} out of range [1, {}]",
                self.max_torque, MAX_TORQUE
            )));
        }
        if self.poll_divisor == 0 {
            return Err(ConfigError::ValidationError(
                "poll_divisor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete rig configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RigConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub tasks: TaskPeriods,
    #[serde(default)]
    pub interpolator: InterpolatorConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
}

impl RigConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate parameter bounds across all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shared.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        let t = &self.timer;
        // Uptime, task periods, dwell and velocity all count one tick as 1ms.
        if t.tick_period_us != TICK_PERIOD_US {
            return Err(ConfigError::ValidationError(format!(
                "tick_period_us {} must be {}",
                t.tick_period_us, TICK_PERIOD_US
            )));
        }
        if t.cpu_ticks_per_us < CPU_TICKS_PER_US_MIN || t.cpu_ticks_per_us > CPU_TICKS_PER_US_MAX
        {
            return Err(ConfigError::ValidationError(format!(
                "cpu_ticks_per_us {} out of range [{}, {}]",
                t.cpu_ticks_per_us, CPU_TICKS_PER_US_MIN, CPU_TICKS_PER_US_MAX
            )));
        }
        self.interpolator.validate()?;
        self.controller.validate()?;
        Ok(())
    }
}

// ─── Loader ─────────────────────────────────────────────────────────

/// Load a configuration type from a TOML file.
///
/// Missing files map to `ConfigError::FileNotFound`, other read failures to
/// `ConfigError::Io`, syntax and type errors to `ConfigError::ParseError`.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.to_path_buf())
            } else {
                ConfigError::Io(format!("{}: {e}", path.display()))
            }
        })?;
        tracing::debug!("Loaded {} bytes from {}", content.len(), path.display());

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
