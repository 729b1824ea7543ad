//! System-wide constants for the PD motor rig.
//!
//! Single source of truth for capacities, timing defaults and controller
//! limits. Configuration defaults are derived from these values.

use static_assertions::const_assert;

// ─── Clock ──────────────────────────────────────────────────────────

/// Nominal tick period in microseconds (1 kHz logical clock).
pub const TICK_PERIOD_US: u32 = 1000;

/// CPU clock ticks per microsecond (20 MHz part).
pub const CPU_TICKS_PER_US: u32 = 20;

// ─── Scheduler ──────────────────────────────────────────────────────

/// Capacity of the fixed task table.
pub const MAX_TASKS: usize = 8;

/// Default interpolator service period [ms].
pub const INTERPOLATOR_PERIOD_MS: u16 = 5;

/// Default velocity estimation period [ms].
pub const VELOCITY_PERIOD_MS: u16 = 10;

/// Default PD controller service period [ms].
pub const CONTROLLER_PERIOD_MS: u16 = 5;

/// Default status report period [ms].
pub const STATUS_PERIOD_MS: u16 = 250;

// ─── Interpolator ───────────────────────────────────────────────────

/// Capacity of the target queue.
pub const TARGET_QUEUE_CAPACITY: usize = 10;

/// Dark regions on the encoder wheel.
pub const ENCODER_DARK_REGIONS: i32 = 32;

/// Encoder transitions per output shaft revolution (two edges per region).
pub const TRANSITIONS_PER_REVOLUTION: i32 = ENCODER_DARK_REGIONS * 2;

/// Distance [deg] under which the rig counts as inside the end-zone.
pub const CLOSE_ENOUGH_DEGREES: i32 = 15;

/// Dwell time [ms] inside the end-zone before the head target is retired.
pub const ENDZONE_MS: u32 = 1000;

/// Maximum distance [deg] between the effective target and the current position.
pub const MAX_DELTA_DEGREES: i32 = 90;

// ─── PD Controller ──────────────────────────────────────────────────

/// Symmetric torque saturation limit (full duty).
pub const MAX_TORQUE: i16 = 255;

/// Fixed-point divisor applied to `Kp`/`Kd` products.
pub const GAIN_SCALE: i32 = 1000;

/// Default proportional gain (2.0 torque units per degree).
pub const DEFAULT_KP: i32 = 2000;

/// Default derivative gain (0.1 torque units per deg/s).
pub const DEFAULT_KD: i32 = 100;

/// Default poll divisor (evaluate the control law on every service).
pub const DEFAULT_POLL_DIVISOR: u8 = 1;

// ─── Command Interface ──────────────────────────────────────────────

/// Maximum length of one command line in bytes.
pub const COMMAND_LINE_CAPACITY: usize = 128;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/rig.toml";

const_assert!(MAX_TORQUE > 0);
const_assert!(MAX_TASKS <= u8::MAX as usize);
const_assert!(TARGET_QUEUE_CAPACITY > 0);
const_assert!(TRANSITIONS_PER_REVOLUTION > 0);
const_assert!(GAIN_SCALE > 0);
