//! PD Motor Common Library
//!
//! Shared vocabulary for the PD motor rig workspace: numeric limits,
//! the hardware capability traits the control core drives, error types,
//! and TOML configuration loading.
//!
//! # Module Structure
//!
//! - [`consts`] - System-wide defaults and capacities
//! - [`hw`] - `PositionSensor`, `MotorDriver` and `TimerPeripheral` capabilities
//! - [`types`] - Small shared enums (timer selection, task state, end-zone state)
//! - [`error`] - Error taxonomy of the control core
//! - [`config`] - Rig configuration and the `ConfigLoader` trait
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use pdmotor_common::prelude::*;
//!
//! let config = RigConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.timer.tick_period_us, TICK_PERIOD_US);
//! ```

pub mod config;
pub mod consts;
pub mod error;
pub mod hw;
pub mod prelude;
pub mod types;
