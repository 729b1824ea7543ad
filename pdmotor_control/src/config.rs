//! Rig configuration loader with startup validation.
//!
//! On top of the per-field bounds checked by `RigConfig::validate`, this
//! verifies that the tick timer can actually be programmed for the
//! requested period and that every task period is non-zero, so a bad file
//! is rejected before any hardware is touched.

use std::path::Path;

use pdmotor_common::config::{ConfigError, ConfigLoader, RigConfig};
use tracing::info;

use crate::timer::{ProgrammedTimer, TimerProgrammer};

/// Validated configuration plus the tick timer programming it implies.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub rig: RigConfig,
    pub tick_timer: ProgrammedTimer,
}

/// Load and validate the rig configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let rig = RigConfig::load(path)?;
    let loaded = validate_config(rig)?;
    info!("Loaded configuration from {}", path.display());
    Ok(loaded)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<LoadedConfig, ConfigError> {
    validate_config(RigConfig::from_toml_str(content)?)
}

/// Validate a configuration that did not come from a file.
pub fn validate_config(rig: RigConfig) -> Result<LoadedConfig, ConfigError> {
    rig.validate()?;
    validate_task_periods(&rig)?;
    let tick_timer = validate_tick_timer(&rig)?;
    Ok(LoadedConfig { rig, tick_timer })
}

fn validate_task_periods(rig: &RigConfig) -> Result<(), ConfigError> {
    let t = &rig.tasks;
    for (name, period) in [
        ("interpolator_ms", t.interpolator_ms),
        ("velocity_ms", t.velocity_ms),
        ("controller_ms", t.controller_ms),
        ("status_ms", t.status_ms),
    ] {
        if period == 0 {
            return Err(ConfigError::ValidationError(format!(
                "tasks.{name} must be at least 1"
            )));
        }
    }
    Ok(())
}

/// Dry-run the divisor search for the configured tick timer.
pub fn validate_tick_timer(rig: &RigConfig) -> Result<ProgrammedTimer, ConfigError> {
    TimerProgrammer::new(rig.timer.cpu_ticks_per_us)
        .program(rig.timer.counter, rig.timer.tick_period_us, rig.timer.mode)
        .map_err(|e| ConfigError::ValidationError(format!("timer: {e}")))
}
