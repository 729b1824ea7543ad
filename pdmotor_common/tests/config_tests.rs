//! Config file loading tests.
//!
//! Exercises `ConfigLoader::load` + `RigConfig::validate` against files on
//! disk: the shipped `config/rig.toml`, overrides, and malformed input.

use pdmotor_common::config::{ConfigError, ConfigLoader, LogLevel, RigConfig};
use pdmotor_common::types::TimerCounter;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn shipped_config_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/rig.toml")
}

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("rig.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn shipped_config_is_valid_and_matches_defaults() {
    let loaded = RigConfig::load(&shipped_config_path()).unwrap();
    loaded.validate().unwrap();

    let defaults = RigConfig::default();
    assert_eq!(loaded.controller, defaults.controller);
    assert_eq!(loaded.interpolator, defaults.interpolator);
    assert_eq!(loaded.timer.tick_period_us, defaults.timer.tick_period_us);
    assert_eq!(loaded.tasks.status_ms, defaults.tasks.status_ms);
}

#[test]
fn overrides_are_applied() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        r#"
[shared]
log_level = "debug"
service_name = "bench-2"

[timer]
counter = "counter1"
cpu_ticks_per_us = 16

[controller]
kp = 4000
kd = -50
logging = true
"#,
    );

    let config = RigConfig::load(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert_eq!(config.timer.counter, TimerCounter::Counter1);
    assert_eq!(config.timer.cpu_ticks_per_us, 16);
    assert_eq!(config.controller.kp, 4000);
    assert_eq!(config.controller.kd, -50);
    assert!(config.controller.logging);
}

#[test]
fn syntax_error_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "[controller\nkp = 1\n");
    let err = RigConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)), "got {err:?}");
}

#[test]
fn wrong_type_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "[controller]\nkp = \"fast\"\n");
    assert!(matches!(
        RigConfig::load(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn out_of_range_values_fail_validation() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "[interpolator]\nmax_delta_degrees = 0\n");
    let config = RigConfig::load(&path).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("max_delta_degrees"));
}

#[test]
fn empty_service_name_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "[shared]\nservice_name = \"\"\n");
    let config = RigConfig::load(&path).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn non_millisecond_tick_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "[timer]\ncounter = \"counter1\"\ntick_period_us = 2000\n");

    let config = RigConfig::load(&path).unwrap();
    match config.validate() {
        Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("tick_period_us 2000")),
        other => panic!("expected validation error, got {other:?}"),
    }
}
