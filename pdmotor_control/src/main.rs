//! # PD Motor Control Rig
//!
//! Runs the control core against the simulated motor.
//!
//! Two modes:
//! - **Batch** (default): runs `--duration-ms` ticks as fast as possible,
//!   applying `--target` and `--command` arguments at startup.
//! - **Realtime** (`--realtime`): paces ticks to the programmed tick period
//!   and reads console commands from stdin until Ctrl+C.

use clap::Parser;
use pdmotor_common::config::{ConfigError, LogLevel, RigConfig};
use pdmotor_common::consts::{COMMAND_LINE_CAPACITY, DEFAULT_CONFIG_PATH};
use pdmotor_control::clock::{Pacing, TickPacer};
use pdmotor_control::command::{Command, HELP, LineFramer};
use pdmotor_control::config::{LoadedConfig, load_config, validate_config};
use pdmotor_control::rig::{CommandOutcome, MotorRig, RigError};
use pdmotor_control::sim::{PlantParams, SimulatedMotor, SimulatedTimer};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

type Rig = MotorRig<SimulatedMotor>;

/// PD motor rig: tick scheduler, interpolator and PD position loop
#[derive(Parser, Debug)]
#[command(name = "pdmotor_control")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "PD position control of a simulated DC motor rig")]
struct Args {
    /// Path to rig configuration TOML (default: config/rig.toml if present).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of ticks to simulate in batch mode.
    #[arg(long, default_value_t = 5000)]
    duration_ms: u32,

    /// Absolute target [deg] queued at startup. Repeatable.
    #[arg(short, long = "target", allow_hyphen_values = true)]
    targets: Vec<i32>,

    /// Console command applied at startup, e.g. "kp 2500". Repeatable.
    #[arg(long = "command")]
    commands: Vec<String>,

    /// Pace ticks to wall time and read commands from stdin.
    #[arg(long)]
    realtime: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let loaded = resolve_config(&args);
    let configured_level = loaded
        .as_ref()
        .map(|l| l.rig.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, configured_level);

    info!("PD motor rig v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|loaded| run(&args, loaded));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("PD motor rig shutdown complete");
}

fn resolve_config(args: &Args) -> Result<LoadedConfig, ConfigError> {
    match &args.config {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_config(Path::new(DEFAULT_CONFIG_PATH))
        }
        None => validate_config(RigConfig::default()),
    }
}

fn run(args: &Args, loaded: LoadedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let config = &loaded.rig;
    info!(
        "Config OK: {} tick {}us on {} (expected {}us)",
        config.shared.service_name,
        config.timer.tick_period_us,
        config.timer.counter,
        loaded.tick_timer.achieved_period_us,
    );

    let plant = SimulatedMotor::new(PlantParams {
        transitions_per_revolution: config.interpolator.transitions_per_revolution,
        ..PlantParams::default()
    });
    let mut timer = SimulatedTimer::new();
    let mut rig = Rig::start(config, plant, &mut timer)?;
    let tick_us = rig
        .tick_timer()
        .map_or(config.timer.tick_period_us, |t| t.achieved_period_us);

    for &target in &args.targets {
        report(rig.execute(Command::AddTarget(target)));
    }
    for line in &args.commands {
        report(rig.execute_line(line));
    }

    if args.realtime {
        run_realtime(&mut rig, tick_us)?;
    } else {
        run_batch(&mut rig, args.duration_ms, tick_us);
    }

    info!("Final: {}", rig.status());
    for stats in rig.scheduler().stats() {
        info!(
            "Task '{}' ({}ms): {} runs, {} absorbed releases",
            stats.name, stats.period_ms, stats.runs, stats.absorbed_releases
        );
    }
    Ok(())
}

fn run_batch(rig: &mut Rig, duration_ms: u32, tick_us: u32) {
    let dt_s = f64::from(tick_us) / 1e6;
    for _ in 0..duration_ms {
        rig.step();
        rig.hardware_mut().step(dt_s);
    }
}

fn run_realtime(rig: &mut Rig, tick_us: u32) -> Result<(), Box<dyn std::error::Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let (tx, rx) = mpsc::channel::<u8>();
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            for byte in std::io::stdin().lock().bytes() {
                let Ok(byte) = byte else { break };
                if tx.send(byte).is_err() {
                    break;
                }
            }
        })?;

    info!("Realtime mode, type '?' for help, Ctrl+C to stop");
    let period = Duration::from_micros(u64::from(tick_us));
    let dt_s = period.as_secs_f64();
    let mut framer = LineFramer::<COMMAND_LINE_CAPACITY>::new();
    let mut pacer = TickPacer::new(period, Instant::now());
    let mut overruns: u64 = 0;
    let mut late_ticks: u64 = 0;

    while running.load(Ordering::SeqCst) {
        rig.tick();

        while let Ok(byte) = rx.try_recv() {
            match framer.push(byte) {
                Some(Ok(line)) => report(rig.execute_line(line)),
                Some(Err(e)) => warn!("{e}"),
                None => {}
            }
        }

        rig.dispatch();
        rig.hardware_mut().step(dt_s);

        match pacer.pace(Instant::now()) {
            Pacing::Sleep(wait) => thread::sleep(wait),
            Pacing::Behind { missed } => {
                overruns += 1;
                // One tick per elapsed period, even when late.
                for _ in 0..missed {
                    rig.tick();
                }
                if missed > 0 {
                    rig.hardware_mut().step(dt_s * f64::from(missed));
                    late_ticks += u64::from(missed);
                }
            }
        }
    }

    if overruns > 0 {
        warn!("{overruns} tick overruns, {late_ticks} ticks issued late");
    }
    Ok(())
}

fn report(outcome: Result<CommandOutcome, RigError>) {
    match outcome {
        Ok(CommandOutcome::Accepted) => {}
        Ok(CommandOutcome::Status(status)) => info!("{status}"),
        Ok(CommandOutcome::Help) => {
            for (usage, what) in HELP {
                info!("{usage:<24} {what}");
            }
        }
        Err(e) => warn!("{e}"),
    }
}

/// Setup tracing subscriber from CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        configured.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
