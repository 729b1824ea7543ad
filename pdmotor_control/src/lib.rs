//! # PD Motor Control
//!
//! Position control for a DC motor with a quadrature encoder, built from:
//!
//! - **`timer`**: prescaler/top search for the tick interrupt.
//! - **`clock`**: wrapping millisecond uptime.
//! - **`scheduler`**: periodic release + cooperative run-to-completion dispatch.
//! - **`interpolator`**: target queue, rate-limited effective target, end-zone
//!   dwell, velocity estimate.
//! - **`control`**: fixed-point PD law with saturation.
//! - **`command`**: operator console framing and grammar.
//! - **`rig`**: wiring of the above into the four control tasks.
//! - **`sim`**: host-side motor and timer models.
//!
//! ```rust
//! use pdmotor_common::prelude::*;
//! use pdmotor_control::rig::MotorRig;
//! use pdmotor_control::sim::SimulatedMotor;
//!
//! let mut rig = MotorRig::<SimulatedMotor>::new(&RigConfig::default(), SimulatedMotor::default())?;
//! rig.execute_line("t 90")?;
//! for _ in 0..10 {
//!     rig.step();
//! }
//! assert_eq!(rig.uptime_ms(), 10);
//! # Ok::<(), pdmotor_control::rig::RigError>(())
//! ```

pub mod clock;
pub mod command;
pub mod config;
pub mod control;
pub mod interpolator;
pub mod rig;
pub mod scheduler;
pub mod sim;
pub mod timer;
