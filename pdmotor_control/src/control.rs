//! Position control engine root.
//!
//! Fixed-point PD law plus the stateful controller that applies it to the
//! motor driver on every service call.

pub mod motor;
pub mod pd;

pub use motor::{ControllerStatus, PdController};
pub use pd::{PdGains, pd_compute};
