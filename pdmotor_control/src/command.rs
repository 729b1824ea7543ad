//! Operator command interface root.
//!
//! Bytes from the serial console are assembled into lines by
//! [`framing::LineFramer`], parsed into a [`parser::Command`] and applied to
//! the rig by `MotorRig::execute`.

pub mod framing;
pub mod parser;

pub use framing::LineFramer;
pub use parser::{Command, GainChange, LoggingChange};

/// Operator help, one `(usage, description)` pair per verb. Any verb may be
/// shortened to a prefix.
pub const HELP: &[(&str, &str)] = &[
    ("t <deg>", "queue absolute target"),
    ("r <+/-deg>", "queue target relative to last queued target"),
    ("kp <n> | kp +n | kp -n", "set or adjust proportional gain"),
    ("kd <n> | kd +n | kd -n", "set or adjust derivative gain"),
    ("log on|off|toggle", "per-evaluation controller logging"),
    ("pause | resume", "hold zero torque / resume control"),
    ("rate <n>", "evaluate the control law every n-th service"),
    ("clear", "drop all queued targets"),
    ("s | status", "print controller and queue status"),
    ("?", "this help"),
];
