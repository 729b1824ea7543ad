//! Operator command grammar.
//!
//! One verb per line, optionally followed by a single argument. Verbs are
//! case-insensitive and may be abbreviated: the typed word selects the first
//! entry of [`VERBS`] it is a prefix of, so `t` is `target`, `r` is
//! `relative` and `res` is `resume`. For `kp`/`kd` an argument with an
//! explicit sign (`+5`, `-5`) adjusts the gain, an unsigned one replaces it.

use std::str::FromStr;

use pdmotor_common::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainChange {
    Set(i32),
    Adjust(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingChange {
    On,
    Off,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Queue an absolute target [deg].
    AddTarget(i32),
    /// Queue a target relative to the last queued one [deg].
    AddRelativeTarget(i32),
    Kp(GainChange),
    Kd(GainChange),
    Logging(LoggingChange),
    Pause,
    Resume,
    /// Evaluate the control law every N-th service.
    PollRate(u8),
    ClearTargets,
    Status,
    Help,
}

/// Verb names in lookup order.
pub const VERBS: [&str; 11] = [
    "target", "relative", "kp", "kd", "log", "rate", "pause", "resume", "clear", "status", "help",
];

/// Full verb name for a typed, possibly abbreviated, verb.
pub fn resolve_verb(typed: &str) -> Option<&'static str> {
    if typed == "?" {
        return Some("help");
    }
    let typed = typed.to_ascii_lowercase();
    VERBS.into_iter().find(|name| name.starts_with(typed.as_str()))
}

fn parse_number<T: FromStr>(text: &str) -> Result<T, CommandError> {
    text.parse()
        .map_err(|_| CommandError::InvalidNumber(text.to_string()))
}

fn parse_gain(arg: &str) -> Result<GainChange, CommandError> {
    let value = parse_number(arg)?;
    Ok(if arg.starts_with(['+', '-']) {
        GainChange::Adjust(value)
    } else {
        GainChange::Set(value)
    })
}

fn required<'a>(verb: &'static str, arg: Option<&'a str>) -> Result<&'a str, CommandError> {
    arg.ok_or(CommandError::MissingArgument { verb })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandError::UnknownVerb(String::new()));
        };
        let arg = words.next();
        if let Some(extra) = words.next() {
            return Err(CommandError::InvalidArgument {
                verb: "command",
                value: extra.to_string(),
            });
        }

        let Some(name) = resolve_verb(verb) else {
            return Err(CommandError::UnknownVerb(verb.to_string()));
        };
        match name {
            "target" => Ok(Self::AddTarget(parse_number(required("t", arg)?)?)),
            "relative" => Ok(Self::AddRelativeTarget(parse_number(required("r", arg)?)?)),
            "kp" => Ok(Self::Kp(parse_gain(required("kp", arg)?)?)),
            "kd" => Ok(Self::Kd(parse_gain(required("kd", arg)?)?)),
            "log" => {
                let value = required("log", arg)?;
                let change = match value.to_ascii_lowercase().as_str() {
                    "on" | "1" => LoggingChange::On,
                    "off" | "0" => LoggingChange::Off,
                    "toggle" => LoggingChange::Toggle,
                    _ => {
                        return Err(CommandError::InvalidArgument {
                            verb: "log",
                            value: value.to_string(),
                        });
                    }
                };
                Ok(Self::Logging(change))
            }
            "rate" => {
                let value = required("rate", arg)?;
                match parse_number::<u8>(value)? {
                    0 => Err(CommandError::InvalidArgument {
                        verb: "rate",
                        value: value.to_string(),
                    }),
                    n => Ok(Self::PollRate(n)),
                }
            }
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "clear" => Ok(Self::ClearTargets),
            "status" => Ok(Self::Status),
            "help" => Ok(Self::Help),
            _ => Err(CommandError::UnknownVerb(verb.to_string())),
        }
    }
}
