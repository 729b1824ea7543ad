//! Console bytes through framing and parsing into the rig.

use pdmotor_common::config::RigConfig;
use pdmotor_common::error::{CommandError, InterpolatorError};
use pdmotor_control::command::LineFramer;
use pdmotor_control::rig::{CommandOutcome, MotorRig, RigError};
use pdmotor_control::sim::SimulatedMotor;

fn rig() -> MotorRig<SimulatedMotor> {
    MotorRig::new(&RigConfig::default(), SimulatedMotor::default()).unwrap()
}

/// Feed raw console bytes, collecting each line's outcome.
fn type_into(
    rig: &mut MotorRig<SimulatedMotor>,
    framer: &mut LineFramer,
    input: &[u8],
) -> Vec<Result<CommandOutcome, RigError>> {
    let mut outcomes = Vec::new();
    for &byte in input {
        match framer.push(byte) {
            Some(Ok(line)) => outcomes.push(rig.execute_line(line)),
            Some(Err(e)) => outcomes.push(Err(e.into())),
            None => {}
        }
    }
    outcomes
}

#[test]
fn console_session() {
    let mut rig = rig();
    let mut framer = LineFramer::new();
    let outcomes = type_into(
        &mut rig,
        &mut framer,
        b"t 90\r\nr +45\rkp +500\nkd 80\r\nlog on\r\ns\r\n",
    );

    assert_eq!(outcomes.len(), 6);
    assert!(outcomes[..5]
        .iter()
        .all(|o| matches!(o, Ok(CommandOutcome::Accepted))));
    match &outcomes[5] {
        Ok(CommandOutcome::Status(status)) => {
            assert_eq!(status.queue_len, 2);
            assert_eq!(status.absolute_target, 90);
            assert_eq!(status.controller.kp, 2500);
            assert_eq!(status.controller.kd, 80);
            assert!(status.controller.logging);
        }
        other => panic!("expected status, got {other:?}"),
    }
    let targets: Vec<_> = rig.system().interpolator.targets().collect();
    assert_eq!(targets, vec![90, 135]);
}

#[test]
fn typo_corrected_with_backspace() {
    let mut rig = rig();
    let mut framer = LineFramer::new();
    let outcomes = type_into(&mut rig, &mut framer, b"t 4\x085\r");
    assert!(matches!(outcomes[..], [Ok(CommandOutcome::Accepted)]));
    assert_eq!(rig.system().interpolator.targets().next(), Some(5));
}

#[test]
fn errors_do_not_stop_the_session() {
    let mut rig = rig();
    let mut framer = LineFramer::new();
    let mut input = b"spin\rt\r".to_vec();
    input.extend(std::iter::repeat_n(b'9', 200));
    input.extend_from_slice(b"\rt 10\r");

    let outcomes = type_into(&mut rig, &mut framer, &input);
    assert!(matches!(
        outcomes[0],
        Err(RigError::Command(CommandError::UnknownVerb(_)))
    ));
    assert!(matches!(
        outcomes[1],
        Err(RigError::Command(CommandError::MissingArgument { verb: "t" }))
    ));
    assert!(matches!(
        outcomes[2],
        Err(RigError::Command(CommandError::LineTooLong { capacity: 128 }))
    ));
    assert!(matches!(outcomes[3], Ok(CommandOutcome::Accepted)));
    assert_eq!(rig.system().interpolator.queue_len(), 1);
}

#[test]
fn queue_overflow_through_console() {
    let mut rig = rig();
    let mut framer = LineFramer::new();
    let input: Vec<u8> = (0..11).flat_map(|n| format!("t {n}\r").into_bytes()).collect();
    let outcomes = type_into(&mut rig, &mut framer, &input);

    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 10);
    assert!(matches!(
        outcomes[10],
        Err(RigError::Interpolator(InterpolatorError::TargetQueueFull {
            position: 10,
            ..
        }))
    ));

    type_into(&mut rig, &mut framer, b"clear\r");
    assert!(rig.system().interpolator.is_empty());
}

#[test]
fn help_lists_every_verb() {
    let mut rig = rig();
    let outcome = rig.execute_line("?").unwrap();
    assert_eq!(outcome, CommandOutcome::Help);
    let usages: Vec<_> = pdmotor_control::command::HELP
        .iter()
        .map(|(usage, _)| *usage)
        .collect();
    for verb in ["t ", "r ", "kp", "kd", "log", "pause", "rate", "clear", "status", "?"] {
        assert!(usages.iter().any(|u| u.contains(verb)), "missing {verb}");
    }
}
