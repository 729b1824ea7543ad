//! Closed-loop behaviour of the full rig against the simulated motor.

use pdmotor_common::config::RigConfig;
use pdmotor_control::rig::MotorRig;
use pdmotor_control::sim::SimulatedMotor;

const DT_S: f64 = 0.001;

fn rig() -> MotorRig<SimulatedMotor> {
    MotorRig::new(&RigConfig::default(), SimulatedMotor::default()).unwrap()
}

/// One millisecond of rig time: tick, dispatch, advance the plant.
fn run_ms(rig: &mut MotorRig<SimulatedMotor>, ms: u32) {
    for _ in 0..ms {
        rig.step();
        rig.hardware_mut().step(DT_S);
    }
}

#[test]
fn visits_queued_targets_in_order() {
    let mut rig = rig();
    for line in ["t 90", "t 180", "t -90"] {
        rig.execute_line(line).unwrap();
    }

    let mut retired = Vec::new();
    let mut expected: Vec<i32> = rig.system().interpolator.targets().collect();
    for _ in 0..10_000 {
        let before = rig.system().interpolator.queue_len();
        run_ms(&mut rig, 1);
        if rig.system().interpolator.queue_len() < before {
            let target = expected.remove(0);
            let position = rig.hardware().position_degrees();
            assert!(
                (position - f64::from(target)).abs() < 15.0,
                "retired {target} at {position}"
            );
            retired.push(target);
        }
    }

    assert_eq!(retired, vec![90, 180, -90]);
    assert!(rig.system().interpolator.is_empty());
    assert!((rig.hardware().position_degrees() + 90.0).abs() < 15.0);
}

#[test]
fn far_target_is_approached_at_bounded_lead() {
    let mut rig = rig();
    rig.execute_line("t 720").unwrap();

    for _ in 0..3000 {
        run_ms(&mut rig, 1);
        let status = rig.status();
        assert!((status.target - status.position).abs() <= 90);
        assert!(rig.hardware().torque().abs() <= 255);
    }
    assert!(rig.system().interpolator.is_empty());
    assert!((rig.hardware().position_degrees() - 720.0).abs() < 15.0);
}

#[test]
fn perturbation_is_corrected() {
    let mut rig = rig();
    rig.execute_line("t 0").unwrap();
    run_ms(&mut rig, 200);

    rig.hardware_mut().perturb(60.0);
    run_ms(&mut rig, 600);

    assert_eq!(rig.system().interpolator.queue_len(), 1);
    assert!(rig.hardware().position_degrees().abs() < 15.0);
}

#[test]
fn endzone_dwell_retires_head_once() {
    let mut rig = rig();
    rig.execute_line("t 0").unwrap();
    rig.execute_line("t 0").unwrap();

    // First interpolator service at 5ms enters the end-zone; the head is
    // retired on the first service more than 1000ms later.
    run_ms(&mut rig, 1005);
    assert_eq!(rig.system().interpolator.queue_len(), 2);
    run_ms(&mut rig, 5);
    assert_eq!(rig.system().interpolator.queue_len(), 1);

    // Second target restarts the dwell from its own entry time.
    run_ms(&mut rig, 1000);
    assert_eq!(rig.system().interpolator.queue_len(), 1);
    run_ms(&mut rig, 10);
    assert!(rig.system().interpolator.is_empty());
}

#[test]
fn paused_rig_holds_zero_torque() {
    let mut rig = rig();
    rig.execute_line("t 180").unwrap();
    run_ms(&mut rig, 100);
    assert!(rig.hardware().torque() > 0);

    rig.execute_line("pause").unwrap();
    run_ms(&mut rig, 5);
    assert_eq!(rig.hardware().torque(), 0);
    let writes = rig.hardware().drive_writes();
    run_ms(&mut rig, 50);
    assert_eq!(rig.hardware().torque(), 0);
    assert_eq!(rig.hardware().drive_writes(), writes + 10);

    rig.execute_line("resume").unwrap();
    run_ms(&mut rig, 5);
    assert!(rig.hardware().torque() > 0);
}

#[test]
fn empty_queue_holds_station() {
    let mut rig = rig();
    run_ms(&mut rig, 500);
    assert_eq!(rig.hardware().torque(), 0);
    assert_eq!(rig.hardware().position_degrees(), 0.0);
}
