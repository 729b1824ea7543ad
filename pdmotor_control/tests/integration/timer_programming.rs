//! Timer programming across counters and periods.

use pdmotor_common::error::TimerError;
use pdmotor_common::types::{TimerCounter, TimerMode};
use pdmotor_control::sim::SimulatedTimer;
use pdmotor_control::timer::{CS_BIT0, CS_BIT1, TimerProgrammer, setup_timer};

const MODE: TimerMode = TimerMode::ClearOnCompareMatch;

#[test]
fn one_ms_tick_within_one_percent_on_every_counter() {
    let programmer = TimerProgrammer::new(20);
    for counter in [
        TimerCounter::Counter0,
        TimerCounter::Counter1,
        TimerCounter::Counter3,
    ] {
        let p = programmer.program(counter, 1000, MODE).unwrap();
        assert!(p.relative_error() < 0.01, "{counter}: {p:?}");
        assert!(p.achieved_period_us <= 1000);
    }
}

#[test]
fn eight_bit_counter_range() {
    let programmer = TimerProgrammer::new(20);
    for period_us in [10, 100, 500, 1000, 5000, 10_000, 13_000] {
        let p = programmer
            .program(TimerCounter::Counter0, period_us, MODE)
            .unwrap();
        assert!(u32::from(p.top) <= 0xFF);
        assert!(p.relative_error() < 0.02, "{period_us}us: {p:?}");
    }
    assert!(matches!(
        programmer.program(TimerCounter::Counter0, 14_000, MODE),
        Err(TimerError::NoFeasibleDivider { .. })
    ));
}

#[test]
fn sixteen_bit_counter_reaches_longer_periods() {
    let programmer = TimerProgrammer::new(20);
    let p = programmer
        .program(TimerCounter::Counter3, 250_000, MODE)
        .unwrap();
    // 256 * 19531 / 20 = 249996us beats 1024 * 4882 / 20 = 249958us.
    assert_eq!(p.divisor, 256);
    assert_eq!(p.top, 19_531);
    assert_eq!(p.achieved_period_us, 249_996);
}

#[test]
fn one_mhz_clock() {
    let programmer = TimerProgrammer::new(1);
    let p = programmer
        .program(TimerCounter::Counter0, 1000, MODE)
        .unwrap();
    // 8 → top 125 exact.
    assert_eq!(p.divisor, 8);
    assert_eq!(p.top, 125);
    assert_eq!(p.clock_select, CS_BIT1);
    assert_eq!(p.error_us, 0);
}

#[test]
fn setup_commits_only_on_success() {
    let programmer = TimerProgrammer::new(20);
    let mut timer = SimulatedTimer::new();

    assert!(setup_timer(&mut timer, &programmer, TimerCounter::Counter0, MODE, 100_000).is_err());
    assert_eq!(timer.commits(), 0);

    let p = setup_timer(&mut timer, &programmer, TimerCounter::Counter1, MODE, 100).unwrap();
    // 20 * 100 = 2000 on divisor 1.
    assert_eq!(p.clock_select, CS_BIT0);
    assert_eq!(timer.registers().map(|r| r.top), Some(2000));
    assert_eq!(timer.commits(), 1);
}
