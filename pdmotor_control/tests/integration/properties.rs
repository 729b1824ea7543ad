//! Property tests for the control law, rate limiting, timer search and
//! task release.

use std::cell::Cell;

use pdmotor_common::config::InterpolatorConfig;
use pdmotor_common::hw::PositionSensor;
use pdmotor_common::types::{TaskState, TimerCounter, TimerMode};
use pdmotor_control::control::{PdGains, pd_compute};
use pdmotor_control::interpolator::Interpolator;
use pdmotor_control::scheduler::{Scheduler, Task};
use pdmotor_control::timer::{TimerProgrammer, timer_spec};
use proptest::prelude::*;

struct Encoder(Cell<i32>);

impl PositionSensor for Encoder {
    fn read_position_counts(&self) -> i32 {
        self.0.get()
    }
}

fn counter() -> impl Strategy<Value = TimerCounter> {
    prop_oneof![
        Just(TimerCounter::Counter0),
        Just(TimerCounter::Counter1),
        Just(TimerCounter::Counter3),
    ]
}

proptest! {
    #[test]
    fn torque_always_within_limit(
        kp in any::<i32>(),
        kd in any::<i32>(),
        scale in any::<i32>(),
        max_torque in any::<i16>(),
        error in any::<i32>(),
        velocity in any::<i32>(),
    ) {
        let gains = PdGains { kp, kd, scale, max_torque };
        let torque = pd_compute(&gains, error, velocity);
        prop_assert!(torque.unsigned_abs() <= gains.limit().unsigned_abs());
        prop_assert!(torque.unsigned_abs() <= 255);
    }

    #[test]
    fn effective_target_never_leads_by_more_than_max_delta(
        head in -1_000_000i32..1_000_000,
        counts in -100_000i32..100_000,
        max_delta in 16i32..720,
    ) {
        let config = InterpolatorConfig {
            max_delta_degrees: max_delta,
            ..InterpolatorConfig::default()
        };
        let mut interp: Interpolator = Interpolator::new(config);
        interp.add_target(head).unwrap();
        let enc = Encoder(Cell::new(counts));

        let position = interp.current_position(&enc);
        let target = interp.target_position(&enc);
        prop_assert!((i64::from(target) - i64::from(position)).abs() <= i64::from(max_delta));
        if (i64::from(head) - i64::from(position)).abs() <= i64::from(max_delta) {
            prop_assert_eq!(target, head);
        }
    }

    #[test]
    fn timer_search_picks_best_divisor(
        counter in counter(),
        period_us in 1u32..300_000,
        ticks in prop_oneof![Just(1u32), Just(8), Just(16), Just(20)],
    ) {
        let spec = timer_spec(counter);
        let max_top = u64::from(spec.width.max_top());
        let programmer = TimerProgrammer::new(ticks);

        // Largest feasible top and its error for every divisor, in table order.
        let candidates: Vec<(u16, u32)> = spec
            .divisors
            .iter()
            .filter_map(|d| {
                let top = u64::from(ticks) * u64::from(period_us) / u64::from(d.denominator);
                (top > 0 && top <= max_top).then(|| {
                    let achieved = u64::from(d.denominator) * top / u64::from(ticks);
                    (d.denominator, period_us - achieved as u32)
                })
            })
            .collect();

        match programmer.program(counter, period_us, TimerMode::ClearOnCompareMatch) {
            Ok(p) => {
                prop_assert!(p.top > 0);
                prop_assert!(u64::from(p.top) <= max_top);
                prop_assert_eq!(
                    u64::from(p.achieved_period_us),
                    u64::from(p.divisor) * u64::from(p.top) / u64::from(ticks)
                );
                prop_assert_eq!(p.error_us, period_us - p.achieved_period_us);

                let chosen = candidates.iter().position(|&(d, _)| d == p.divisor).unwrap();
                for (index, &(_, err)) in candidates.iter().enumerate() {
                    prop_assert!(p.error_us <= err);
                    if err == p.error_us {
                        prop_assert!(chosen <= index, "tie must keep the earliest divisor");
                    }
                }
            }
            Err(_) => {
                prop_assert!(candidates.is_empty());
            }
        }
    }

    #[test]
    fn ready_iff_due_tick_since_last_dispatch(
        period in 1u16..20,
        dispatch_every in 1u32..30,
        ticks in 1u32..200,
    ) {
        let mut sched = Scheduler::<_, 1>::init([Task::new("t", period, |_: &mut ()| {})]).unwrap();
        let mut released_since_dispatch = false;
        for tick in 1..=ticks {
            sched.release(tick);
            released_since_dispatch |= tick % u32::from(period) == 0;
            let expected = if released_since_dispatch { TaskState::Ready } else { TaskState::Idle };
            prop_assert_eq!(sched.task_state(0), Some(expected));
            if tick % dispatch_every == 0 {
                sched.dispatch(&mut ());
                released_since_dispatch = false;
            }
        }
    }
}
