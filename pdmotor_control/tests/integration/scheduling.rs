//! Tick release and dispatch behaviour over many ticks.

use pdmotor_common::types::TaskState;
use pdmotor_control::clock::TickClock;
use pdmotor_control::scheduler::{Scheduler, Task};

#[derive(Default)]
struct Counts {
    a: u32,
    b: u32,
    order: Vec<char>,
}

fn run_a(c: &mut Counts) {
    c.a += 1;
    c.order.push('a');
}

fn run_b(c: &mut Counts) {
    c.b += 1;
    c.order.push('b');
}

type Job = fn(&mut Counts);

fn two_task_scheduler() -> Scheduler<Job, 4> {
    Scheduler::init([Task::new("a", 1, run_a as Job), Task::new("b", 5, run_b as Job)]).unwrap()
}

#[test]
fn one_and_five_ms_tasks_over_ten_ticks() {
    let clock = TickClock::new();
    let mut sched = two_task_scheduler();
    let mut counts = Counts::default();

    for _ in 1..=10 {
        let now = clock.advance();
        sched.release(now);
        sched.dispatch(&mut counts);
    }

    assert_eq!(counts.a, 10);
    assert_eq!(counts.b, 2);
    // Ticks 5 and 10 run both, 'a' first.
    assert_eq!(&counts.order[3..6], &['a', 'a', 'b']);
}

#[test]
fn slow_main_loop_collapses_releases() {
    let clock = TickClock::new();
    let mut sched = two_task_scheduler();
    let mut counts = Counts::default();

    // Dispatch only every third tick.
    for tick in 1..=30u32 {
        let now = clock.advance();
        sched.release(now);
        if tick % 3 == 0 {
            sched.dispatch(&mut counts);
        }
    }

    assert_eq!(counts.a, 10);
    assert_eq!(counts.b, 6);
    let a = sched.task_stats(0).unwrap();
    assert_eq!(a.runs, 10);
    assert_eq!(a.absorbed_releases, 20);
}

#[test]
fn ready_iff_released_since_last_dispatch() {
    let clock = TickClock::new();
    let mut sched = two_task_scheduler();
    let mut counts = Counts::default();

    for _ in 1..=4 {
        sched.release(clock.advance());
    }
    assert_eq!(sched.task_state(0), Some(TaskState::Ready));
    assert_eq!(sched.task_state(1), Some(TaskState::Idle));

    sched.dispatch(&mut counts);
    assert_eq!(sched.pending(), 0);

    sched.release(clock.advance());
    assert_eq!(sched.task_state(1), Some(TaskState::Ready));
}

#[test]
fn release_from_another_thread() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    let ran = Arc::new(AtomicU32::new(0));
    let hits = ran.clone();
    let sched = Scheduler::<_, 2>::init([Task::new("count", 1, move |_: &mut ()| {
        hits.fetch_add(1, Ordering::Relaxed);
    })])
    .unwrap();
    let clock = TickClock::new();

    std::thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..100 {
                sched.release(clock.advance());
            }
        });
    });

    let mut sched = sched;
    assert_eq!(sched.dispatch(&mut ()), 1);
    assert_eq!(ran.load(Ordering::Relaxed), 1);
    assert_eq!(sched.task_stats(0).unwrap().absorbed_releases, 99);
}
