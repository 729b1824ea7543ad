//! Trajectory interpolator.
//!
//! Holds a bounded FIFO of absolute target positions [deg]. The head target
//! is what the controller drives toward, but only through a rate-limited
//! effective target that never leads the current position by more than
//! `max_delta_degrees`. Once the position has come within
//! `close_enough_degrees` of the effective target, the head is retired after
//! dwelling `endzone_ms` in the end-zone.
//!
//! The interpolator also owns the velocity estimate: a finite difference of
//! successive positions over the wall time between samples, in deg/s.
//!
//! All position reads go through a [`PositionSensor`] passed in by the
//! caller; the interpolator itself holds no hardware.

use heapless::Deque;
use pdmotor_common::config::InterpolatorConfig;
use pdmotor_common::consts::TARGET_QUEUE_CAPACITY;
use pdmotor_common::error::InterpolatorError;
use pdmotor_common::hw::PositionSensor;
use pdmotor_common::types::EndzoneState;
use tracing::{debug, info};

use crate::clock::elapsed_ms;

#[inline]
fn saturate_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Position observed at a given uptime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PositionSample {
    position: i32,
    at_ms: u32,
}

/// Target queue and setpoint generator for the position loop.
#[derive(Debug)]
pub struct Interpolator<const N: usize = TARGET_QUEUE_CAPACITY> {
    config: InterpolatorConfig,
    targets: Deque<i32, N>,
    endzone: EndzoneState,
    last_sample: Option<PositionSample>,
    velocity_dps: i32,
}

impl<const N: usize> Interpolator<N> {
    pub fn new(config: InterpolatorConfig) -> Self {
        Self {
            config,
            targets: Deque::new(),
            endzone: EndzoneState::OutOfEndzone,
            last_sample: None,
            velocity_dps: 0,
        }
    }

    #[inline]
    pub const fn config(&self) -> &InterpolatorConfig {
        &self.config
    }

    // ─── Positions ──────────────────────────────────────────────────

    /// Convert raw encoder counts to degrees, truncating toward zero.
    #[inline]
    pub fn counts_to_degrees(&self, counts: i32) -> i32 {
        let tpr = i64::from(self.config.transitions_per_revolution.max(1));
        saturate_i32(360 * i64::from(counts) / tpr)
    }

    /// Current shaft position [deg].
    #[inline]
    pub fn current_position<S: PositionSensor + ?Sized>(&self, sensor: &S) -> i32 {
        self.counts_to_degrees(sensor.read_position_counts())
    }

    /// Effective target for a known `position`: the head target clamped to
    /// `position ± max_delta_degrees`, or `position` itself when the queue
    /// is empty.
    pub fn target_for(&self, position: i32) -> i32 {
        let Some(&head) = self.targets.front() else {
            return position;
        };
        let max_delta = i64::from(self.config.max_delta_degrees);
        let delta = i64::from(head) - i64::from(position);
        if delta > max_delta {
            saturate_i32(i64::from(position) + max_delta)
        } else if delta < -max_delta {
            saturate_i32(i64::from(position) - max_delta)
        } else {
            head
        }
    }

    /// Rate-limited effective target [deg].
    pub fn target_position<S: PositionSensor + ?Sized>(&self, sensor: &S) -> i32 {
        self.target_for(self.current_position(sensor))
    }

    /// Head target without rate limiting, or the current position when the
    /// queue is empty.
    pub fn absolute_target_position<S: PositionSensor + ?Sized>(&self, sensor: &S) -> i32 {
        match self.targets.front() {
            Some(&head) => head,
            None => self.current_position(sensor),
        }
    }

    // ─── Queue ──────────────────────────────────────────────────────

    /// Append an absolute target [deg].
    pub fn add_target(&mut self, position: i32) -> Result<(), InterpolatorError> {
        self.targets
            .push_back(position)
            .map_err(|position| InterpolatorError::TargetQueueFull {
                capacity: N,
                position,
            })?;
        debug!("Queued target {} deg ({}/{})", position, self.targets.len(), N);
        Ok(())
    }

    /// Append a target `delta` degrees past the last queued target, or past
    /// the current position when the queue is empty.
    pub fn add_relative_target<S: PositionSensor + ?Sized>(
        &mut self,
        sensor: &S,
        delta: i32,
    ) -> Result<(), InterpolatorError> {
        let base = match self.targets.back() {
            Some(&tail) => tail,
            None => self.current_position(sensor),
        };
        self.add_target(base.saturating_add(delta))
    }

    /// Drop every queued target and leave the end-zone.
    pub fn clear_targets(&mut self) {
        self.targets.clear();
        self.endzone = EndzoneState::OutOfEndzone;
    }

    #[inline]
    pub fn queue_len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Queued targets, head first.
    pub fn targets(&self) -> impl Iterator<Item = i32> + '_ {
        self.targets.iter().copied()
    }

    #[inline]
    pub const fn endzone_state(&self) -> EndzoneState {
        self.endzone
    }

    // ─── Periodic Services ──────────────────────────────────────────

    /// End-zone state machine. Returns the retired target, if any.
    ///
    /// Once in the end-zone only the dwell timer is consulted; leaving the
    /// radius again does not restart the dwell.
    pub fn service<S: PositionSensor + ?Sized>(&mut self, sensor: &S, now_ms: u32) -> Option<i32> {
        let &head = self.targets.front()?;

        match self.endzone {
            EndzoneState::OutOfEndzone => {
                let position = self.current_position(sensor);
                let distance = (i64::from(self.target_for(position)) - i64::from(position)).abs();
                if distance < i64::from(self.config.close_enough_degrees) {
                    debug!("Entered end-zone of target {} deg at {}ms", head, now_ms);
                    self.endzone = EndzoneState::InEndzone { entered_ms: now_ms };
                }
                None
            }
            EndzoneState::InEndzone { entered_ms } => {
                if elapsed_ms(now_ms, entered_ms) <= self.config.endzone_ms {
                    return None;
                }
                let reached = self.targets.pop_front();
                self.endzone = EndzoneState::OutOfEndzone;
                info!(
                    "Target {} deg reached, {} remaining",
                    head,
                    self.targets.len()
                );
                reached
            }
        }
    }

    /// Update the velocity estimate from a fresh position sample.
    ///
    /// The first sample only seeds the estimator. A sample taken at the
    /// same millisecond as the previous one is ignored.
    pub fn service_velocity<S: PositionSensor + ?Sized>(&mut self, sensor: &S, now_ms: u32) {
        let position = self.current_position(sensor);
        if let Some(last) = self.last_sample {
            let dt = elapsed_ms(now_ms, last.at_ms);
            if dt == 0 {
                return;
            }
            let travelled = i64::from(position) - i64::from(last.position);
            self.velocity_dps = saturate_i32(travelled * 1000 / i64::from(dt));
        }
        self.last_sample = Some(PositionSample {
            position,
            at_ms: now_ms,
        });
    }

    /// Last velocity estimate [deg/s].
    #[inline]
    pub const fn current_velocity(&self) -> i32 {
        self.velocity_dps
    }
}
