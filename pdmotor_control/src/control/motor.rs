//! Stateful PD controller driving the motor.
//!
//! Every service call writes a torque to the motor, so a disturbed shaft is
//! always pushed back toward the effective target. With a poll divisor N the
//! law is evaluated on every N-th call and the last torque is re-emitted in
//! between. While paused the controller writes zero torque.

use pdmotor_common::config::ControllerConfig;
use pdmotor_common::hw::{MotorDriver, PositionSensor};
use tracing::debug;

use super::pd::{PdGains, pd_compute};
use crate::interpolator::Interpolator;

/// Snapshot of the controller for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerStatus {
    pub kp: i32,
    pub kd: i32,
    pub last_torque: i16,
    pub poll_divisor: u8,
    pub logging: bool,
    pub paused: bool,
    /// Law evaluations since start.
    pub evaluations: u32,
}

#[derive(Debug, Clone)]
pub struct PdController {
    gains: PdGains,
    poll_divisor: u8,
    logging: bool,
    paused: bool,
    last_torque: i16,
    services: u32,
    evaluations: u32,
}

impl PdController {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            gains: PdGains::from_config(config),
            poll_divisor: config.poll_divisor.max(1),
            logging: config.logging,
            paused: false,
            last_torque: 0,
            services: 0,
            evaluations: 0,
        }
    }

    /// Run one control step and write the resulting torque to `hardware`.
    pub fn service<H, const N: usize>(
        &mut self,
        interpolator: &Interpolator<N>,
        hardware: &mut H,
    ) -> i16
    where
        H: PositionSensor + MotorDriver + ?Sized,
    {
        let torque = self.update(interpolator, &*hardware);
        hardware.drive(torque);
        torque
    }

    /// Compute the torque for this service call without driving it.
    pub fn update<S, const N: usize>(
        &mut self,
        interpolator: &Interpolator<N>,
        sensor: &S,
    ) -> i16
    where
        S: PositionSensor + ?Sized,
    {
        let due = self.services % u32::from(self.poll_divisor) == 0;
        self.services = self.services.wrapping_add(1);

        let torque = if self.paused {
            0
        } else if due {
            self.evaluate(interpolator, sensor)
        } else {
            self.last_torque
        };
        self.last_torque = torque;
        torque
    }

    fn evaluate<S, const N: usize>(&mut self, interpolator: &Interpolator<N>, sensor: &S) -> i16
    where
        S: PositionSensor + ?Sized,
    {
        let position = interpolator.current_position(sensor);
        let target = interpolator.target_for(position);
        let velocity = interpolator.current_velocity();
        let error = target.saturating_sub(position);
        let torque = pd_compute(&self.gains, error, velocity);
        self.evaluations = self.evaluations.wrapping_add(1);

        if self.logging {
            debug!(
                "pd: target={} pos={} err={} vel={} torque={}",
                target, position, error, velocity, torque
            );
        }
        torque
    }

    // ─── Tuning ─────────────────────────────────────────────────────

    #[inline]
    pub const fn gains(&self) -> &PdGains {
        &self.gains
    }

    pub fn set_kp(&mut self, kp: i32) {
        self.gains.kp = kp;
    }

    pub fn set_kd(&mut self, kd: i32) {
        self.gains.kd = kd;
    }

    pub fn adjust_kp(&mut self, delta: i32) {
        self.gains.kp = self.gains.kp.saturating_add(delta);
    }

    pub fn adjust_kd(&mut self, delta: i32) {
        self.gains.kd = self.gains.kd.saturating_add(delta);
    }

    /// Evaluate the law every `divisor` service calls (0 acts as 1).
    pub fn set_poll_divisor(&mut self, divisor: u8) {
        self.poll_divisor = divisor.max(1);
        self.services = 0;
    }

    pub fn set_logging(&mut self, enabled: bool) {
        self.logging = enabled;
    }

    #[inline]
    pub const fn logging(&self) -> bool {
        self.logging
    }

    // ─── Pause ──────────────────────────────────────────────────────

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.services = 0;
    }

    #[inline]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub const fn last_torque(&self) -> i16 {
        self.last_torque
    }

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            kp: self.gains.kp,
            kd: self.gains.kd,
            last_torque: self.last_torque,
            poll_divisor: self.poll_divisor,
            logging: self.logging,
            paused: self.paused,
            evaluations: self.evaluations,
        }
    }
}
