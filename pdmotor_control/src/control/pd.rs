//! Fixed-point PD law with symmetric saturation.
//!
//! `torque = clamp((kp * error - kd * velocity) / scale, ±max_torque)`
//!
//! Intermediates are 64-bit with saturating arithmetic, so no gain or input
//! combination can overflow or escape the clamp.

use pdmotor_common::config::ControllerConfig;
use pdmotor_common::consts::MAX_TORQUE;

/// PD gains in fixed point: the applied gain is `kp / scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdGains {
    /// Proportional gain.
    pub kp: i32,
    /// Derivative gain, applied to measured velocity.
    pub kd: i32,
    /// Fixed-point divisor (non-positive values act as 1).
    pub scale: i32,
    /// Output saturation limit, capped at full duty.
    pub max_torque: i16,
}

impl PdGains {
    pub const fn from_config(config: &ControllerConfig) -> Self {
        Self {
            kp: config.kp,
            kd: config.kd,
            scale: config.gain_scale,
            max_torque: config.max_torque,
        }
    }

    /// Effective saturation limit.
    #[inline]
    pub const fn limit(&self) -> i16 {
        let abs = self.max_torque.unsigned_abs();
        if abs > MAX_TORQUE as u16 {
            MAX_TORQUE
        } else {
            abs as i16
        }
    }
}

impl Default for PdGains {
    fn default() -> Self {
        Self::from_config(&ControllerConfig::default())
    }
}

/// Compute one PD step.
///
/// # Arguments
/// - `gains`: PD gains.
/// - `error`: Target minus position [deg].
/// - `velocity`: Measured velocity [deg/s].
///
/// # Returns
/// Signed torque command in `[-limit, +limit]`.
#[inline]
pub fn pd_compute(gains: &PdGains, error: i32, velocity: i32) -> i16 {
    let p_term = i64::from(gains.kp).saturating_mul(i64::from(error));
    let d_term = i64::from(gains.kd).saturating_mul(i64::from(velocity));
    let raw = p_term.saturating_sub(d_term) / i64::from(gains.scale.max(1));

    let limit = i64::from(gains.limit());
    raw.clamp(-limit, limit) as i16
}

// ─── Tests ──────────────────────────────────────────────────────────
