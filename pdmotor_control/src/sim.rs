//! Simulated rig hardware.
//!
//! [`SimulatedMotor`] is a first-order DC motor model with a quadrature
//! encoder: the shaft speed relaxes toward `speed_per_torque * torque` with
//! time constant `time_constant_s`, and the encoder reports whole
//! transitions. [`SimulatedTimer`] records the register sets committed to it.

use pdmotor_common::consts::TRANSITIONS_PER_REVOLUTION;
use pdmotor_common::hw::{MotorDriver, PositionSensor, TimerPeripheral, TimerRegisters};

/// Plant parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantParams {
    /// Steady-state speed per unit torque [deg/s].
    pub speed_per_torque: f64,
    /// Mechanical time constant [s].
    pub time_constant_s: f64,
    /// Encoder transitions per output revolution.
    pub transitions_per_revolution: i32,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            speed_per_torque: 4.0,
            time_constant_s: 0.05,
            transitions_per_revolution: TRANSITIONS_PER_REVOLUTION,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedMotor {
    params: PlantParams,
    position_deg: f64,
    velocity_dps: f64,
    torque: i16,
    drive_writes: u64,
}

impl SimulatedMotor {
    pub fn new(params: PlantParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Advance the model by `dt_s` seconds under the last commanded torque.
    pub fn step(&mut self, dt_s: f64) {
        if dt_s <= 0.0 {
            return;
        }
        let target_speed = self.params.speed_per_torque * f64::from(self.torque);
        let tau = self.params.time_constant_s;
        if tau > 0.0 {
            let alpha = (dt_s / tau).min(1.0);
            self.velocity_dps += alpha * (target_speed - self.velocity_dps);
        } else {
            self.velocity_dps = target_speed;
        }
        self.position_deg += self.velocity_dps * dt_s;
    }

    /// Displace the shaft by hand.
    pub fn perturb(&mut self, degrees: f64) {
        self.position_deg += degrees;
    }

    #[inline]
    pub fn position_degrees(&self) -> f64 {
        self.position_deg
    }

    #[inline]
    pub fn velocity_dps(&self) -> f64 {
        self.velocity_dps
    }

    /// Last torque written by the controller.
    #[inline]
    pub fn torque(&self) -> i16 {
        self.torque
    }

    /// Number of torque writes received.
    #[inline]
    pub fn drive_writes(&self) -> u64 {
        self.drive_writes
    }
}

impl PositionSensor for SimulatedMotor {
    fn read_position_counts(&self) -> i32 {
        let counts =
            self.position_deg * f64::from(self.params.transitions_per_revolution) / 360.0;
        // Float-to-int `as` saturates at the i32 bounds.
        counts.trunc() as i32
    }
}

impl MotorDriver for SimulatedMotor {
    fn drive(&mut self, torque: i16) {
        self.torque = torque;
        self.drive_writes += 1;
    }
}

/// Timer peripheral that records what was committed.
#[derive(Debug, Clone, Default)]
pub struct SimulatedTimer {
    registers: Option<TimerRegisters>,
    commits: u32,
}

impl SimulatedTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registers(&self) -> Option<TimerRegisters> {
        self.registers
    }

    pub fn commits(&self) -> u32 {
        self.commits
    }
}

impl TimerPeripheral for SimulatedTimer {
    fn commit(&mut self, registers: TimerRegisters) {
        self.registers = Some(registers);
        self.commits += 1;
    }
}
