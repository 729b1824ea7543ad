//! Hardware capabilities consumed by the control core.
//!
//! The core never touches registers. It reads the encoder through
//! [`PositionSensor`], commands the H-bridge through [`MotorDriver`], and
//! programs the tick timer through [`TimerPeripheral`]. Board crates and the
//! host simulator provide the implementations.

use crate::types::TimerMode;

/// Absolute angular position source (quadrature encoder counter).
pub trait PositionSensor {
    /// Signed transition count since power-up.
    ///
    /// Wraps according to the limits of the underlying encoder counter.
    fn read_position_counts(&self) -> i32;
}

/// Signed torque sink (PWM duty + direction).
pub trait MotorDriver {
    /// Apply a torque command.
    ///
    /// The sign selects direction, the magnitude (0..=255) selects duty.
    fn drive(&mut self, torque: i16);
}

/// Register set that fully describes a programmed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRegisters {
    /// Waveform generation mode.
    pub mode: TimerMode,
    /// Clock-select bits for the chosen prescaler.
    pub clock_select: u8,
    /// Compare-match value.
    pub top: u16,
}

/// A timer/counter peripheral that accepts a complete register set.
///
/// `commit` applies mode, clock-select and top as one unit; callers never
/// observe a partially programmed timer.
pub trait TimerPeripheral {
    fn commit(&mut self, registers: TimerRegisters);
}

impl<T: PositionSensor + ?Sized> PositionSensor for &T {
    #[inline]
    fn read_position_counts(&self) -> i32 {
        (**self).read_position_counts()
    }
}

impl<T: PositionSensor + ?Sized> PositionSensor for &mut T {
    #[inline]
    fn read_position_counts(&self) -> i32 {
        (**self).read_position_counts()
    }
}

impl<T: MotorDriver + ?Sized> MotorDriver for &mut T {
    #[inline]
    fn drive(&mut self, torque: i16) {
        (**self).drive(torque)
    }
}

impl<T: TimerPeripheral + ?Sized> TimerPeripheral for &mut T {
    #[inline]
    fn commit(&mut self, registers: TimerRegisters) {
        (**self).commit(registers)
    }
}
