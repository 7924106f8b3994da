//! Wheel drive patterns
//!
//! Each pattern is a fixed set of duty cycles on the four wheel outputs.

use crate::board::{Actuators, Output};
use crate::config::{
    DUTY_CRUISE, DUTY_FAST_LEFT, DUTY_FAST_RIGHT, DUTY_PIVOT, DUTY_REVERSE, DUTY_SPIN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    /// All wheel outputs at zero
    #[default]
    Off,
    /// Slow straight drive used while following the line
    Cruise,
    ForwardFast,
    ReverseFast,
    SpinClockwise,
    SpinCounterClockwise,
    /// Right wheel only, turns the rover left
    PivotLeft,
    /// Left wheel only, turns the rover right
    PivotRight,
}

/// Duty of every wheel output for one pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WheelDuty {
    pub right_forward: u16,
    pub right_reverse: u16,
    pub left_forward: u16,
    pub left_reverse: u16,
}

impl From<Drive> for WheelDuty {
    fn from(drive: Drive) -> Self {
        let off = WheelDuty::default();
        match drive {
            Drive::Off => off,
            Drive::Cruise => WheelDuty {
                right_forward: DUTY_CRUISE,
                left_forward: DUTY_CRUISE,
                ..off
            },
            Drive::ForwardFast => WheelDuty {
                right_forward: DUTY_FAST_RIGHT,
                left_forward: DUTY_FAST_LEFT,
                ..off
            },
            Drive::ReverseFast => WheelDuty {
                right_reverse: DUTY_REVERSE,
                left_reverse: DUTY_REVERSE,
                ..off
            },
            Drive::SpinClockwise => WheelDuty {
                right_forward: DUTY_SPIN,
                left_reverse: DUTY_SPIN,
                ..off
            },
            Drive::SpinCounterClockwise => WheelDuty {
                right_reverse: DUTY_SPIN,
                left_forward: DUTY_SPIN,
                ..off
            },
            Drive::PivotLeft => WheelDuty {
                right_forward: DUTY_PIVOT,
                ..off
            },
            Drive::PivotRight => WheelDuty {
                left_forward: DUTY_PIVOT,
                ..off
            },
        }
    }
}

impl WheelDuty {
    /// Writes all four wheel outputs. Forward and reverse of one wheel are
    /// never both non-zero.
    pub fn apply<A: Actuators>(&self, actuators: &mut A) {
        actuators.set_duty(Output::RightReverse, self.right_reverse);
        actuators.set_duty(Output::RightForward, self.right_forward);
        actuators.set_duty(Output::LeftReverse, self.left_reverse);
        actuators.set_duty(Output::LeftForward, self.left_forward);
    }
}
