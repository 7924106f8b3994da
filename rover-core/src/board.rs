//! Hardware boundary
//!
//! The core never touches registers. Duty cycles, the wireless transmit path
//! and the few digital outputs go through these traits; the firmware
//! implements them on top of the HAL and tests implement them with recorders.

/// The five duty-cycle outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Output {
    RightForward,
    RightReverse,
    LeftForward,
    LeftReverse,
    Backlight,
}

impl Output {
    pub const ALL: [Output; 5] = [
        Output::RightForward,
        Output::RightReverse,
        Output::LeftForward,
        Output::LeftReverse,
        Output::Backlight,
    ];

    pub const fn index(self) -> usize {
        match self {
            Self::RightForward => 0,
            Self::RightReverse => 1,
            Self::LeftForward => 2,
            Self::LeftReverse => 3,
            Self::Backlight => 4,
        }
    }
}

/// "Set actuator duty cycle" capability
pub trait Actuators {
    /// `duty` is in PWM counts out of [`crate::config::PWM_TOP`]
    fn set_duty(&mut self, output: Output, duty: u16);
}

/// Everything the control loop drives
pub trait Board: Actuators {
    /// Arms a line-feed terminated sequence on the wireless link
    fn transmit(&mut self, sequence: &'static [u8]);

    /// Wireless module enable, together with the link indicator
    fn set_module_enable(&mut self, on: bool);

    /// Line detector emitter
    fn set_ir_emitter(&mut self, on: bool);
}
