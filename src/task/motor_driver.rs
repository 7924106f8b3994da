//! Motor Driver Task
//!
//! Owns the three PWM slices behind the five duty-cycle outputs and writes
//! whatever duty set the control loop published last.
//!
//! # Hardware Configuration
//!
//! **Right wheel (PWM Slice 5, GPIO 10-11):** A forward, B reverse
//!
//! **Left wheel (PWM Slice 6, GPIO 12-13):** A forward, B reverse
//!
//! **Backlight (PWM Slice 7, GPIO 14):** A only
//!
//! All slices count to the same top, so a duty value means the same on
//! every output.

use defmt::{debug, info, warn};
use embassy_rp::pwm::{self, Pwm, PwmOutput, SetDutyCycle};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use rover_core::board::{Actuators, Output};
use rover_core::config::PWM_TOP;

use crate::system::resources::WheelResources;

/// Duty of every output, indexed by [`Output::index`]
pub type Duties = [u16; 5];

/// Latest duty set, older sets are overwritten before they are applied
static DUTY_SIGNAL: Signal<CriticalSectionRawMutex, Duties> = Signal::new();

/// Publish a new duty set for the motor driver task
pub fn set_duties(duties: Duties) {
    DUTY_SIGNAL.signal(duties);
}

async fn wait_duties() -> Duties {
    DUTY_SIGNAL.wait().await
}

/// PWM channel mapping, slices split into separate outputs
struct PwmChannels {
    right_forward: PwmOutput<'static>,
    right_reverse: PwmOutput<'static>,
    left_forward: PwmOutput<'static>,
    left_reverse: PwmOutput<'static>,
    backlight: PwmOutput<'static>,
}

impl Actuators for PwmChannels {
    fn set_duty(&mut self, output: Output, duty: u16) {
        let pwm_output = match output {
            Output::RightForward => &mut self.right_forward,
            Output::RightReverse => &mut self.right_reverse,
            Output::LeftForward => &mut self.left_forward,
            Output::LeftReverse => &mut self.left_reverse,
            Output::Backlight => &mut self.backlight,
        };
        if pwm_output.set_duty_cycle(duty.min(PWM_TOP)).is_err() {
            warn!("duty {} rejected on {}", duty, output);
        }
    }
}

/// Motor driver task
#[embassy_executor::task]
pub async fn motor_driver(r: WheelResources) {
    info!("Motor driver task starting");

    let mut config = pwm::Config::default();
    config.top = PWM_TOP;

    let right = Pwm::new_output_ab(
        r.right_slice,
        r.right_forward_pin,
        r.right_reverse_pin,
        config.clone(),
    );
    let left = Pwm::new_output_ab(
        r.left_slice,
        r.left_forward_pin,
        r.left_reverse_pin,
        config.clone(),
    );
    let backlight = Pwm::new_output_a(r.backlight_slice, r.backlight_pin, config);

    let (right_a, right_b) = right.split();
    let (left_a, left_b) = left.split();
    let (backlight_a, _) = backlight.split();

    // Both channels of each slice were configured above
    let mut channels = PwmChannels {
        right_forward: right_a.expect("right channel A not configured"),
        right_reverse: right_b.expect("right channel B not configured"),
        left_forward: left_a.expect("left channel A not configured"),
        left_reverse: left_b.expect("left channel B not configured"),
        backlight: backlight_a.expect("backlight channel A not configured"),
    };

    for output in Output::ALL {
        channels.set_duty(output, 0);
    }
    info!("Motor driver initialized - all outputs off");

    loop {
        let duties = wait_duties().await;
        debug!("duties {}", duties);
        for output in Output::ALL {
            channels.set_duty(output, duties[output.index()]);
        }
    }
}
