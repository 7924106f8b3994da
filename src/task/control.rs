//! Control Loop Task
//!
//! Runs the cooperative main loop: one `Controller::poll` per pass, then the
//! display refresh, then a yield so the other tasks get to run. Nothing in
//! here awaits anything else, the loop never blocks.

use defmt::{info, warn};
use embassy_futures::yield_now;
use embassy_rp::gpio::{Level, Output as GpioOutput};
use rover_core::board::{Actuators, Board, Output};
use rover_core::controller::{Controller, Shared};

use crate::system::resources::BoardIoResources;
use crate::system::state::{SENSORS, TIME_BASE, WIRELESS_RX, WIRELESS_TX};
use crate::task::{display, motor_driver, serial_link};

/// The hardware as the control loop sees it
struct ControlBoard {
    duties: motor_driver::Duties,
    module_enable: GpioOutput<'static>,
    link_led: GpioOutput<'static>,
    ir_emitter: GpioOutput<'static>,
}

impl Actuators for ControlBoard {
    fn set_duty(&mut self, output: Output, duty: u16) {
        self.duties[output.index()] = duty;
        motor_driver::set_duties(self.duties);
    }
}

impl Board for ControlBoard {
    fn transmit(&mut self, sequence: &'static [u8]) {
        match WIRELESS_TX.arm(sequence) {
            Ok(()) => serial_link::wake_wireless_tx(),
            Err(e) => warn!("cannot send {=[u8]:a}: {}", sequence, e),
        }
    }

    fn set_module_enable(&mut self, on: bool) {
        info!("wireless module {}", if on { "enabled" } else { "disabled" });
        self.module_enable.set_level(Level::from(on));
        self.link_led.set_level(Level::from(on));
    }

    fn set_ir_emitter(&mut self, on: bool) {
        self.ir_emitter.set_level(Level::from(on));
    }
}

#[embassy_executor::task]
pub async fn control(r: BoardIoResources) {
    let mut board = ControlBoard {
        duties: [0; 5],
        module_enable: GpioOutput::new(r.module_enable_pin, Level::Low),
        link_led: GpioOutput::new(r.link_led_pin, Level::Low),
        ir_emitter: GpioOutput::new(r.ir_emitter_pin, Level::Low),
    };

    let shared = Shared {
        time: &TIME_BASE,
        sensors: &SENSORS,
        wireless: &WIRELESS_RX,
    };
    let mut controller = Controller::new();
    info!("Control loop starting");

    loop {
        controller.poll(&shared, &mut board);

        if TIME_BASE.take_refresh() && controller.display_mut().take_changed() {
            display::show(controller.display().rows());
        }

        yield_now().await;
    }
}
