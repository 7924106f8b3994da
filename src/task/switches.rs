//! Switch handling
//!
//! A falling edge latches a press in the time base and arms its debounce
//! countdown. The switch then ignores edges until the time base reports the
//! countdown expired, which is how bounces are swallowed.

use defmt::debug;
use embassy_rp::gpio::{Input, Pull};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use rover_core::time_base::Switch;

use crate::system::resources::{IdentifySwitchResources, StopSwitchResources};
use crate::system::state::TIME_BASE;

static STOP_RELEASE: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static IDENTIFY_RELEASE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

fn release_signal(switch: Switch) -> &'static Signal<CriticalSectionRawMutex, ()> {
    match switch {
        Switch::Stop => &STOP_RELEASE,
        Switch::Identify => &IDENTIFY_RELEASE,
    }
}

/// Re-enables edge detection of a switch once its debounce countdown ran out
pub fn release(switch: Switch) {
    release_signal(switch).signal(());
}

/// SW1 handler
#[embassy_executor::task]
pub async fn stop_switch(r: StopSwitchResources) {
    let mut input = Input::new(r.pin, Pull::Up);
    handle_switch(&mut input, Switch::Stop).await;
}

/// SW2 handler
#[embassy_executor::task]
pub async fn identify_switch(r: IdentifySwitchResources) {
    let mut input = Input::new(r.pin, Pull::Up);
    handle_switch(&mut input, Switch::Identify).await;
}

/// Switches pull the line low when pressed
async fn handle_switch(input: &mut Input<'static>, switch: Switch) {
    let released = release_signal(switch);
    loop {
        input.wait_for_falling_edge().await;
        debug!("switch {} pressed", switch);
        released.reset();
        TIME_BASE.press(switch);
        released.wait().await;
    }
}
