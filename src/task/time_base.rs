//! Time Base Task
//!
//! Ticks `TIME_BASE` every 10 ms and hands expired debounce timers back to
//! their switch tasks.

use defmt::info;
use embassy_time::{Duration, Ticker};
use rover_core::config::TICK_MS;

use crate::system::state::TIME_BASE;
use crate::task::switches;

#[embassy_executor::task]
pub async fn time_base() {
    info!("Time base starting, {} ms tick", TICK_MS);
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    loop {
        ticker.next().await;
        for switch in TIME_BASE.tick().iter() {
            switches::release(switch);
        }
    }
}
