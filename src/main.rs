//! Robot firmware entry point
//!
//! Initializes the system and spawns one task per hardware concern. All
//! decisions are taken by the control loop in `rover_core`; the tasks only
//! move bytes, samples, ticks and duty cycles between it and the hardware.

#![no_std]
#![no_main]

use crate::task::{
    adc_sampler::adc_sampler,
    control::control,
    display::display,
    motor_driver::motor_driver,
    serial_link::{device_link, wireless_link},
    switches::{identify_switch, stop_switch},
    time_base::time_base,
};
use defmt::info;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use system::resources::{
    AssignedResources, BoardIoResources, DeviceLinkResources, IdentifySwitchResources,
    SensorResources, StopSwitchResources, WheelResources, WirelessLinkResources,
};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// System core modules
mod system;
/// Task implementations
mod task;

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    info!("IoT rover starting");

    // Split the resources into separate groups, one per task
    let r = split_resources!(p);

    // Time base first, every other task measures against it
    spawner.spawn(time_base()).unwrap();
    spawner.spawn(motor_driver(r.wheels)).unwrap();
    spawner.spawn(wireless_link(r.wireless_link)).unwrap();
    spawner.spawn(device_link(r.device_link)).unwrap();
    spawner.spawn(adc_sampler(r.sensors)).unwrap();
    spawner.spawn(stop_switch(r.stop_switch)).unwrap();
    spawner.spawn(identify_switch(r.identify_switch)).unwrap();
    spawner.spawn(display()).unwrap();
    spawner.spawn(control(r.board_io)).unwrap();
}
