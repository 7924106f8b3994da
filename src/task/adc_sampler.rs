//! ADC Sampler Task
//!
//! Converts left detector, right detector and thumb wheel in turn, forever.
//! Each result is published through `SENSORS`, already scaled to 10 bits.

use defmt::{info, warn};
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::gpio::Pull;
use rover_core::adc::{AdcSampler, SensorChannel};

use crate::system::resources::{Irqs, SensorResources};
use crate::system::state::SENSORS;

#[embassy_executor::task]
pub async fn adc_sampler(r: SensorResources) {
    let mut adc = Adc::new(r.adc, Irqs, adc::Config::default());

    // Indexed in sampling order
    let mut channels = [
        Channel::new_pin(r.left_pin, Pull::None),
        Channel::new_pin(r.right_pin, Pull::None),
        Channel::new_pin(r.thumb_pin, Pull::None),
    ];

    let mut sampler = AdcSampler::new();
    info!("ADC sampler starting");

    loop {
        let channel = &mut channels[slot(sampler.channel())];
        match adc.read(channel).await {
            Ok(raw) => {
                sampler.on_conversion(raw, &SENSORS);
            }
            // Retried on the same channel
            Err(e) => warn!("conversion on {} failed: {}", sampler.channel(), e),
        }
    }
}

fn slot(channel: SensorChannel) -> usize {
    match channel {
        SensorChannel::Left => 0,
        SensorChannel::Right => 1,
        SensorChannel::Thumb => 2,
    }
}
