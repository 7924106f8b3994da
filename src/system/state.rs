//! Shared State
//!
//! State written by one context and read by another. Every item has exactly
//! one writer:
//! - `TIME_BASE`: the time base task (counter resets come from the control loop)
//! - `SENSORS`: the ADC sampler task
//! - `WIRELESS_RX` / `DEVICE_RX`: the receive half of the matching link task
//! - `WIRELESS_TX`: armed by the control loop, drained by the wireless link task
//!
//! All of them are built from atomics, no lock is taken on either side.

use rover_core::adc::SensorReadings;
use rover_core::serial::{RxRing, TxBuffer};
use rover_core::time_base::TimeBase;

/// 10 ms time base with all elapsed-time counters
pub static TIME_BASE: TimeBase = TimeBase::new();

/// Latest scaled detector and thumb readings
pub static SENSORS: SensorReadings = SensorReadings::new();

/// Bytes received from the WiFi module
pub static WIRELESS_RX: RxRing = RxRing::new();

/// Bytes received on the debug console
pub static DEVICE_RX: RxRing = RxRing::new();

/// AT command sequence waiting to go out to the WiFi module
pub static WIRELESS_TX: TxBuffer = TxBuffer::new();
