//! Round-robin analog sampling
//!
//! The sampler visits left detector, right detector and thumb wheel in turn,
//! one conversion each, and publishes every result scaled down to 10 bits.
//! It never pauses: after the thumb it wraps to the left detector.

use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorChannel {
    Left,
    Right,
    Thumb,
}

impl SensorChannel {
    pub const fn next(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Thumb,
            Self::Thumb => Self::Left,
        }
    }
}

/// Latest scaled reading of every channel
pub struct SensorReadings {
    left: AtomicU16,
    right: AtomicU16,
    thumb: AtomicU16,
    cycles: AtomicU32,
}

impl Default for SensorReadings {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorReadings {
    pub const fn new() -> Self {
        Self {
            left: AtomicU16::new(0),
            right: AtomicU16::new(0),
            thumb: AtomicU16::new(0),
            cycles: AtomicU32::new(0),
        }
    }

    fn slot(&self, channel: SensorChannel) -> &AtomicU16 {
        match channel {
            SensorChannel::Left => &self.left,
            SensorChannel::Right => &self.right,
            SensorChannel::Thumb => &self.thumb,
        }
    }

    pub fn get(&self, channel: SensorChannel) -> u16 {
        self.slot(channel).load(Ordering::Relaxed)
    }

    pub fn left(&self) -> u16 {
        self.get(SensorChannel::Left)
    }

    pub fn right(&self) -> u16 {
        self.get(SensorChannel::Right)
    }

    pub fn thumb(&self) -> u16 {
        self.get(SensorChannel::Thumb)
    }

    /// Completed left-right-thumb rounds
    pub fn cycles(&self) -> u32 {
        self.cycles.load(Ordering::Relaxed)
    }
}

/// Owned by the conversion-complete context
#[derive(Debug)]
pub struct AdcSampler {
    channel: SensorChannel,
}

impl Default for AdcSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl AdcSampler {
    pub const fn new() -> Self {
        Self {
            channel: SensorChannel::Left,
        }
    }

    /// Channel the multiplexer must be set to for the pending conversion
    pub fn channel(&self) -> SensorChannel {
        self.channel
    }

    /// Conversion-complete entry point. Publishes `raw >> 2` for the current
    /// channel and returns the channel to convert next.
    pub fn on_conversion(&mut self, raw: u16, readings: &SensorReadings) -> SensorChannel {
        readings.slot(self.channel).store(raw >> 2, Ordering::Relaxed);
        if self.channel == SensorChannel::Thumb {
            readings.cycles.fetch_add(1, Ordering::Relaxed);
        }
        self.channel = self.channel.next();
        self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin_and_scaling() {
        let readings = SensorReadings::new();
        let mut sampler = AdcSampler::new();

        assert_eq!(sampler.on_conversion(4095, &readings), SensorChannel::Right);
        assert_eq!(sampler.on_conversion(2400, &readings), SensorChannel::Thumb);
        assert_eq!(sampler.on_conversion(3, &readings), SensorChannel::Left);

        assert_eq!(readings.left(), 1023);
        assert_eq!(readings.right(), 600);
        assert_eq!(readings.thumb(), 0);
        assert_eq!(readings.cycles(), 1);
    }

    #[test]
    fn test_readings_update_independently() {
        let readings = SensorReadings::new();
        let mut sampler = AdcSampler::new();
        for raw in [400, 800, 1200, 404] {
            sampler.on_conversion(raw, &readings);
        }
        assert_eq!(readings.left(), 101);
        assert_eq!(readings.right(), 200);
        assert_eq!(readings.thumb(), 300);
        assert_eq!(sampler.channel(), SensorChannel::Right);
    }
}
