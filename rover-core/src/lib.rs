//! IoT rover control core
//!
//! Everything the firmware decides lives here: the 10 ms time base, the serial
//! rings of both links, the wireless boot handshake, the `^0000<A><P>\r` command
//! protocol, and the motion and line-follow state machines. The crate has no HAL
//! dependency, so the whole behaviour is tested on the host.
//!
//! Shared state (counters, rings, sensor readings) is made of atomics and is
//! meant to live in `static`s written by exactly one context each. The state
//! machines are plain values stepped by the control loop; each step returns the
//! next state together with the [`effect::Effect`]s the caller must apply.

#![no_std]

#[macro_use]
mod fmt;

pub mod adc;
pub mod board;
pub mod boot;
pub mod config;
pub mod controller;
pub mod display;
pub mod drive;
pub mod effect;
pub mod error;
pub mod line_follow;
pub mod motion;
pub mod protocol;
pub mod serial;
pub mod time_base;
