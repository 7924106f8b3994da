//! Embassy tasks, one per hardware concern
pub mod adc_sampler;
pub mod control;
pub mod display;
pub mod motor_driver;
pub mod serial_link;
pub mod switches;
pub mod time_base;
