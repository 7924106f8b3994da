//! Core system components for robot operation
pub mod resources;
pub mod state;
