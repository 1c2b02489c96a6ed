//! Configuration
//!
//! Probe configuration types, input parsing and time probe presets.

pub mod input;
pub mod presets;
pub mod types;
