//! Resource-limit probes
//!
//! Each probe pushes against one limit and reports as it goes. Enforcing the
//! limit is left entirely to the supervisor running the probe.

pub mod memory;
pub mod time;
