//! limit-probes: programs that push against a sandbox's resource limits
//!
//! Each probe is meant to run under an external supervisor (a judge or
//! sandbox) and shows on its output stream whether that supervisor enforced
//! the limit.
//!
//! # Architecture
//!
//! ## Probes ([`probe`])
//! - [`probe::memory`]: allocate and retain 1 MiB blocks until a target or a denial
//! - [`probe::time`]: sleep in ticks, reporting monotonic elapsed time
//!
//! ## Configuration ([`config`])
//! - [`config::types`]: probe configs, error type, exit statuses
//! - [`config::presets`]: named time probe configurations
//! - [`config::input`]: target parsing from arguments or stdin
//!
//! ## Outcomes ([`verdict`])
//! - [`verdict::summary`]: JSON summary of a run
//!
//! ## Kernel evidence ([`kernel`])
//! - [`kernel::rusage`]: peak RSS via `getrusage`
//!
//! ## Utilities ([`utils`])
//! - [`utils::output`]: line-flushed report stream
//!
//! # Design Principles
//!
//! 1. **The supervisor is the only enforcer** - probes install no signal
//!    handlers and never cap themselves
//! 2. **Never shrink** - an acquired block is held until the process exits
//! 3. **Every report is visible** - each line is flushed before the next step

// Probes
pub mod probe;

// Configuration
pub mod config;

// Outcomes
pub mod verdict;

// Kernel evidence
pub mod kernel;

// Utilities
pub mod utils;

// CLI entrypoint wiring shared by the probe binaries.
pub mod cli;

pub use config::types::*;
