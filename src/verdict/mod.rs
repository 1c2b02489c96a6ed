//! Probe outcomes
//!
//! Verdict classification and the JSON summary of a probe run.

pub mod summary;
