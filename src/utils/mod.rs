//! Utilities
//!
//! Cross-cutting utilities shared by both probes.

pub mod output;
