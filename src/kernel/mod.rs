//! Thin wrappers around Linux kernel interfaces.

pub mod rusage;
