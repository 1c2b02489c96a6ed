/// Core types shared by the probes
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Size of one allocation unit: one megabyte of the probe's target
pub const UNIT_BYTES: usize = 1024 * 1024;

/// Byte written into every allocated block so its pages are resident
pub const FILL_BYTE: u8 = b'X';

/// Errors raised by the probes
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("allocation of {requested} bytes denied: {reason}")]
    AllocationExhausted { requested: usize, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Process exit status for an error that escapes a probe run
    pub fn exit_code(&self) -> i32 {
        match self {
            ProbeError::AllocationExhausted { .. } => ProbeExit::AllocationExhausted.code(),
            ProbeError::InvalidInput(_) | ProbeError::Config(_) => 2, // usage error, as clap
            ProbeError::Io(_) => 74,                                  // EX_IOERR
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;

/// Exit statuses a probe reports on its own behalf
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeExit {
    /// Target reached (memory) or duration elapsed (time)
    Success,
    /// Allocation denied and handled
    AllocationExhausted,
}

impl ProbeExit {
    pub fn code(self) -> i32 {
        match self {
            ProbeExit::Success => 0,
            ProbeExit::AllocationExhausted => 1,
        }
    }
}

/// Memory probe configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MemoryProbeConfig {
    /// Number of allocation units to acquire
    pub target_mb: u64,
    /// Bytes per allocation unit
    pub unit_bytes: usize,
    /// Emit a progress report every this many retained units
    pub report_every: u64,
}

impl MemoryProbeConfig {
    pub fn new(target_mb: u64) -> Self {
        MemoryProbeConfig {
            target_mb,
            unit_bytes: UNIT_BYTES,
            report_every: 10,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.unit_bytes == 0 {
            return Err(ProbeError::Config("allocation unit size must be non-zero".to_string()));
        }
        if self.report_every == 0 {
            return Err(ProbeError::Config("report cadence must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Time probe configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimeProbeConfig {
    /// Total duration the probe tries to run for
    pub duration: Duration,
    /// Sleep granularity of one tick
    pub tick: Duration,
    /// Emit a progress report every this many ticks
    pub report_every: u64,
    /// Limit the external supervisor is expected to enforce; drives the
    /// informational near-limit marker
    pub expected_limit: Option<Duration>,
}

impl TimeProbeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick.is_zero() {
            return Err(ProbeError::Config("tick must be non-zero".to_string()));
        }
        if self.report_every == 0 {
            return Err(ProbeError::Config("report cadence must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Number of ticks needed to cover the whole duration
    pub fn total_ticks(&self) -> u64 {
        let tick = self.tick.as_nanos();
        if tick == 0 {
            return 0;
        }
        let ticks = self.duration.as_nanos().div_ceil(tick);
        u64::try_from(ticks).unwrap_or(u64::MAX)
    }

    /// Elapsed window in which the near-limit marker is emitted
    pub fn marker_window(&self) -> Option<(Duration, Duration)> {
        self.expected_limit
            .map(|limit| (limit.saturating_sub(self.tick), limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fine(duration_ms: u64) -> TimeProbeConfig {
        TimeProbeConfig {
            duration: Duration::from_millis(duration_ms),
            tick: Duration::from_millis(100),
            report_every: 10,
            expected_limit: Some(Duration::from_secs(1)),
        }
    }

    #[test]
    fn test_total_ticks_rounds_up() {
        assert_eq!(fine(1000).total_ticks(), 10);
        assert_eq!(fine(1050).total_ticks(), 11);
        assert_eq!(fine(0).total_ticks(), 0);
    }

    #[test]
    fn test_marker_window_ends_at_limit() {
        let (lower, upper) = fine(1000).marker_window().unwrap();
        assert_eq!(lower, Duration::from_millis(900));
        assert_eq!(upper, Duration::from_secs(1));

        let mut config = fine(1000);
        config.expected_limit = None;
        assert!(config.marker_window().is_none());
    }

    #[test]
    fn test_validate_rejects_zero_cadence() {
        let mut config = fine(1000);
        config.report_every = 0;
        assert!(matches!(config.validate(), Err(ProbeError::Config(_))));

        let mut config = MemoryProbeConfig::new(5);
        config.unit_bytes = 0;
        assert!(config.validate().is_err());
        assert!(MemoryProbeConfig::new(0).validate().is_ok());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ProbeExit::Success.code(), 0);
        assert_eq!(ProbeExit::AllocationExhausted.code(), 1);
        assert_eq!(ProbeError::InvalidInput("x".into()).exit_code(), 2);
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        assert_eq!(ProbeError::from(io).exit_code(), 74);
    }
}
