/// Time probe presets
///
/// Presets are immutable named configurations. CLI flags override single
/// fields after a preset is selected, never the preset itself.
use crate::config::types::{ProbeError, Result, TimeProbeConfig};
use std::time::Duration;

/// Seconds a time probe runs for when none are requested
pub const DEFAULT_SECONDS: u64 = 10;

/// Named time probe preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePreset {
    /// 100 ms ticks, a report every second, marker before a 1 s limit
    Fine,
    /// 1 s ticks, a report every tick, no marker
    PerSecond,
}

impl TimePreset {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "fine" => Ok(TimePreset::Fine),
            "per-second" => Ok(TimePreset::PerSecond),
            _ => Err(ProbeError::Config(format!("unknown time preset: {name}"))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TimePreset::Fine => "fine",
            TimePreset::PerSecond => "per-second",
        }
    }

    /// Build the preset's configuration for the given duration
    pub fn config(self, seconds: u64) -> TimeProbeConfig {
        let duration = Duration::from_secs(seconds);
        match self {
            TimePreset::Fine => TimeProbeConfig {
                duration,
                tick: Duration::from_millis(100),
                report_every: 10,
                expected_limit: Some(Duration::from_secs(1)),
            },
            TimePreset::PerSecond => TimeProbeConfig {
                duration,
                tick: Duration::from_secs(1),
                report_every: 1,
                expected_limit: None,
            },
        }
    }
}
