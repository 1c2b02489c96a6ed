/// Machine-readable probe summary
///
/// Emitted as the last stdout line when `--json` is given, so a harness can
/// read the outcome without scraping report text.
use crate::config::types::Result;
use crate::probe::memory::MemoryOutcome;
use crate::probe::time::TimeOutcome;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    Memory,
    Time,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProbeVerdict {
    /// Memory target fully allocated; the limiter allowed it
    #[serde(rename = "completed")]
    Completed,
    /// Memory allocation denied; the limiter enforced its ceiling
    #[serde(rename = "allocation_exhausted")]
    AllocationExhausted,
    /// Time probe reached its end without being terminated
    #[serde(rename = "limit_not_enforced")]
    LimitNotEnforced,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProbeSummary {
    pub probe: ProbeKind,
    pub verdict: ProbeVerdict,
    pub exit_code: i32,
    /// Target in the probe's unit (MB or seconds)
    pub target: u64,
    /// Units retained (memory) or ticks run (time)
    pub progress: u64,
    pub reports: u64,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_rss_kib: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl ProbeSummary {
    pub fn memory(
        target_mb: u64,
        outcome: &MemoryOutcome,
        elapsed: Duration,
        peak_rss_kib: Option<u64>,
    ) -> Self {
        let (verdict, failure_reason) = match outcome {
            MemoryOutcome::Completed { .. } => (ProbeVerdict::Completed, None),
            MemoryOutcome::Exhausted { reason, .. } => {
                (ProbeVerdict::AllocationExhausted, Some(reason.clone()))
            }
        };
        ProbeSummary {
            probe: ProbeKind::Memory,
            verdict,
            exit_code: outcome.exit().code(),
            target: target_mb,
            progress: outcome.units(),
            reports: outcome.reports(),
            elapsed_ms: millis(elapsed),
            peak_rss_kib,
            failure_reason,
        }
    }

    pub fn time(target_secs: u64, outcome: &TimeOutcome, peak_rss_kib: Option<u64>) -> Self {
        ProbeSummary {
            probe: ProbeKind::Time,
            verdict: ProbeVerdict::LimitNotEnforced,
            exit_code: 0,
            target: target_secs,
            progress: outcome.ticks,
            reports: outcome.reports,
            elapsed_ms: millis(outcome.elapsed),
            peak_rss_kib,
            failure_reason: None,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| std::io::Error::other(e).into())
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
