/// Time probe
///
/// Sleeps in fixed ticks and reports elapsed time measured from a monotonic
/// start instant. Reaching the end means the external limiter never fired.
use crate::config::types::{Result, TimeProbeConfig};
use crate::utils::output::Reporter;
use std::io::Write;
use std::time::{Duration, Instant};

/// Monotonic time source and sleeper
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// `Instant` plus `thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Result of a time probe that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOutcome {
    pub ticks: u64,
    pub reports: u64,
    pub elapsed: Duration,
}

pub struct TimeProbe<C: Clock> {
    config: TimeProbeConfig,
    clock: C,
}

impl TimeProbe<MonotonicClock> {
    pub fn new(config: TimeProbeConfig) -> Result<Self> {
        Self::with_clock(config, MonotonicClock)
    }
}

impl<C: Clock> TimeProbe<C> {
    pub fn with_clock(config: TimeProbeConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(TimeProbe { config, clock })
    }

    /// Run every tick, then report completion.
    ///
    /// Being killed part way is the expected end; nothing here observes it.
    pub fn run<W: Write>(&self, reporter: &mut Reporter<W>) -> Result<TimeOutcome> {
        let ticks = self.config.total_ticks();
        let marker = self.config.marker_window();

        reporter.line(format_args!(
            "Running for {} seconds ({} ticks of {} ms)...",
            format_secs(self.config.duration),
            ticks,
            self.config.tick.as_millis()
        ))?;
        log::info!("time probe started: {:?}", self.config);

        let start = self.clock.now();
        let mut reports = 0;

        // Each tick samples and reports first, then sleeps; the last sample
        // after the loop covers the final sleep.
        for tick in 1..=ticks {
            let elapsed = self.clock.now().saturating_duration_since(start);

            if tick % self.config.report_every == 0 {
                reporter.line(format_args!("Elapsed {} seconds", format_secs(elapsed)))?;
                reports += 1;
            }

            if let Some((lower, limit)) = marker {
                if elapsed >= lower && elapsed < limit {
                    reporter.line(format_args!(
                        ">>> approaching the {} second limit, termination expected <<<",
                        format_secs(limit)
                    ))?;
                }
            }

            self.clock.sleep(self.config.tick);
        }

        let elapsed = self.clock.now().saturating_duration_since(start);
        reporter.line(format_args!("Probe completed! Total elapsed: {} seconds", format_secs(elapsed)))?;
        reporter.line(format_args!("ERROR: time limit was not enforced!"))?;
        log::warn!("time probe ran to completion after {:?}; no external termination", elapsed);

        Ok(TimeOutcome { ticks, reports, elapsed })
    }
}

fn format_secs(duration: Duration) -> String {
    format!("{:.2}", duration.as_secs_f64())
}
