use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use crate::config::input;
use crate::config::presets::{TimePreset, DEFAULT_SECONDS};
use crate::config::types::{MemoryProbeConfig, ProbeError, ProbeExit, TimeProbeConfig};
use crate::kernel::rusage::peak_rss_kib;
use crate::probe::memory::{MemoryProbe, RetainedBlocks};
use crate::probe::time::TimeProbe;
use crate::utils::output::Reporter;
use crate::verdict::summary::ProbeSummary;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CliMode {
    Compat,
    Memory,
    Time,
}

impl CliMode {
    pub fn primary_binary(self) -> &'static str {
        match self {
            Self::Compat => "probe",
            Self::Memory => "memory-probe",
            Self::Time => "time-probe",
        }
    }
}

#[derive(Parser)]
#[command(name = "probe", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
#[command(name = "memory-probe", version, about = "Allocate memory until a target is reached or denied")]
struct MemoryCli {
    #[command(flatten)]
    args: MemoryArgs,
}

#[derive(Parser)]
#[command(name = "time-probe", version, about = "Run for a duration, reporting elapsed time")]
struct TimeCli {
    #[command(flatten)]
    args: TimeArgs,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Allocate 1 MiB blocks until the target is reached or allocation fails
    Memory(MemoryArgs),
    /// Sleep in ticks and report elapsed time until the duration ends
    Time(TimeArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct MemoryArgs {
    /// Megabytes to allocate (read from stdin when omitted)
    #[arg(value_parser = target_arg, allow_negative_numbers = true)]
    pub target_mb: Option<u64>,
    /// Report progress every N megabytes
    #[arg(long, default_value_t = 10)]
    pub report_every: u64,
    /// Append a JSON summary line
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct TimeArgs {
    /// Seconds to run for
    #[arg(value_parser = target_arg, allow_negative_numbers = true)]
    pub seconds: Option<u64>,
    /// Preset: fine (100 ms ticks) or per-second
    #[arg(long, default_value = "fine")]
    pub preset: String,
    /// Tick length in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,
    /// Report every N ticks
    #[arg(long)]
    pub report_every: Option<u64>,
    /// Limit the supervisor is expected to enforce, in milliseconds
    #[arg(long, conflicts_with = "no_marker")]
    pub expected_limit_ms: Option<u64>,
    /// Never print the near-limit marker
    #[arg(long)]
    pub no_marker: bool,
    /// Append a JSON summary line
    #[arg(long)]
    pub json: bool,
}

fn target_arg(raw: &str) -> std::result::Result<u64, String> {
    input::parse_target(raw).map_err(|e| e.to_string())
}

/// Parse `args` (including the binary name) for the given mode
pub fn parse_command<I, T>(mode: CliMode, args: I) -> std::result::Result<Commands, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match mode {
        CliMode::Compat => Cli::try_parse_from(args).map(|cli| cli.command),
        CliMode::Memory => MemoryCli::try_parse_from(args).map(|cli| Commands::Memory(cli.args)),
        CliMode::Time => TimeCli::try_parse_from(args).map(|cli| Commands::Time(cli.args)),
    }
}

/// Resolve the time probe configuration from a preset and overrides
pub fn time_config(args: &TimeArgs) -> crate::config::types::Result<TimeProbeConfig> {
    let preset = TimePreset::from_name(&args.preset)?;
    let mut config = preset.config(args.seconds.unwrap_or(DEFAULT_SECONDS));
    if let Some(tick_ms) = args.tick_ms {
        config.tick = Duration::from_millis(tick_ms);
    }
    if let Some(report_every) = args.report_every {
        config.report_every = report_every;
    }
    if let Some(limit_ms) = args.expected_limit_ms {
        config.expected_limit = Some(Duration::from_millis(limit_ms));
    }
    if args.no_marker {
        config.expected_limit = None;
    }
    config.validate()?;
    log::debug!("time probe config (preset {}): {:?}", preset.name(), config);
    Ok(config)
}

/// Outcome of one probe invocation
pub struct Execution {
    pub exit: ProbeExit,
    retained: Option<RetainedBlocks>,
}

impl Execution {
    /// Blocks still owned by the invocation (memory probe only)
    pub fn retained(&self) -> Option<&RetainedBlocks> {
        self.retained.as_ref()
    }
}

/// Run a parsed command against the given input and report streams
pub fn execute<R: BufRead, W: Write>(command: Commands, input: R, out: W) -> Result<Execution> {
    let mut reporter = Reporter::new(out);
    match command {
        Commands::Memory(args) => {
            let target_mb = match args.target_mb {
                Some(target) => target,
                None => input::read_target(input).context("reading target megabytes")?,
            };
            let mut config = MemoryProbeConfig::new(target_mb);
            config.report_every = args.report_every;
            log::debug!("memory probe config: {:?}", config);

            let started = Instant::now();
            let mut probe = MemoryProbe::new(config)?;
            let outcome = probe.run(&mut reporter)?;
            let peak = peak_rss_kib();
            log::info!("memory probe peak RSS: {:?} KiB", peak);

            if args.json {
                let summary = ProbeSummary::memory(target_mb, &outcome, started.elapsed(), peak);
                reporter.line(format_args!("{}", summary.to_json()?))?;
            }

            Ok(Execution {
                exit: outcome.exit(),
                retained: Some(probe.into_retained()),
            })
        }
        Commands::Time(args) => {
            let config = time_config(&args)?;
            let target_secs = config.duration.as_secs();
            let probe = TimeProbe::new(config)?;
            let outcome = probe.run(&mut reporter)?;

            if args.json {
                let summary = ProbeSummary::time(target_secs, &outcome, peak_rss_kib());
                reporter.line(format_args!("{}", summary.to_json()?))?;
            }

            Ok(Execution {
                exit: ProbeExit::Success,
                retained: None,
            })
        }
    }
}

/// Exit status for an error that ended an invocation
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<ProbeError>()
        .map(ProbeError::exit_code)
        .unwrap_or(1)
}

pub fn run(mode: CliMode) -> Result<()> {
    env_logger::init();

    // No signal handlers: the supervisor's termination must take effect immediately.
    let command = parse_command(mode, std::env::args_os()).unwrap_or_else(|e| e.exit());
    log::debug!("{} invoked with {:?}", mode.primary_binary(), command);

    let stdin = std::io::stdin();
    let execution = match execute(command, stdin.lock(), std::io::stdout().lock()) {
        Ok(execution) => execution,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(exit_code_for(&e));
        }
    };

    // Retained blocks are released by process exit, never dropped before it.
    std::process::exit(execution.exit.code())
}
