use anyhow::Result;

fn main() -> Result<()> {
    limit_probes::cli::run(limit_probes::cli::CliMode::Time)
}
