use anyhow::Context;
use clap::Parser;
use weather_table::cli::{run, Cli};
use weather_table::utils::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let outcome = run(cli);
    if let Err(ref e) = outcome {
        tracing::error!(error = %e, "Run failed");
    }
    outcome.context("weather-table run failed")
}
