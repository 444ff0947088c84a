use serde_json::json;
use tracing::{info, warn};

use crate::analyzers::{QueryEngine, QueryReport};
use crate::cli::args::{Cli, Commands};
use crate::config::{AppConfig, StoreConfig};
use crate::error::Result;
use crate::processors::{LoadReport, StationLoader};
use crate::store::{connect, WideColumnStore};
use crate::utils::progress::ProgressReporter;

pub fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let command = cli.command.unwrap_or_default();
    info!(?command, table = %config.table, stations = config.stations.len(), "Starting");

    match command {
        Commands::Run => {
            let (load, queries) = with_store(&config.store, |store| {
                let load = load_phase(store, &config, cli.json)?;
                let queries = query_phase(store, &config)?;
                Ok((load, queries))
            })?;

            if cli.json {
                println!("{}", json!({ "load": load, "queries": queries }));
            } else {
                println!("{}\n", load);
                println!("{}", queries);
            }
        }

        Commands::Load => {
            let load = with_store(&config.store, |store| load_phase(store, &config, cli.json))?;

            if cli.json {
                println!("{}", json!({ "load": load }));
            } else {
                println!("{}", load);
            }
        }

        Commands::Query => {
            let queries = with_store(&config.store, |store| query_phase(store, &config))?;

            if cli.json {
                println!("{}", json!({ "queries": queries }));
            } else {
                println!("{}", queries);
            }
        }
    }

    info!("All operations completed");
    Ok(())
}

/// Open a store, run `f`, and close the store whether or not `f` succeeded.
pub fn with_store<T>(
    config: &StoreConfig,
    f: impl FnOnce(&mut dyn WideColumnStore) -> Result<T>,
) -> Result<T> {
    let mut store = connect(config)?;
    let outcome = f(store.as_mut());
    let closed = store.close();
    info!("Closed store connection");

    if let (Err(_), Err(close_error)) = (&outcome, &closed) {
        warn!(error = %close_error, "Failed to close store after an earlier error");
    }

    let value = outcome?;
    closed?;
    Ok(value)
}

/// Recreate the table and load every configured station.
pub fn load_phase(
    store: &mut dyn WideColumnStore,
    config: &AppConfig,
    silent: bool,
) -> Result<LoadReport> {
    let loader = StationLoader::new(config.table.clone(), config.column_family.clone())
        .with_hour_format(config.hour_format);

    info!(table = %config.table, "Resetting table");
    loader.reset_table(store)?;

    let progress = ProgressReporter::new(config.stations.len() as u64, "Loading stations...", silent);
    let report = loader.load_all(store, &config.stations, Some(&progress))?;
    progress.finish_with_message(&format!("Loaded {} rows", report.total_rows()));

    Ok(report)
}

/// Run the four queries against the configured table.
pub fn query_phase(store: &dyn WideColumnStore, config: &AppConfig) -> Result<QueryReport> {
    let engine = QueryEngine::new(store, config.table.clone()).with_hour_format(config.hour_format);
    QueryReport::collect(&engine, config)
}
