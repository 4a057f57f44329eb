//! Ballot daemon: entry point for operating an election ledger.

mod cli;
mod commands;
mod config;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use ballot_election::ElectionProcessor;
use ballot_store_lmdb::{check_data_dir, check_integrity, LmdbLedger};

use crate::cli::{Cli, Command};
use crate::config::DaemonConfig;

/// File settings first, then flags and environment variables on top.
fn load_config(cli: &Cli) -> anyhow::Result<DaemonConfig> {
    let mut config = match cli.config {
        Some(ref path) => DaemonConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => DaemonConfig::default(),
    };
    if let Some(ref data_dir) = cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(map_size_mb) = cli.map_size_mb {
        config.map_size_mb = map_size_mb;
    }
    if let Some(ref log_level) = cli.log_level {
        config.log_level = log_level.clone();
    }
    if let Some(log_format) = cli.log_format {
        config.log_format = log_format;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    ballot_utils::init_logging(config.log_format, &config.log_level);

    let command = match cli.command {
        Command::ShowConfig => {
            print!("{}", config.to_toml_string()?);
            return Ok(());
        }
        Command::Ledger(command) => command,
    };

    check_data_dir(&config.data_dir).map_err(anyhow::Error::msg)?;
    let ledger = LmdbLedger::open(&config.data_dir, config.map_size_bytes())
        .with_context(|| format!("opening ledger at {}", config.data_dir.display()))?;
    let ledger = Arc::new(ledger);

    let report = check_integrity(&ledger)?;
    if !report.is_healthy() {
        for error in &report.errors {
            tracing::warn!("integrity check: {error}");
        }
    }
    tracing::debug!(
        keys = report.keys_checked,
        revisions = report.revisions_checked,
        "ledger opened"
    );

    let processor = ElectionProcessor::new(ledger.clone(), config.election.clone());
    let relay = processor.notifier().spawn_relay(ledger.clone());

    let outcome = commands::run(&processor, command);

    // Closing the notifier lets the relay drain and stop.
    drop(processor);
    let forwarded = relay.await.context("notification relay panicked")?;
    tracing::debug!(forwarded, "notification relay finished");

    let output = outcome?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
