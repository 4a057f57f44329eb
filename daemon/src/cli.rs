//! Command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ballot_utils::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "ballot-daemon", about = "Election ledger: cast votes, read tallies, audit history")]
pub struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and environment variables override them.
    #[arg(long, env = "BALLOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory for ledger storage.
    #[arg(long, env = "BALLOT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Maximum LMDB map size in MiB.
    #[arg(long, env = "BALLOT_MAP_SIZE_MB")]
    pub map_size_mb: Option<usize>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BALLOT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BALLOT_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the effective configuration as TOML.
    ShowConfig,
    #[command(flatten)]
    Ledger(LedgerCommand),
}

/// Commands that open the ledger.
#[derive(Debug, Subcommand)]
pub enum LedgerCommand {
    /// Create a zero tally for every roster candidate.
    Init,
    /// Record one vote.
    Cast {
        #[arg(long)]
        receipt: String,
        #[arg(long)]
        candidate: String,
        #[arg(long, default_value = "")]
        region: String,
    },
    /// Show the vote recorded for a receipt.
    Vote { receipt: String },
    /// Show every candidate's tally, in roster order.
    Results,
    /// Show every version of a record, oldest first.
    History {
        #[command(subcommand)]
        target: HistoryTarget,
    },
    /// Recompute tallies from the stored votes and compare.
    Audit,
    /// List forwarded vote notifications.
    Events,
}

#[derive(Debug, Subcommand)]
pub enum HistoryTarget {
    Vote { receipt: String },
    Candidate { id: String },
}
