use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Usage ledger analytics backend
#[derive(Parser, Debug)]
#[command(name = "usage-ledger")]
#[command(about = "Ingest an LLM usage ledger and serve rollup statistics")]
#[command(version)]
pub struct Cli {
    /// Directory holding the SQLite database
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Usage ledger to ingest (overrides the config file)
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API (default)
    Serve {
        /// Override the configured port for this run only
        #[arg(long)]
        port: Option<u16>,
        /// Skip the catch-up ingestion on startup
        #[arg(long)]
        no_ingest: bool,
    },
    /// Ingest new ledger lines and exit
    Ingest,
    /// Print the ingestion cursor
    Status,
    /// Delete all events, rollups and the cursor
    Clear {
        #[arg(long)]
        batch_size: Option<usize>,
    },
}
