// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Givesync - reconciles donor-platform activity into the accounting ledger.
//!
//! This is the binary entry point for the Givesync server and its operator
//! commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod serve;
mod status;
mod watermark;

/// Givesync - donor-platform to ledger reconciliation.
#[derive(Parser, Debug)]
#[command(name = "givesync", version, about, long_about = None)]
struct Cli {
    /// Path to a specific config file (overrides the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Givesync HTTP server.
    Serve,
    /// Show recent sync runs.
    Status {
        /// Restrict to one sync kind (stripe, batch, registrations).
        #[arg(long)]
        kind: Option<String>,
        /// Number of runs to show.
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Reset a sync watermark (the only sanctioned backward move).
    ResetWatermark {
        /// Sync kind (stripe, batch, registrations).
        kind: String,
        /// Explicit ISO-8601 boundary. Omit to delete the watermark so the
        /// next run re-initializes to "now".
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => givesync_config::load_config_from_path(path),
        None => givesync_config::load_config(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("givesync: failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) | None => serve::run_serve(config).await,
        Some(Commands::Status { kind, limit }) => {
            status::run_status(&config, kind.as_deref(), limit).await
        }
        Some(Commands::ResetWatermark { kind, to }) => {
            watermark::run_reset(&config, &kind, to.as_deref()).await
        }
    };

    if let Err(e) = result {
        eprintln!("givesync: {e}");
        std::process::exit(1);
    }
}
