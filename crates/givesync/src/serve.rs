// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `givesync serve` command implementation.

use givesync_config::GivesyncConfig;
use givesync_core::SyncError;
use givesync_gateway::AppState;
use givesync_storage::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize logging and run the HTTP server until the process exits.
pub async fn run_serve(config: GivesyncConfig) -> Result<(), SyncError> {
    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        database = %config.storage.database_path,
        host = %config.server.host,
        port = config.server.port,
        "starting givesync"
    );

    let db = Database::open(&config.storage.database_path).await?;
    let state = AppState::new(config, db);
    givesync_gateway::start_server(state).await
}
