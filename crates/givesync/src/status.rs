// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `givesync status` command implementation.
//!
//! Prints the most recent sync runs from the run log, newest first.

use givesync_config::GivesyncConfig;
use givesync_core::SyncError;
use givesync_storage::{Database, queries::run_log};

/// Run the `givesync status` command.
pub async fn run_status(
    config: &GivesyncConfig,
    kind: Option<&str>,
    limit: i64,
) -> Result<(), SyncError> {
    let db = Database::open(&config.storage.database_path).await?;
    let runs = run_log::recent(&db, kind, limit).await?;
    db.close().await?;

    if runs.is_empty() {
        println!("no runs recorded");
        return Ok(());
    }

    for run in runs {
        let finished = run.finished_at.as_deref().unwrap_or("(running)");
        println!(
            "#{} {:<14} {:<8} started={} finished={} committed={} skipped={} {}",
            run.id,
            run.sync_kind,
            run.status,
            run.started_at,
            finished,
            run.committed,
            run.skipped,
            run.message,
        );
    }
    Ok(())
}
