// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `givesync reset-watermark` command implementation.
//!
//! Deleting the watermark makes the next run re-initialize to "now";
//! pinning it with `--to` replays the window from an explicit boundary.

use std::str::FromStr;

use givesync_config::GivesyncConfig;
use givesync_core::{SyncError, SyncKind};
use givesync_storage::{Database, queries::settings};

/// Run the `givesync reset-watermark` command.
pub async fn run_reset(
    config: &GivesyncConfig,
    kind: &str,
    to: Option<&str>,
) -> Result<(), SyncError> {
    let kind = SyncKind::from_str(kind)
        .map_err(|_| SyncError::Config(format!("unknown sync kind '{kind}'")))?;
    let key = kind.watermark_key();

    let db = Database::open(&config.storage.database_path).await?;
    match to {
        Some(boundary) => {
            // Validate before writing: a malformed watermark poisons runs.
            chrono::DateTime::parse_from_rfc3339(boundary).map_err(|e| {
                SyncError::Config(format!("'{boundary}' is not an ISO-8601 timestamp: {e}"))
            })?;
            settings::set(&db, &key, boundary).await?;
            println!("watermark {key} set to {boundary}");
        }
        None => {
            settings::delete(&db, &key).await?;
            println!("watermark {key} deleted; next run will initialize to now");
        }
    }
    db.close().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn test_config(dir: &tempfile::TempDir) -> GivesyncConfig {
        let mut config = GivesyncConfig::default();
        config.storage.database_path = dir
            .path()
            .join("cli.db")
            .to_str()
            .unwrap()
            .to_string();
        config
    }

    #[tokio::test]
    async fn reset_with_boundary_pins_the_watermark() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);

        run_reset(&config, "stripe", Some("2026-08-01T00:00:00Z"))
            .await
            .unwrap();

        let db = Database::open(&config.storage.database_path).await.unwrap();
        let stored = settings::get(&db, "watermark.stripe").await.unwrap();
        assert_eq!(stored.as_deref(), Some("2026-08-01T00:00:00Z"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reset_without_boundary_deletes_the_row() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);

        run_reset(&config, "batch", Some("2026-08-01T00:00:00Z"))
            .await
            .unwrap();
        run_reset(&config, "batch", None).await.unwrap();

        let db = Database::open(&config.storage.database_path).await.unwrap();
        assert!(settings::get(&db, "watermark.batch").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn invalid_inputs_are_rejected() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);

        assert!(run_reset(&config, "quarterly", None).await.is_err());
        assert!(
            run_reset(&config, "stripe", Some("yesterday"))
                .await
                .is_err()
        );
    }
}
