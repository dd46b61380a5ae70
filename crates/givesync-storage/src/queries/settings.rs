// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value settings, including the per-sync-kind watermarks.
//!
//! `set` is a native atomic upsert, so there is no window where a key is
//! briefly absent. Watermark keys are only written while the corresponding
//! run lock is held.

use givesync_core::SyncError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Get a setting value by key.
pub async fn get(db: &Database, key: &str) -> Result<Option<String>, SyncError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM settings WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
        .map_err(map_tr_err)
}

/// Upsert a setting value.
pub async fn set(db: &Database, key: &str, value: &str) -> Result<(), SyncError> {
    let key = key.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO settings (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(key) DO UPDATE
                 SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a setting row. Used by the operator watermark reset.
pub async fn delete(db: &Database, key: &str) -> Result<(), SyncError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM settings WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn get_missing_key_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get(&db, "watermark.stripe").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let (db, _dir) = setup_db().await;
        set(&db, "watermark.stripe", "2026-08-01T00:00:00Z")
            .await
            .unwrap();
        let value = get(&db, "watermark.stripe").await.unwrap();
        assert_eq!(value.as_deref(), Some("2026-08-01T00:00:00Z"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let (db, _dir) = setup_db().await;
        set(&db, "watermark.batch", "2026-08-01T00:00:00Z")
            .await
            .unwrap();
        set(&db, "watermark.batch", "2026-08-02T00:00:00Z")
            .await
            .unwrap();
        let value = get(&db, "watermark.batch").await.unwrap();
        assert_eq!(value.as_deref(), Some("2026-08-02T00:00:00Z"));

        // Upsert keeps a single row per key.
        let count: i64 = db
            .connection()
            .call(|conn| {
                let n = conn.query_row(
                    "SELECT COUNT(*) FROM settings WHERE key = 'watermark.batch'",
                    [],
                    |row| row.get(0),
                )?;
                Ok::<i64, rusqlite::Error>(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let (db, _dir) = setup_db().await;
        set(&db, "watermark.registrations", "2026-08-01T00:00:00Z")
            .await
            .unwrap();
        delete(&db, "watermark.registrations").await.unwrap();
        assert!(get(&db, "watermark.registrations").await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
