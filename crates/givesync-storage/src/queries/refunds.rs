// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-registration refund watermarks.
//!
//! Tracks the last seen cumulative refund total for each registration in a
//! dedicated indexed table rather than the flat settings store, since the row
//! count grows with distinct registrations ever seen. Rows are never pruned:
//! an old registration can still refund again.

use givesync_core::SyncError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Last seen cumulative refund total for a registration, in minor units.
pub async fn get(db: &Database, registration_id: &str) -> Result<Option<i64>, SyncError> {
    let registration_id = registration_id.to_string();
    db.connection()
        .call(move |conn| {
            let value = conn
                .query_row(
                    "SELECT refunded_minor FROM refund_watermarks WHERE registration_id = ?1",
                    params![registration_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
        .map_err(map_tr_err)
}

/// Record the new cumulative refund total for a registration.
pub async fn set(
    db: &Database,
    registration_id: &str,
    refunded_minor: i64,
) -> Result<(), SyncError> {
    let registration_id = registration_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO refund_watermarks (registration_id, refunded_minor, updated_at)
                 VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(registration_id) DO UPDATE
                 SET refunded_minor = excluded.refunded_minor,
                     updated_at = excluded.updated_at",
                params![registration_id, refunded_minor],
            )?;
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
    async fn unknown_registration_has_no_watermark() {
        let (db, _dir) = setup_db().await;
        assert!(get(&db, "reg-1").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn set_updates_cumulative_total_in_place() {
        let (db, _dir) = setup_db().await;
        set(&db, "reg-1", 2000).await.unwrap();
        assert_eq!(get(&db, "reg-1").await.unwrap(), Some(2000));

        set(&db, "reg-1", 3500).await.unwrap();
        assert_eq!(get(&db, "reg-1").await.unwrap(), Some(3500));

        db.close().await.unwrap();
    }
}
