// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only idempotency ledger.
//!
//! A (kind, fingerprint) pair marks a logical unit of work as already
//! committed. Rows are never deleted.

use givesync_core::SyncError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Returns true when the fingerprint has already been marked.
pub async fn has(db: &Database, kind: &str, fingerprint: &str) -> Result<bool, SyncError> {
    let kind = kind.to_string();
    let fingerprint = fingerprint.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM idempotency WHERE kind = ?1 AND fingerprint = ?2",
                params![kind, fingerprint],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Mark a fingerprint as committed. Duplicate marks are no-ops, not errors.
pub async fn mark(db: &Database, kind: &str, fingerprint: &str) -> Result<(), SyncError> {
    let kind = kind.to_string();
    let fingerprint = fingerprint.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO idempotency (kind, fingerprint) VALUES (?1, ?2)",
                params![kind, fingerprint],
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
    async fn mark_then_has() {
        let (db, _dir) = setup_db().await;
        assert!(!has(&db, "stripe", "fp-1").await.unwrap());

        mark(&db, "stripe", "fp-1").await.unwrap();
        assert!(has(&db, "stripe", "fp-1").await.unwrap());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_mark_is_a_noop() {
        let (db, _dir) = setup_db().await;
        mark(&db, "batch", "item-9|b-2").await.unwrap();
        mark(&db, "batch", "item-9|b-2").await.unwrap();
        assert!(has(&db, "batch", "item-9|b-2").await.unwrap());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn fingerprints_are_scoped_by_kind() {
        let (db, _dir) = setup_db().await;
        mark(&db, "stripe", "fp-shared").await.unwrap();
        assert!(!has(&db, "batch", "fp-shared").await.unwrap());
        db.close().await.unwrap();
    }
}
