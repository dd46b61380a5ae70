// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run log: one row per orchestrator execution.
//!
//! Rows are created optimistically with status `success` at run start and
//! finalized with the real outcome at run end.

use givesync_core::SyncError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::RunLogEntry;

/// Create a run-log row at run start. Returns the row id.
pub async fn start(db: &Database, sync_kind: &str) -> Result<i64, SyncError> {
    let sync_kind = sync_kind.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO run_log (sync_kind, started_at)
                 VALUES (?1, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![sync_kind],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Finalize a run-log row with the terminal outcome.
#[allow(clippy::too_many_arguments)]
pub async fn finish(
    db: &Database,
    id: i64,
    window_start: &str,
    window_end: &str,
    committed: u32,
    skipped: u32,
    status: &str,
    message: &str,
) -> Result<(), SyncError> {
    let window_start = window_start.to_string();
    let window_end = window_end.to_string();
    let status = status.to_string();
    let message = message.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE run_log
                    SET finished_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                        window_start = ?2, window_end = ?3,
                        committed = ?4, skipped = ?5, status = ?6, message = ?7
                  WHERE id = ?1",
                params![id, window_start, window_end, committed, skipped, status, message],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// List the most recent runs, newest first, optionally for one sync kind.
pub async fn recent(
    db: &Database,
    sync_kind: Option<&str>,
    limit: i64,
) -> Result<Vec<RunLogEntry>, SyncError> {
    let sync_kind = sync_kind.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            let map_row = |row: &rusqlite::Row<'_>| {
                Ok(RunLogEntry {
                    id: row.get(0)?,
                    sync_kind: row.get(1)?,
                    started_at: row.get(2)?,
                    finished_at: row.get(3)?,
                    window_start: row.get(4)?,
                    window_end: row.get(5)?,
                    committed: row.get(6)?,
                    skipped: row.get(7)?,
                    status: row.get(8)?,
                    message: row.get(9)?,
                })
            };
            let mut entries = Vec::new();
            match &sync_kind {
                Some(kind) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, sync_kind, started_at, finished_at, window_start,
                                window_end, committed, skipped, status, message
                         FROM run_log WHERE sync_kind = ?1
                         ORDER BY id DESC LIMIT ?2",
                    )?;
                    let rows = stmt.query_map(params![kind, limit], map_row)?;
                    for row in rows {
                        entries.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, sync_kind, started_at, finished_at, window_start,
                                window_end, committed, skipped, status, message
                         FROM run_log ORDER BY id DESC LIMIT ?1",
                    )?;
                    let rows = stmt.query_map(params![limit], map_row)?;
                    for row in rows {
                        entries.push(row?);
                    }
                }
            }
            Ok(entries)
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
    async fn start_creates_optimistic_success_row() {
        let (db, _dir) = setup_db().await;
        let id = start(&db, "stripe").await.unwrap();
        assert!(id > 0);

        let entries = recent(&db, None, 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, "success");
        assert!(entries[0].finished_at.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn finish_records_terminal_outcome() {
        let (db, _dir) = setup_db().await;
        let id = start(&db, "batch").await.unwrap();
        finish(
            &db,
            id,
            "2026-08-01T00:00:00Z",
            "2026-08-07T00:00:00Z",
            3,
            1,
            "partial",
            "1 group failed: ledger class not found",
        )
        .await
        .unwrap();

        let entries = recent(&db, Some("batch"), 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.status, "partial");
        assert_eq!(entry.committed, 3);
        assert_eq!(entry.skipped, 1);
        assert!(entry.finished_at.is_some());
        assert!(entry.message.contains("ledger class"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_filtered() {
        let (db, _dir) = setup_db().await;
        let _a = start(&db, "stripe").await.unwrap();
        let b = start(&db, "stripe").await.unwrap();
        let _c = start(&db, "registrations").await.unwrap();

        let stripe_runs = recent(&db, Some("stripe"), 10).await.unwrap();
        assert_eq!(stripe_runs.len(), 2);
        assert_eq!(stripe_runs[0].id, b, "newest first");

        let all_runs = recent(&db, None, 2).await.unwrap();
        assert_eq!(all_runs.len(), 2, "limit applies");

        db.close().await.unwrap();
    }
}
