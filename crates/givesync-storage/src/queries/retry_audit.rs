// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Advisory retry-audit log for Source API calls.

use givesync_core::SyncError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::RetryAuditEntry;

/// Append one failed-attempt entry.
pub async fn record(
    db: &Database,
    target: &str,
    status: &str,
    attempt: u32,
) -> Result<(), SyncError> {
    let target = target.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO retry_audit (target, status, attempt) VALUES (?1, ?2, ?3)",
                params![target, status, attempt],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// List the most recent entries, newest first.
pub async fn recent(db: &Database, limit: i64) -> Result<Vec<RetryAuditEntry>, SyncError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, occurred_at, target, status, attempt
                 FROM retry_audit ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                Ok(RetryAuditEntry {
                    id: row.get(0)?,
                    occurred_at: row.get(1)?,
                    target: row.get(2)?,
                    status: row.get(3)?,
                    attempt: row.get(4)?,
                })
            })?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
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

    #[tokio::test]
    async fn record_and_list_entries() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        record(&db, "donations", "503", 1).await.unwrap();
        record(&db, "donations", "503", 2).await.unwrap();

        let entries = recent(&db, 10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].attempt, 2, "newest first");
        assert_eq!(entries[1].status, "503");

        db.close().await.unwrap();
    }
}
