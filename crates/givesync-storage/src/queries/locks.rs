// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lease-based run locks.
//!
//! A lease row is free when `owner` is empty or `renewed_at` is older than
//! the TTL. Acquisition is one conditional UPDATE on the single writer
//! connection: exactly one row affected means the lease was taken. Timestamps
//! are ISO-8601 UTC strings, so lexicographic comparison is chronological.

use givesync_core::SyncError;
use rusqlite::params;
use uuid::Uuid;

use crate::database::{Database, map_tr_err};

/// Try to acquire the named lease for `ttl_secs`.
///
/// Returns the newly generated owner token on success, or `None` when another
/// live owner holds the lease. The conditional update also succeeds when the
/// row already carries the generated token (reentrant) or when the current
/// owner's lease has gone stale.
pub async fn acquire(
    db: &Database,
    name: &str,
    ttl_secs: u32,
) -> Result<Option<String>, SyncError> {
    let name = name.to_string();
    let token = Uuid::new_v4().to_string();
    let stale_modifier = format!("-{ttl_secs} seconds");

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT OR IGNORE INTO sync_locks (name) VALUES (?1)",
                params![name],
            )?;
            let affected = tx.execute(
                "UPDATE sync_locks
                    SET owner = ?2, renewed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                  WHERE name = ?1
                    AND (owner = ''
                         OR owner = ?2
                         OR renewed_at < strftime('%Y-%m-%dT%H:%M:%fZ', 'now', ?3))",
                params![name, token, stale_modifier],
            )?;
            tx.commit()?;
            Ok(if affected == 1 { Some(token) } else { None })
        })
        .await
        .map_err(map_tr_err)
}

/// Release the named lease, but only if `token` still owns it.
///
/// Releasing a lease that was taken over after going stale is a no-op.
pub async fn release(db: &Database, name: &str, token: &str) -> Result<(), SyncError> {
    let name = name.to_string();
    let token = token.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE sync_locks SET owner = '' WHERE name = ?1 AND owner = ?2",
                params![name, token],
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
    async fn acquire_then_release_then_reacquire() {
        let (db, _dir) = setup_db().await;

        let token = acquire(&db, "sync.stripe", 900).await.unwrap();
        assert!(token.is_some());

        // Held lease blocks a second caller.
        let second = acquire(&db, "sync.stripe", 900).await.unwrap();
        assert!(second.is_none());

        release(&db, "sync.stripe", &token.unwrap()).await.unwrap();

        let third = acquire(&db, "sync.stripe", 900).await.unwrap();
        assert!(third.is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_acquires_grant_exactly_one_lease() {
        let (db, _dir) = setup_db().await;

        let (a, b) = tokio::join!(
            acquire(&db, "sync.batch", 900),
            acquire(&db, "sync.batch", 900)
        );
        let granted = [a.unwrap(), b.unwrap()]
            .into_iter()
            .flatten()
            .count();
        assert_eq!(granted, 1, "exactly one concurrent acquire may win");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stale_lease_is_taken_over() {
        let (db, _dir) = setup_db().await;

        let first = acquire(&db, "sync.registrations", 900).await.unwrap();
        assert!(first.is_some());

        // With a zero-second TTL the freshly renewed lease is already stale.
        let takeover = acquire(&db, "sync.registrations", 0).await.unwrap();
        assert!(takeover.is_some(), "stale lease should be acquirable");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn release_with_wrong_token_is_a_noop() {
        let (db, _dir) = setup_db().await;

        let token = acquire(&db, "sync.stripe", 900).await.unwrap().unwrap();
        release(&db, "sync.stripe", "not-the-owner").await.unwrap();

        // Lease is still held.
        let second = acquire(&db, "sync.stripe", 900).await.unwrap();
        assert!(second.is_none());

        release(&db, "sync.stripe", &token).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn locks_for_different_names_are_independent() {
        let (db, _dir) = setup_db().await;

        let a = acquire(&db, "sync.stripe", 900).await.unwrap();
        let b = acquire(&db, "sync.batch", 900).await.unwrap();
        assert!(a.is_some());
        assert!(b.is_some());

        db.close().await.unwrap();
    }
}
