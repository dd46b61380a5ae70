// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted OAuth2 credential for the Ledger API.
//!
//! The token is refreshed in place by the ledger gateway; persisting
//! immediately after refresh matters because the provider invalidates the
//! old refresh token on rotation.

use givesync_core::SyncError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::LedgerTokenRow;

/// Load the cached token for a realm.
pub async fn load(db: &Database, realm_id: &str) -> Result<Option<LedgerTokenRow>, SyncError> {
    let realm_id = realm_id.to_string();
    db.connection()
        .call(move |conn| {
            let row = conn
                .query_row(
                    "SELECT realm_id, access_token, refresh_token, expires_at
                     FROM ledger_tokens WHERE realm_id = ?1",
                    params![realm_id],
                    |row| {
                        Ok(LedgerTokenRow {
                            realm_id: row.get(0)?,
                            access_token: row.get(1)?,
                            refresh_token: row.get(2)?,
                            expires_at: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
        .await
        .map_err(map_tr_err)
}

/// Upsert the token row for its realm.
pub async fn save(db: &Database, token: &LedgerTokenRow) -> Result<(), SyncError> {
    let token = token.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO ledger_tokens (realm_id, access_token, refresh_token, expires_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(realm_id) DO UPDATE
                 SET access_token = excluded.access_token,
                     refresh_token = excluded.refresh_token,
                     expires_at = excluded.expires_at",
                params![
                    token.realm_id,
                    token.access_token,
                    token.refresh_token,
                    token.expires_at,
                ],
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
    async fn save_and_load_round_trips() {
        let (db, _dir) = setup_db().await;
        let token = LedgerTokenRow {
            realm_id: "realm-1".to_string(),
            access_token: "at-1".to_string(),
            refresh_token: "rt-1".to_string(),
            expires_at: "2026-08-07T12:00:00Z".to_string(),
        };
        save(&db, &token).await.unwrap();

        let loaded = load(&db, "realm-1").await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "at-1");
        assert_eq!(loaded.refresh_token, "rt-1");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn save_rotates_token_in_place() {
        let (db, _dir) = setup_db().await;
        let mut token = LedgerTokenRow {
            realm_id: "realm-1".to_string(),
            access_token: "at-1".to_string(),
            refresh_token: "rt-1".to_string(),
            expires_at: "2026-08-07T12:00:00Z".to_string(),
        };
        save(&db, &token).await.unwrap();

        token.access_token = "at-2".to_string();
        token.refresh_token = "rt-2".to_string();
        save(&db, &token).await.unwrap();

        let loaded = load(&db, "realm-1").await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "at-2");
        assert_eq!(loaded.refresh_token, "rt-2");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn load_unknown_realm_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(load(&db, "realm-x").await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
