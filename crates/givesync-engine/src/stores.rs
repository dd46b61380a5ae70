// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-backed implementations of the gateway persistence seams.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use givesync_core::SyncError;
use givesync_ledger::{LedgerToken, TokenStore};
use givesync_source::RetryAudit;
use givesync_storage::{Database, LedgerTokenRow, queries};
use tracing::warn;

/// [`TokenStore`] backed by the `ledger_tokens` table.
pub struct SqliteTokenStore {
    db: Database,
}

impl SqliteTokenStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn load(&self, realm_id: &str) -> Result<Option<LedgerToken>, SyncError> {
        let Some(row) = queries::tokens::load(&self.db, realm_id).await? else {
            return Ok(None);
        };
        let expires_at = DateTime::parse_from_rfc3339(&row.expires_at)
            .map_err(|e| {
                SyncError::Internal(format!(
                    "stored ledger token has invalid expiry '{}': {e}",
                    row.expires_at
                ))
            })?
            .with_timezone(&Utc);
        Ok(Some(LedgerToken {
            realm_id: row.realm_id,
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expires_at,
        }))
    }

    async fn save(&self, token: &LedgerToken) -> Result<(), SyncError> {
        let row = LedgerTokenRow {
            realm_id: token.realm_id.clone(),
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_at: token.expires_at.to_rfc3339(),
        };
        queries::tokens::save(&self.db, &row).await
    }
}

/// [`RetryAudit`] backed by the `retry_audit` table.
///
/// The audit trail is advisory: write failures are logged and swallowed so
/// they never fail the fetch they describe.
pub struct SqliteRetryAudit {
    db: Database,
}

impl SqliteRetryAudit {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RetryAudit for SqliteRetryAudit {
    async fn record(&self, target: &str, status: &str, attempt: u32) {
        if let Err(e) = queries::retry_audit::record(&self.db, target, status, attempt).await {
            warn!(target, status, attempt, error = %e, "failed to record retry audit entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[tokio::test]
    async fn token_store_round_trips_through_sqlite() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        let store = SqliteTokenStore::new(db.clone());

        assert!(store.load("realm-1").await.unwrap().is_none());

        let token = LedgerToken {
            realm_id: "realm-1".into(),
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        };
        store.save(&token).await.unwrap();

        let loaded = store.load("realm-1").await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "at");
        // RFC 3339 expiry survives the round trip to within a second.
        assert!((loaded.expires_at - token.expires_at).num_seconds().abs() <= 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn retry_audit_persists_entries() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("a.db").to_str().unwrap())
            .await
            .unwrap();
        let audit = SqliteRetryAudit::new(db.clone());

        audit.record("donations", "503", 1).await;
        audit.record("donations", "503", 2).await;

        let entries = queries::retry_audit::recent(&db, 10).await.unwrap();
        assert_eq!(entries.len(), 2);

        db.close().await.unwrap();
    }
}
