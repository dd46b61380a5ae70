// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ledger OAuth2 credential and its persistence seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use givesync_core::SyncError;

/// Cached OAuth2 bearer credential for the Ledger API, scoped to one realm.
#[derive(Clone)]
pub struct LedgerToken {
    pub realm_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for LedgerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerToken")
            .field("realm_id", &self.realm_id)
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Persistence seam for the ledger token.
///
/// Saving must happen immediately after every refresh: the identity provider
/// invalidates the previous refresh token on rotation, so losing the new one
/// strands the integration until an operator re-authorizes.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the stored token for a realm, if any.
    async fn load(&self, realm_id: &str) -> Result<Option<LedgerToken>, SyncError>;

    /// Persist the token for its realm.
    async fn save(&self, token: &LedgerToken) -> Result<(), SyncError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token_material() {
        let token = LedgerToken {
            realm_id: "realm-1".into(),
            access_token: "super-secret-access".into(),
            refresh_token: "super-secret-refresh".into(),
            expires_at: Utc::now(),
        };
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[redacted]"));
        assert!(debug.contains("realm-1"));
    }
}
