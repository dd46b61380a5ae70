// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ledger accounting API.
//!
//! Name lookups go through the ledger's SQL-like read-query sublanguage and
//! are cached for the lifetime of one client instance (orchestrators build a
//! fresh client per run). Transaction creation is a JSON POST. Token refresh
//! happens proactively with a 60-second expiry margin, plus exactly one
//! reactive refresh-and-retry when a call comes back 401.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use givesync_core::SyncError;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::token::{LedgerToken, TokenStore};
use crate::types::{
    CommittedTransaction, LedgerResource, MatchMode, QueryResponse, TransactionPayload,
};

/// Refresh the access token when it expires within this margin.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// HTTP client for Ledger API communication.
pub struct LedgerClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    realm_id: String,
    store: Arc<dyn TokenStore>,
    token: Mutex<Option<LedgerToken>>,
    cache: Mutex<HashMap<(String, MatchMode, String), Option<LedgerResource>>>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

impl LedgerClient {
    /// Creates a new Ledger API client with an empty lookup cache.
    pub fn new(
        base_url: String,
        token_url: String,
        client_id: String,
        client_secret: String,
        realm_id: String,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SyncError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token_url,
            client_id,
            client_secret,
            realm_id,
            store,
            token: Mutex::new(None),
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Look up a ledger resource by name. Results (including misses) are
    /// cached per (resource type, match mode, name).
    pub async fn query_by_name(
        &self,
        resource_type: &str,
        name: &str,
        match_mode: MatchMode,
    ) -> Result<Option<LedgerResource>, SyncError> {
        let cache_key = (
            resource_type.to_string(),
            match_mode,
            name.to_string(),
        );
        if let Some(cached) = self.cache.lock().await.get(&cache_key) {
            return Ok(cached.clone());
        }

        let escaped = name.replace('\'', "''");
        let sql = match match_mode {
            MatchMode::Exact => {
                format!("SELECT * FROM {resource_type} WHERE name = '{escaped}'")
            }
            MatchMode::Prefix => {
                format!("SELECT * FROM {resource_type} WHERE name LIKE '{escaped}%'")
            }
        };
        let url = format!("{}/query", self.base_url);

        let response = self
            .send_authed(|token| {
                self.http
                    .get(&url)
                    .bearer_auth(token)
                    .query(&[("q", sql.clone())])
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: QueryResponse = response.json().await.map_err(|e| SyncError::Transient {
            message: format!("unparsable ledger query response: {e}"),
            source: Some(Box::new(e)),
        })?;
        let resource = parsed.rows.into_iter().next();
        debug!(resource_type, name, found = resource.is_some(), "ledger lookup");

        self.cache.lock().await.insert(cache_key, resource.clone());
        Ok(resource)
    }

    /// Create a deposit or expense transaction.
    pub async fn create_transaction(
        &self,
        payload: &TransactionPayload,
    ) -> Result<CommittedTransaction, SyncError> {
        let url = format!("{}/transactions", self.base_url);
        let response = self
            .send_authed(|token| self.http.post(&url).bearer_auth(token).json(payload))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(|e| SyncError::Transient {
            message: format!("unparsable ledger create response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Send a request with a valid bearer token, refreshing exactly once if
    /// the ledger answers 401.
    async fn send_authed<F>(&self, build: F) -> Result<reqwest::Response, SyncError>
    where
        F: Fn(String) -> reqwest::RequestBuilder,
    {
        let token = self.ensure_access_token().await?;
        let response = build(token).send().await.map_err(|e| SyncError::Transient {
            message: format!("ledger request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        if response.status() != reqwest::StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!("ledger returned 401; refreshing token and retrying once");
        let token = self.refresh_current().await?;
        let response = build(token).send().await.map_err(|e| SyncError::Transient {
            message: format!("ledger request failed after refresh: {e}"),
            source: Some(Box::new(e)),
        })?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SyncError::Auth(
                "ledger rejected a freshly refreshed token".to_string(),
            ));
        }
        Ok(response)
    }

    /// Return a currently valid access token, refreshing proactively when the
    /// stored one expires within the safety margin.
    async fn ensure_access_token(&self) -> Result<String, SyncError> {
        let mut slot = self.token.lock().await;
        if slot.is_none() {
            *slot = self.store.load(&self.realm_id).await?;
        }
        let Some(current) = slot.as_ref() else {
            return Err(SyncError::Auth(format!(
                "no ledger token stored for realm {}; authorize the integration first",
                self.realm_id
            )));
        };

        let remaining = current.expires_at - Utc::now();
        if remaining.num_seconds() > EXPIRY_MARGIN_SECS {
            return Ok(current.access_token.clone());
        }

        debug!(
            remaining_secs = remaining.num_seconds(),
            "ledger token at or past expiry margin; refreshing"
        );
        let refreshed = self.exchange_refresh_token(&current.refresh_token).await?;
        self.store.save(&refreshed).await?;
        let access = refreshed.access_token.clone();
        *slot = Some(refreshed);
        Ok(access)
    }

    /// Refresh the current token after an observed 401.
    async fn refresh_current(&self) -> Result<String, SyncError> {
        let mut slot = self.token.lock().await;
        let Some(current) = slot.as_ref() else {
            return Err(SyncError::Auth("no ledger token to refresh".to_string()));
        };
        let refreshed = self.exchange_refresh_token(&current.refresh_token).await?;
        self.store.save(&refreshed).await?;
        let access = refreshed.access_token.clone();
        *slot = Some(refreshed);
        Ok(access)
    }

    /// Exchange the refresh token for a new access/refresh pair.
    ///
    /// Failures are fatal (`Auth`), not retried with backoff: a bad refresh
    /// token will not become valid by waiting.
    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<LedgerToken, SyncError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| SyncError::Auth(format!("token refresh request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Auth(format!(
                "token refresh rejected ({status}): {body}"
            )));
        }

        let parsed: RefreshResponse = response.json().await.map_err(|e| {
            SyncError::Auth(format!("unparsable token refresh response: {e}"))
        })?;

        Ok(LedgerToken {
            realm_id: self.realm_id.clone(),
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token,
            expires_at: Utc::now() + chrono::Duration::seconds(parsed.expires_in),
        })
    }
}
