// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Source donor-platform API.
//!
//! Every call is retried up to 3 attempts on 429/5xx/transport failure with
//! exponential backoff (1 s base, doubling, plus up to 300 ms jitter).
//! Non-retryable 4xx responses fail immediately with the raw status and body.
//! A 2xx response that fails to parse as JSON is treated as transient.

use std::sync::Arc;
use std::time::Duration;

use givesync_core::SyncError;
use rand::Rng;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::audit::RetryAudit;
use crate::types::SourcePage;

/// Maximum attempts per HTTP call, including the first.
const MAX_ATTEMPTS: u32 = 3;

/// Base backoff delay before the second attempt.
const BACKOFF_BASE_MS: u64 = 1_000;

/// Upper bound of the random jitter added to each backoff sleep.
const JITTER_MS: u64 = 300;

/// HTTP client for Source API communication.
///
/// Manages Basic authentication, pagination, and retry with backoff.
#[derive(Clone)]
pub struct SourceClient {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
    secret: String,
    backoff_base_ms: u64,
    audit: Arc<dyn RetryAudit>,
}

impl SourceClient {
    /// Creates a new Source API client.
    pub fn new(
        base_url: String,
        app_id: String,
        secret: String,
        audit: Arc<dyn RetryAudit>,
    ) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SyncError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id,
            secret,
            backoff_base_ms: BACKOFF_BASE_MS,
            audit,
        })
    }

    /// Overrides the backoff base (for fast tests).
    #[cfg(test)]
    pub fn with_backoff_base_ms(mut self, ms: u64) -> Self {
        self.backoff_base_ms = ms;
        self
    }

    /// Fetch one page of records. Returns the records and the next-page token,
    /// if any.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(Vec<T>, Option<String>), SyncError> {
        let page: SourcePage<T> = self.get_json(path, query).await?;
        Ok((page.data, page.next_page))
    }

    /// Fetch all records for `path`, draining pagination.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, SyncError> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut page_query: Vec<(&str, String)> = query.to_vec();
            if let Some(token) = &page_token {
                page_query.push(("page", token.clone()));
            }
            let (mut data, next) = self.fetch_page(path, &page_query).await?;
            records.append(&mut data);
            match next {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(path, count = records.len(), "source fetch complete");
        Ok(records)
    }

    /// Perform one GET with the retry/backoff policy and parse the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SyncError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut last_error: Option<SyncError> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                let backoff = self.backoff_base_ms * (1u64 << (attempt - 2));
                let jitter = rand::thread_rng().gen_range(0..=JITTER_MS);
                tokio::time::sleep(Duration::from_millis(backoff + jitter)).await;
            }

            let response = self
                .client
                .get(&url)
                .basic_auth(&self.app_id, Some(&self.secret))
                .query(query)
                .send()
                .await;

            let response = match response {
                Ok(response) => response,
                Err(e) => {
                    warn!(path, attempt, error = %e, "source request failed in transport");
                    self.audit.record(path, "transport", attempt).await;
                    last_error = Some(SyncError::Transient {
                        message: format!("HTTP request to {path} failed: {e}"),
                        source: Some(Box::new(e)),
                    });
                    continue;
                }
            };

            let status = response.status();
            debug!(path, status = %status, attempt, "source response received");

            if status.is_success() {
                let body = response.text().await.unwrap_or_default();
                match serde_json::from_str::<T>(&body) {
                    Ok(parsed) => return Ok(parsed),
                    Err(e) => {
                        // A 2xx that is not valid JSON is unexpected; treat as
                        // transient and retry.
                        warn!(path, attempt, error = %e, "unparsable 2xx body from source");
                        self.audit.record(path, "parse", attempt).await;
                        last_error = Some(SyncError::Transient {
                            message: format!("unparsable response from {path}: {e}"),
                            source: Some(Box::new(e)),
                        });
                        continue;
                    }
                }
            }

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!(path, status = %status, attempt, "transient source error");
                self.audit
                    .record(path, &status.as_u16().to_string(), attempt)
                    .await;
                last_error = Some(SyncError::Transient {
                    message: format!("source API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-retryable 4xx: surface the raw status and body immediately.
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Err(last_error.unwrap_or_else(|| SyncError::Transient {
            message: format!("source request to {path} failed after retries"),
            source: None,
        }))
    }
}
