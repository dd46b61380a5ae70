// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator notification channel for degraded run outcomes.

use givesync_core::SyncKind;
use givesync_engine::RunReport;
use serde::Serialize;
use tracing::{debug, warn};

/// Fire-and-forget notifier that POSTs run summaries to a configured URL.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    url: Option<String>,
}

#[derive(Serialize)]
struct Notification<'a> {
    sync_kind: String,
    #[serde(flatten)]
    report: &'a RunReport,
}

impl Notifier {
    pub fn new(url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Send the run summary. Best effort: failures are logged, never
    /// propagated.
    pub async fn notify(&self, kind: SyncKind, report: &RunReport) {
        let Some(url) = &self.url else {
            debug!(%kind, "no notify_url configured; skipping notification");
            return;
        };

        let body = Notification {
            sync_kind: kind.to_string(),
            report,
        };
        match self.client.post(url).json(&body).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(%kind, "notification delivered");
            }
            Ok(response) => {
                warn!(%kind, status = %response.status(), "notification rejected");
            }
            Err(e) => {
                warn!(%kind, error = %e, "notification failed");
            }
        }
    }
}
