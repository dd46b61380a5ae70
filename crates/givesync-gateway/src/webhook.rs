// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook endpoint.
//!
//! Authenticity is proven by HMAC-SHA256 over the raw request body with a
//! per-event-type shared secret, compared constant-time against the
//! `X-Webhook-Signature` header (hex). A verified event triggers the
//! corresponding sync endpoint fire-and-forget; recognized-but-ignored
//! events still get a 202 so the upstream does not retry them.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use givesync_core::SyncKind;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use tracing::{debug, info, warn};

use crate::server::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Response body for webhook acknowledgements.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub accepted: bool,
    pub detail: String,
}

/// Maps a Source event type to the sync variant it should trigger.
fn sync_kind_for_event(event: &str) -> Option<SyncKind> {
    match event {
        "donation.created" | "payout.paid" => Some(SyncKind::Stripe),
        "batch.committed" => Some(SyncKind::Batch),
        "registration.paid" | "registration.refunded" => Some(SyncKind::Registrations),
        _ => None,
    }
}

/// POST /webhook/{event}
pub async fn post_webhook(
    State(state): State<AppState>,
    Path(event): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(secret) = state.config.webhook.secrets.get(&event) else {
        warn!(event, "webhook received with no secret configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(WebhookResponse {
                accepted: false,
                detail: format!("no webhook secret configured for '{event}'"),
            }),
        )
            .into_response();
    };

    let signature = headers
        .get("x-webhook-signature")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| hex::decode(v).ok());
    let Some(signature) = signature else {
        return (
            StatusCode::FORBIDDEN,
            Json(WebhookResponse {
                accepted: false,
                detail: "missing or malformed signature".to_string(),
            }),
        )
            .into_response();
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            warn!(event, error = %e, "invalid webhook secret");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    mac.update(&body);
    // Mac::verify_slice is constant-time.
    if mac.verify_slice(&signature).is_err() {
        warn!(event, "webhook signature mismatch");
        return (
            StatusCode::FORBIDDEN,
            Json(WebhookResponse {
                accepted: false,
                detail: "signature mismatch".to_string(),
            }),
        )
            .into_response();
    }

    if serde_json::from_slice::<serde_json::Value>(&body).is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(WebhookResponse {
                accepted: false,
                detail: "request body is not valid JSON".to_string(),
            }),
        )
            .into_response();
    }

    let detail = match sync_kind_for_event(&event) {
        Some(kind) => {
            info!(event, %kind, "webhook verified; dispatching trigger");
            dispatch_trigger(&state, kind);
            format!("{kind} sync triggered")
        }
        None => {
            debug!(event, "webhook verified but event type is ignored");
            "event ignored".to_string()
        }
    };

    (
        StatusCode::ACCEPTED,
        Json(WebhookResponse {
            accepted: true,
            detail,
        }),
    )
        .into_response()
}

/// Fire-and-forget call to the local trigger endpoint. The handler does not
/// wait for or check the sync result; the run log captures it.
fn dispatch_trigger(state: &AppState, kind: SyncKind) {
    let Some(secret) = state.config.sync.trigger_secrets.first().cloned() else {
        warn!(%kind, "cannot dispatch trigger: no trigger secret configured");
        return;
    };
    let url = format!(
        "http://{}:{}/sync/{kind}",
        state.config.server.host, state.config.server.port
    );

    tokio::spawn(async move {
        let client = reqwest::Client::new();
        match client
            .post(&url)
            .query(&[("webhook_secret", secret)])
            .send()
            .await
        {
            Ok(response) => {
                debug!(%kind, status = %response.status(), "trigger dispatched");
            }
            Err(e) => {
                warn!(%kind, error = %e, "trigger dispatch failed");
            }
        }
    });
}
