// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the trigger and inspection endpoints.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use givesync_core::{RunStatus, SyncError, SyncKind};
use givesync_engine::{
    RunContext, RunReport, SqliteRetryAudit, SqliteTokenStore, SyncOptions, run_sync,
};
use givesync_ledger::LedgerClient;
use givesync_source::SourceClient;
use givesync_storage::RunLogEntry;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::server::AppState;

/// Query parameters accepted by the trigger endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct TriggerParams {
    /// Backfill window in days; alias for `backfill_days`.
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub backfill_days: Option<u32>,
    /// `1` forces the watermark override.
    #[serde(default)]
    pub reset_window: Option<String>,
    /// Registrations only: `1` treats all prior refund totals as zero.
    #[serde(default)]
    pub force_refunds: Option<String>,
    /// Pre-shared secret, an alternative to operator bearer auth.
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn flag(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("1") | Some("true"))
}

/// POST /sync/{kind}
///
/// Runs one sync variant to completion and returns the run report. A held
/// run lock comes back as 429 with a `busy` status body.
pub async fn post_sync(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<TriggerParams>,
    headers: HeaderMap,
) -> Response {
    let Ok(kind) = SyncKind::from_str(&kind) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("unknown sync kind '{kind}'"),
            }),
        )
            .into_response();
    };

    if !state.auth.authorize(&headers, params.webhook_secret.as_deref()) {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "invalid or missing credentials".to_string(),
            }),
        )
            .into_response();
    }

    let ctx = match build_run_context(&state) {
        Ok(ctx) => ctx,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let opts = SyncOptions {
        backfill_days: params.days.or(params.backfill_days),
        reset_window: flag(&params.reset_window),
        force_refunds: flag(&params.force_refunds),
    };
    info!(%kind, reset_window = opts.reset_window, "trigger received");

    let report = run_sync(&ctx, kind, &opts).await;

    if matches!(report.status, RunStatus::Partial | RunStatus::Error) {
        let notifier = state.notifier.clone();
        let notify_report = report.clone();
        tokio::spawn(async move {
            notifier.notify(kind, &notify_report).await;
        });
    }

    let status = match report.status {
        RunStatus::Busy => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::OK,
    };
    (status, Json(report)).into_response()
}

/// Build the per-run context: fresh gateway clients over the shared
/// database, so the ledger lookup cache lives for exactly one run.
fn build_run_context(state: &AppState) -> Result<RunContext, SyncError> {
    let config = state.config.clone();
    let app_id = config
        .source
        .app_id
        .clone()
        .ok_or_else(|| SyncError::Config("source.app_id is not configured".into()))?;
    let secret = config
        .source
        .secret
        .clone()
        .ok_or_else(|| SyncError::Config("source.secret is not configured".into()))?;
    let client_id = config
        .ledger
        .client_id
        .clone()
        .ok_or_else(|| SyncError::Config("ledger.client_id is not configured".into()))?;
    let client_secret = config
        .ledger
        .client_secret
        .clone()
        .ok_or_else(|| SyncError::Config("ledger.client_secret is not configured".into()))?;

    let source = SourceClient::new(
        config.source.base_url.clone(),
        app_id,
        secret,
        Arc::new(SqliteRetryAudit::new(state.db.clone())),
    )?;
    let ledger = LedgerClient::new(
        config.ledger.base_url.clone(),
        config.ledger.token_url.clone(),
        client_id,
        client_secret,
        config.ledger.realm_id.clone(),
        Arc::new(SqliteTokenStore::new(state.db.clone())),
    )?;

    Ok(RunContext {
        db: state.db.clone(),
        source,
        ledger: Arc::new(ledger),
        config,
    })
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health (unauthenticated).
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Query parameters for GET /runs.
#[derive(Debug, Default, Deserialize)]
pub struct RunsParams {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

/// Response body for GET /runs.
#[derive(Debug, Serialize)]
pub struct RunsResponse {
    pub runs: Vec<RunLogEntry>,
}

/// GET /runs
///
/// Most-recent-first run log, optionally filtered by sync kind.
pub async fn get_runs(
    State(state): State<AppState>,
    Query(params): Query<RunsParams>,
    headers: HeaderMap,
) -> Response {
    if !state.auth.authorize(&headers, params.webhook_secret.as_deref()) {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "invalid or missing credentials".to_string(),
            }),
        )
            .into_response();
    }

    let limit = params.limit.unwrap_or(20).clamp(1, 200);
    match givesync_storage::queries::run_log::recent(&state.db, params.kind.as_deref(), limit)
        .await
    {
        Ok(runs) => (StatusCode::OK, Json(RunsResponse { runs })).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_params_deserialize_from_query_shapes() {
        let params: TriggerParams =
            serde_json::from_str(r#"{"days": 14, "reset_window": "1"}"#).unwrap();
        assert_eq!(params.days, Some(14));
        assert!(flag(&params.reset_window));
        assert!(!flag(&params.force_refunds));
    }

    #[test]
    fn days_takes_precedence_over_backfill_days() {
        let params = TriggerParams {
            days: Some(3),
            backfill_days: Some(9),
            ..TriggerParams::default()
        };
        assert_eq!(params.days.or(params.backfill_days), Some(3));
    }

    #[test]
    fn flag_accepts_one_and_true_only() {
        assert!(flag(&Some("1".into())));
        assert!(flag(&Some("true".into())));
        assert!(!flag(&Some("0".into())));
        assert!(!flag(&Some("yes".into())));
        assert!(!flag(&None));
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".into(),
            version: "0.1.0".into(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
    }
}
