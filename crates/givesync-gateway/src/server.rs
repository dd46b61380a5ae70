// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes and shared state. Trigger endpoints authenticate inside
//! their handlers (they accept either bearer or pre-shared-secret auth);
//! the webhook endpoint authenticates via HMAC; health is public.

use axum::{
    Router,
    routing::{get, post},
};
use givesync_config::GivesyncConfig;
use givesync_core::SyncError;
use givesync_storage::Database;
use tower_http::trace::TraceLayer;

use crate::auth::TriggerAuth;
use crate::notify::Notifier;
use crate::{handlers, webhook};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: GivesyncConfig,
    pub auth: TriggerAuth,
    pub notifier: Notifier,
}

impl AppState {
    /// Assemble state from loaded configuration and an open database.
    pub fn new(config: GivesyncConfig, db: Database) -> Self {
        let auth = TriggerAuth {
            operator_token: config.sync.operator_token.clone(),
            trigger_secrets: config.sync.trigger_secrets.clone(),
        };
        let notifier = Notifier::new(config.sync.notify_url.clone());
        Self {
            db,
            config,
            auth,
            notifier,
        }
    }
}

/// Build the full route tree.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/runs", get(handlers::get_runs))
        .route("/sync/{kind}", post(handlers::post_sync))
        .route("/webhook/{event}", post(webhook::post_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server and serve until the process exits.
pub async fn start_server(state: AppState) -> Result<(), SyncError> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SyncError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| SyncError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
