// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication for the trigger endpoints.
//!
//! Two methods, checked in order:
//! 1. Operator bearer token (`Authorization: Bearer <token>`)
//! 2. Pre-shared secret (`webhook_secret` query parameter) matching one of
//!    the configured trigger secrets
//!
//! All comparisons are constant-time. When neither method is configured,
//! every request is rejected (fail-closed).

use axum::http::HeaderMap;

/// Authentication configuration for the trigger endpoints.
#[derive(Clone)]
pub struct TriggerAuth {
    /// Operator bearer token. If `Some`, bearer auth is enabled.
    pub operator_token: Option<String>,
    /// Pre-shared secrets accepted via `webhook_secret`.
    pub trigger_secrets: Vec<String>,
}

impl std::fmt::Debug for TriggerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerAuth")
            .field(
                "operator_token",
                &self.operator_token.as_ref().map(|_| "[redacted]"),
            )
            .field("trigger_secrets", &self.trigger_secrets.len())
            .finish()
    }
}

impl TriggerAuth {
    /// Returns true when the request presents a valid bearer token or
    /// pre-shared secret.
    pub fn authorize(&self, headers: &HeaderMap, webhook_secret: Option<&str>) -> bool {
        // Fail closed when nothing is configured.
        if self.operator_token.is_none() && self.trigger_secrets.is_empty() {
            tracing::error!("trigger endpoints have no auth configured -- rejecting request");
            return false;
        }

        if let Some(expected) = &self.operator_token {
            let bearer = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "));
            if let Some(token) = bearer {
                if constant_time_eq(token, expected) {
                    return true;
                }
            }
        }

        if let Some(presented) = webhook_secret {
            // Check every configured secret; matching is constant-time per
            // candidate.
            let mut matched = false;
            for secret in &self.trigger_secrets {
                if constant_time_eq(presented, secret) {
                    matched = true;
                }
            }
            if matched {
                return true;
            }
        }

        false
    }
}

/// Constant-time string equality.
fn constant_time_eq(a: &str, b: &str) -> bool {
    ring::constant_time::verify_slices_are_equal(a.as_bytes(), b.as_bytes()).is_ok()
}
