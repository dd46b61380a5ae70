// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for persisted storage entities.
//!
//! Domain types shared across crate boundaries (mappings, sync kinds) live in
//! `givesync-core::types`; the types here mirror storage rows one-to-one.

use serde::Serialize;

/// One orchestrator execution, created at run start and finalized at run end.
#[derive(Debug, Clone, Serialize)]
pub struct RunLogEntry {
    pub id: i64,
    pub sync_kind: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub window_start: String,
    pub window_end: String,
    pub committed: i64,
    pub skipped: i64,
    pub status: String,
    pub message: String,
}

/// Cached OAuth2 credential for the Ledger API, scoped to one realm.
#[derive(Debug, Clone)]
pub struct LedgerTokenRow {
    pub realm_id: String,
    pub access_token: String,
    pub refresh_token: String,
    /// ISO-8601 UTC expiry of the access token.
    pub expires_at: String,
}

/// One Source API retry attempt, recorded for operational diagnosis.
#[derive(Debug, Clone)]
pub struct RetryAuditEntry {
    pub id: i64,
    pub occurred_at: String,
    pub target: String,
    pub status: String,
    pub attempt: i64,
}
