// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Givesync reconciliation engine.
//!
//! Errors carry an explicit kind so callers branch on [`SyncError::kind`]
//! instead of matching broad variants: transient errors are retried with
//! backoff, configuration errors abort the unit of work that discovered
//! them, authentication errors are recovered once via token refresh, and a
//! busy lock is a distinct no-op outcome rather than a failure.

use thiserror::Error;

/// Coarse classification of a [`SyncError`], used for branching at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid configuration (mapping rows, ledger names, credentials).
    Config,
    /// Transient upstream failure (429/5xx/transport); retryable.
    Transient,
    /// Authentication failure against the ledger (expired/invalid token).
    Auth,
    /// Storage backend failure (connection, query, migration).
    Storage,
    /// Non-retryable upstream rejection (4xx other than 429).
    Upstream,
    /// The run lock is held by another live owner.
    Busy,
    /// Internal or unexpected errors.
    Internal,
}

/// The primary error type used across all Givesync crates.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration errors (missing mapping, unknown ledger account, bad credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transient upstream errors; safe to retry with backoff.
    #[error("transient error: {message}")]
    Transient {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Ledger authentication errors (expired token, failed refresh).
    #[error("authentication error: {0}")]
    Auth(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Non-retryable upstream API rejection, with the raw status and body.
    #[error("upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// The named run lock is held by another live owner.
    #[error("sync already running: {0}")]
    Busy(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Returns the coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Config(_) => ErrorKind::Config,
            SyncError::Transient { .. } => ErrorKind::Transient,
            SyncError::Auth(_) => ErrorKind::Auth,
            SyncError::Storage { .. } => ErrorKind::Storage,
            SyncError::Upstream { .. } => ErrorKind::Upstream,
            SyncError::Busy(_) => ErrorKind::Busy,
            SyncError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns true when retrying the same operation may succeed.
    ///
    /// Only transient errors qualify. A failed token refresh in particular is
    /// not retryable: a bad refresh token does not become valid by waiting.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Transient { .. })
    }
}
