// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry-audit sink for the Source gateway.
//!
//! The audit trail is advisory, not authoritative: recording failures must
//! never fail the fetch itself, so the trait is infallible and implementations
//! swallow their own errors.

use async_trait::async_trait;

/// Receives one entry per failed Source API attempt.
#[async_trait]
pub trait RetryAudit: Send + Sync {
    /// Record a failed attempt against `target` with the observed `status`
    /// (an HTTP status code, `transport`, or `parse`).
    async fn record(&self, target: &str, status: &str, attempt: u32);
}

/// Audit sink that discards all entries.
pub struct NoopAudit;

#[async_trait]
impl RetryAudit for NoopAudit {
    async fn record(&self, _target: &str, _status: &str, _attempt: u32) {}
}
