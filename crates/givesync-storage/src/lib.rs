// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Givesync reconciliation engine.
//!
//! Owns the shared-state surface visible to concurrent sync invocations:
//! category mappings, watermarks, refund watermarks, run locks, the
//! idempotency ledger, the run log, the cached ledger token, and the
//! advisory retry-audit log. All writes are serialized through
//! tokio-rusqlite's single background thread.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::{LedgerTokenRow, RetryAuditEntry, RunLogEntry};
