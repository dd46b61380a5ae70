// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync engine for Givesync.
//!
//! Turns raw Source records into ledger-ready transaction groups (aggregation
//! with proportional fee allocation), guards commits with the idempotency
//! ledger, and drives the three orchestrator variants behind the run lock:
//! lock → window → fetch → aggregate → build → commit → watermark → run log.

pub mod aggregate;
mod batch;
pub mod builder;
pub mod commit;
pub mod context;
pub mod fingerprint;
pub mod report;
mod registrations;
pub mod runner;
pub mod stores;
mod stripe;
pub mod window;

pub use context::RunContext;
pub use report::{RunReport, SyncOptions};
pub use runner::run_sync;
pub use stores::{SqliteRetryAudit, SqliteTokenStore};
