// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server for Givesync.
//!
//! Exposes one trigger endpoint per sync variant (operator token or
//! pre-shared secret auth, both compared constant-time), an inbound webhook
//! with per-event HMAC-SHA256 verification, and a run-log listing. On
//! `partial`/`error` outcomes the configured notification URL is invoked
//! with the run summary.

pub mod auth;
pub mod handlers;
pub mod notify;
pub mod server;
pub mod webhook;

pub use auth::TriggerAuth;
pub use notify::Notifier;
pub use server::{AppState, build_router, start_server};
