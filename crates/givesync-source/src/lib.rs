// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Source donor-platform API.
//!
//! Provides [`SourceClient`] which handles Basic authentication, pagination,
//! and transient error retry with bounded exponential backoff. Every failed
//! attempt is reported to a [`RetryAudit`] sink for operational diagnosis.

pub mod audit;
pub mod client;
pub mod types;

pub use audit::{NoopAudit, RetryAudit};
pub use client::SourceClient;
pub use types::{SourceBatch, SourceDonation, SourceDesignation, SourceRegistration};
