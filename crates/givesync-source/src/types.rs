// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Source donor-platform API.

use chrono::{DateTime, Utc};
use givesync_core::PaymentInstrument;
use serde::{Deserialize, Serialize};

/// One page of a paginated Source response.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcePage<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_page: Option<String>,
}

/// A donation record (online or batch-entered).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDonation {
    pub id: String,
    pub received_at: DateTime<Utc>,
    pub amount_minor: i64,
    #[serde(default)]
    pub fee_minor: i64,
    pub payment_method: PaymentInstrument,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub refunded: bool,
    pub designations: Vec<SourceDesignation>,
}

/// A portion of a donation directed at one fund.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDesignation {
    pub fund_id: String,
    pub amount_minor: i64,
}

/// A committed batch of manually entered donations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceBatch {
    pub id: String,
    pub committed_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

/// An event registration with payment and cumulative refund totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRegistration {
    pub id: String,
    pub paid_at: DateTime<Utc>,
    pub total_paid_minor: i64,
    #[serde(default)]
    pub fee_minor: i64,
    /// Cumulative refunded total over the registration's lifetime.
    #[serde(default)]
    pub total_refunded_minor: i64,
    pub payment_method: PaymentInstrument,
    pub event_name: String,
    /// Fund the registration income is designated to.
    pub fund_id: String,
}
