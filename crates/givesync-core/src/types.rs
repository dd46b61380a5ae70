// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Givesync workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The three sync pipelines, each with its own watermark, lock, and run log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SyncKind {
    /// Online card/ACH donations, aggregated into daily deposits.
    Stripe,
    /// Committed batches of manually entered donations.
    Batch,
    /// Event registration payments and their refunds.
    Registrations,
}

impl SyncKind {
    /// Name of the run-lock lease row for this sync kind.
    pub fn lock_name(&self) -> String {
        format!("sync.{self}")
    }

    /// Settings key holding this sync kind's watermark.
    pub fn watermark_key(&self) -> String {
        format!("watermark.{self}")
    }
}

/// Terminal outcome of one orchestrator run.
///
/// `Busy` is not an error: it means another live owner held the run lock and
/// this invocation was a no-op.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every group committed (or there was nothing to do).
    Success,
    /// At least one group committed and at least one error occurred.
    Partial,
    /// At least one error occurred and no group committed.
    Error,
    /// The run lock was held; nothing was attempted.
    Busy,
}

impl RunStatus {
    /// Derives the terminal status from commit/error counts.
    pub fn from_counts(committed: u32, errors: usize) -> Self {
        match (committed, errors) {
            (_, 0) => RunStatus::Success,
            (0, _) => RunStatus::Error,
            _ => RunStatus::Partial,
        }
    }
}

/// Payment instrument of an upstream record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentInstrument {
    Card,
    Ach,
    Cash,
    Check,
    Other,
}

/// A portion of a record's gross amount directed at one upstream category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Upstream category ("fund") identifier.
    pub category_id: String,
    /// Allocated amount in minor units.
    pub amount_minor: i64,
}

/// An immutable record fetched from the Source platform.
///
/// Raw records are re-fetched each run and never persisted by the engine;
/// idempotency is tracked by fingerprint, not by storing the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Globally unique id within the record's type.
    pub id: String,
    /// When the payment occurred (UTC).
    pub occurred_at: DateTime<Utc>,
    /// Gross amount in minor units.
    pub gross_minor: i64,
    /// Processing fee in minor units; signed, may be zero.
    pub fee_minor: i64,
    /// Payment instrument.
    pub instrument: PaymentInstrument,
    /// Split of the gross amount across upstream categories.
    pub allocations: Vec<Allocation>,
    /// Owning batch id, for batch-committed donations.
    pub batch_id: Option<String>,
}

/// User-maintained association from an upstream category to ledger dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    /// Upstream category ("fund") id; unique.
    pub category_id: String,
    /// Human-readable name, used in memos and line descriptions.
    pub display_name: String,
    /// Target ledger class name.
    pub class_name: String,
    /// Target ledger location (department) name.
    pub location_name: String,
}

/// Formats a minor-unit amount as a decimal string with two places,
/// e.g. `10000` -> `"100.00"`, `-350` -> `"-3.50"`.
pub fn format_minor(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
