// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run options and the operator-facing run report.

use givesync_core::{RunStatus, SyncError};
use serde::Serialize;

use crate::aggregate::SkippedAllocation;

/// Operator-supplied options for one run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Backfill window in days, used with `reset_window`.
    pub backfill_days: Option<u32>,
    /// Force the window start back to `now - backfill_days`, ignoring the
    /// stored watermark.
    pub reset_window: bool,
    /// Registrations only: treat all prior refund totals as zero.
    pub force_refunds: bool,
}

/// Aggregate result of one orchestrator run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    /// Ledger transactions committed this run.
    pub committed: u32,
    /// Units of work skipped as already committed (idempotency hits).
    pub skipped: u32,
    pub window_start: Option<String>,
    pub window_end: Option<String>,
    /// Per-group/per-item errors; never abort sibling units of work.
    pub errors: Vec<String>,
    /// Allocations excluded because their category has no mapping.
    pub skipped_unmapped: Vec<SkippedAllocation>,
    pub message: String,
}

impl RunReport {
    fn empty(status: RunStatus, message: String) -> Self {
        Self {
            status,
            committed: 0,
            skipped: 0,
            window_start: None,
            window_end: None,
            errors: Vec::new(),
            skipped_unmapped: Vec::new(),
            message,
        }
    }

    /// The run lock was held by another live owner; nothing was attempted.
    pub fn busy(lock_name: &str) -> Self {
        Self::empty(
            RunStatus::Busy,
            format!("another run holds the lock '{lock_name}'"),
        )
    }

    /// First-ever run for this sync kind: watermark initialized, no backfill.
    pub fn initialized(watermark: &str) -> Self {
        let mut report = Self::empty(
            RunStatus::Success,
            format!("watermark initialized to {watermark}, 0 processed"),
        );
        report.window_end = Some(watermark.to_string());
        report
    }

    /// A fatal error aborted the run before or during setup.
    pub fn aborted(error: &SyncError) -> Self {
        let mut report = Self::empty(RunStatus::Error, format!("run aborted: {error}"));
        report.errors.push(error.to_string());
        report
    }
}
