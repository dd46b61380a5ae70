// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync window resolution against the persisted watermark.
//!
//! The window end is always "now" (UTC). The start is the stored watermark,
//! or an explicit operator override (`reset_window` + `backfill_days`). The
//! start is clamped so it never exceeds the end, guarding against clock skew
//! producing an inverted window. The first-ever run for a sync kind writes
//! the watermark at "now" and processes nothing: no backfill on first deploy.

use chrono::{DateTime, Duration, Utc};
use givesync_core::{SyncError, SyncKind};
use givesync_storage::{Database, queries::settings};
use tracing::info;

use crate::report::SyncOptions;

/// The [watermark, now) range one run processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Outcome of window resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowResolution {
    /// Process this window.
    Window(SyncWindow),
    /// First run: the watermark was initialized to `now`; process nothing.
    Initialized(DateTime<Utc>),
}

/// Resolve the window for a run. Must be called while the run lock is held:
/// the first-run path writes the watermark.
///
/// `backfill_days` defaults from config and is upper-clamped for the batch
/// and registrations variants.
pub async fn resolve(
    db: &Database,
    kind: SyncKind,
    opts: &SyncOptions,
    default_backfill_days: u32,
    max_backfill_days: u32,
    now: DateTime<Utc>,
) -> Result<WindowResolution, SyncError> {
    let key = kind.watermark_key();
    let end = now;

    if opts.reset_window {
        let mut days = opts.backfill_days.unwrap_or(default_backfill_days);
        if matches!(kind, SyncKind::Batch | SyncKind::Registrations) {
            days = days.min(max_backfill_days);
        }
        let start = end - Duration::days(i64::from(days));
        info!(%kind, days, "window reset by operator override");
        return Ok(WindowResolution::Window(SyncWindow { start, end }));
    }

    match settings::get(db, &key).await? {
        Some(stored) => {
            let parsed = DateTime::parse_from_rfc3339(&stored).map_err(|e| {
                SyncError::Internal(format!(
                    "stored watermark '{stored}' for {kind} is not a timestamp: {e}"
                ))
            })?;
            // Clamp: a watermark ahead of "now" (clock skew) yields an empty
            // window, never an inverted one.
            let start = parsed.with_timezone(&Utc).min(end);
            Ok(WindowResolution::Window(SyncWindow { start, end }))
        }
        None => {
            settings::set(db, &key, &end.to_rfc3339()).await?;
            info!(%kind, watermark = %end, "first run: watermark initialized, no backfill");
            Ok(WindowResolution::Initialized(end))
        }
    }
}

/// Advance the watermark to the window end. Called once per completed run,
/// regardless of partial/error status, so a persistently failing record
/// cannot pin the watermark.
pub async fn advance(db: &Database, kind: SyncKind, end: DateTime<Utc>) -> Result<(), SyncError> {
    settings::set(db, &kind.watermark_key(), &end.to_rfc3339()).await
}
