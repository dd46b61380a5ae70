// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared orchestrator scaffolding for the three sync variants.
//!
//! Shape: acquire lock → create run-log row → dispatch variant → finalize
//! run log → release lock. The lock is released on every exit path, and the
//! run log is finalized even when the variant aborts; a crash that skips
//! both leaves a stale lease that self-heals after its TTL.

use givesync_core::SyncKind;
use givesync_storage::queries::{locks, run_log};
use tracing::{error, info, warn};

use crate::context::RunContext;
use crate::report::{RunReport, SyncOptions};
use crate::{batch, registrations, stripe};

/// Run one sync variant end to end. Never panics; every outcome, including
/// a held lock or a fatal abort, comes back as a [`RunReport`].
pub async fn run_sync(ctx: &RunContext, kind: SyncKind, opts: &SyncOptions) -> RunReport {
    let lock_name = kind.lock_name();
    let ttl = ctx.config.sync.lock_ttl_secs;

    let lease = match locks::acquire(&ctx.db, &lock_name, ttl).await {
        Ok(Some(lease)) => lease,
        Ok(None) => {
            info!(%kind, "run lock held by another owner; reporting busy");
            return RunReport::busy(&lock_name);
        }
        Err(e) => {
            error!(%kind, error = %e, "failed to acquire run lock");
            return RunReport::aborted(&e);
        }
    };

    let run_id = match run_log::start(&ctx.db, &kind.to_string()).await {
        Ok(id) => id,
        Err(e) => {
            error!(%kind, error = %e, "failed to create run-log row");
            release(ctx, &lock_name, &lease).await;
            return RunReport::aborted(&e);
        }
    };

    info!(%kind, run_id, "sync run started");
    let result = match kind {
        SyncKind::Stripe => stripe::run(ctx, opts).await,
        SyncKind::Batch => batch::run(ctx, opts).await,
        SyncKind::Registrations => registrations::run(ctx, opts).await,
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            error!(%kind, run_id, error = %e, "sync run aborted");
            RunReport::aborted(&e)
        }
    };

    if let Err(e) = run_log::finish(
        &ctx.db,
        run_id,
        report.window_start.as_deref().unwrap_or(""),
        report.window_end.as_deref().unwrap_or(""),
        report.committed,
        report.skipped,
        &report.status.to_string(),
        &report.message,
    )
    .await
    {
        warn!(%kind, run_id, error = %e, "failed to finalize run-log row");
    }

    release(ctx, &lock_name, &lease).await;
    info!(
        %kind,
        run_id,
        status = %report.status,
        committed = report.committed,
        skipped = report.skipped,
        errors = report.errors.len(),
        "sync run finished"
    );
    report
}

async fn release(ctx: &RunContext, lock_name: &str, lease: &str) {
    if let Err(e) = locks::release(&ctx.db, lock_name, lease).await {
        // The lease self-heals after its TTL; log and move on.
        warn!(lock_name, error = %e, "failed to release run lock");
    }
}
