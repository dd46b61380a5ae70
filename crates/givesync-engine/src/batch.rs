// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch sync: books committed batches of manually entered donations, one
//! deposit per batch, guarded by per-item fingerprints.
//!
//! Items are fingerprinted individually (id + batch id) so a donation is
//! skipped on every future run regardless of which batch window it
//! resurfaces in.

use chrono::Utc;
use givesync_core::{ErrorKind, RawRecord, RunStatus, SyncError, SyncKind};
use givesync_source::{SourceBatch, SourceDonation};
use givesync_storage::queries::{idempotency, mappings};
use tracing::warn;

use crate::aggregate::aggregate;
use crate::commit::{self, CommitOutcome};
use crate::context::RunContext;
use crate::report::{RunReport, SyncOptions};
use crate::window::{self, WindowResolution};
use crate::{builder, fingerprint};

pub(crate) async fn run(ctx: &RunContext, opts: &SyncOptions) -> Result<RunReport, SyncError> {
    let kind = SyncKind::Batch;
    let now = Utc::now();
    let sync_cfg = &ctx.config.sync;

    let window = match window::resolve(
        &ctx.db,
        kind,
        opts,
        sync_cfg.default_backfill_days,
        sync_cfg.max_backfill_days,
        now,
    )
    .await?
    {
        WindowResolution::Initialized(at) => {
            return Ok(RunReport::initialized(&at.to_rfc3339()));
        }
        WindowResolution::Window(window) => window,
    };

    let query = [
        ("committed_after", window.start.to_rfc3339()),
        ("committed_before", window.end.to_rfc3339()),
    ];
    let batches: Vec<SourceBatch> = ctx.source.fetch_all("batches", &query).await?;

    // Per-item fingerprints filter already-booked donations before
    // aggregation, so a re-surfacing batch only contributes its new items.
    let mut records: Vec<RawRecord> = Vec::new();
    let mut skipped = 0u32;
    for batch in &batches {
        let donations: Vec<SourceDonation> = ctx
            .source
            .fetch_all(&format!("batches/{}/donations", batch.id), &[])
            .await?;
        for donation in donations {
            let item_fingerprint = fingerprint::item(&donation.id, Some(&batch.id));
            if idempotency::has(&ctx.db, &kind.to_string(), &item_fingerprint).await? {
                skipped += 1;
                continue;
            }
            records.push(to_record(donation, batch));
        }
    }

    let mapping_table = mappings::all(&ctx.db).await?;
    let outcome = aggregate(&records, &mapping_table);

    let accounts = commit::resolve_deposit_accounts(&ctx.ledger, &ctx.config.ledger).await?;

    let mut committed = 0u32;
    let mut errors = Vec::new();

    for group in &outcome.groups {
        let Some(plan) = builder::build_deposit(group) else {
            continue;
        };
        let item_fingerprints: Vec<String> = group
            .record_ids
            .iter()
            .map(|id| fingerprint::item(id, Some(&group.key.label)))
            .collect();
        match commit::commit_deposit(
            &ctx.db,
            &ctx.ledger,
            kind,
            &plan,
            &accounts,
            None,
            &item_fingerprints,
        )
        .await
        {
            Ok(CommitOutcome::Committed) => committed += 1,
            Ok(CommitOutcome::AlreadyCommitted) => skipped += 1,
            Err(e) if e.kind() == ErrorKind::Auth => return Err(e),
            Err(e) => {
                warn!(batch = %plan.label, error = %e, "batch deposit failed; continuing");
                errors.push(format!("batch {} / {}: {e}", plan.label, group.key.location));
            }
        }
    }

    window::advance(&ctx.db, kind, window.end).await?;

    Ok(RunReport {
        status: RunStatus::from_counts(committed, errors.len()),
        committed,
        skipped,
        window_start: Some(window.start.to_rfc3339()),
        window_end: Some(window.end.to_rfc3339()),
        message: format!(
            "{} batches fetched, {committed} committed, {skipped} items skipped, {} unmapped, {} errors",
            batches.len(),
            outcome.skipped_unmapped.len(),
            errors.len()
        ),
        errors,
        skipped_unmapped: outcome.skipped_unmapped,
    })
}

/// Batch donations are booked on the batch's commit date, under the batch id.
fn to_record(donation: SourceDonation, batch: &SourceBatch) -> RawRecord {
    RawRecord {
        id: donation.id,
        occurred_at: batch.committed_at,
        gross_minor: donation.amount_minor,
        fee_minor: donation.fee_minor,
        instrument: donation.payment_method,
        allocations: donation
            .designations
            .into_iter()
            .map(|d| givesync_core::Allocation {
                category_id: d.fund_id,
                amount_minor: d.amount_minor,
            })
            .collect(),
        batch_id: Some(batch.id.clone()),
    }
}
