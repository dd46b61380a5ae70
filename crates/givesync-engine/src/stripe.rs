// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Online-donation sync: aggregates card/ACH donations into one deposit per
//! (date, location) group, guarded by a per-group fingerprint.

use chrono::Utc;
use givesync_core::{ErrorKind, RawRecord, RunStatus, SyncError, SyncKind};
use givesync_source::SourceDonation;
use givesync_storage::queries::mappings;
use tracing::warn;

use crate::aggregate::aggregate;
use crate::commit::{self, CommitOutcome};
use crate::context::RunContext;
use crate::report::{RunReport, SyncOptions};
use crate::window::{self, WindowResolution};
use crate::{builder, fingerprint};

pub(crate) async fn run(ctx: &RunContext, opts: &SyncOptions) -> Result<RunReport, SyncError> {
    let kind = SyncKind::Stripe;
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
        ("created_after", window.start.to_rfc3339()),
        ("created_before", window.end.to_rfc3339()),
        ("refunded", "false".to_string()),
    ];
    let donations: Vec<SourceDonation> = ctx.source.fetch_all("donations", &query).await?;
    let records: Vec<RawRecord> = donations.into_iter().map(to_record).collect();

    let mapping_table = mappings::all(&ctx.db).await?;
    let outcome = aggregate(&records, &mapping_table);

    let accounts = commit::resolve_deposit_accounts(&ctx.ledger, &ctx.config.ledger).await?;

    let mut committed = 0u32;
    let mut skipped = 0u32;
    let mut errors = Vec::new();

    for group in &outcome.groups {
        let Some(plan) = builder::build_deposit(group) else {
            continue;
        };
        let group_fingerprint = fingerprint::group(kind, &group.record_ids, &accounts.bank.id);
        match commit::commit_deposit(
            &ctx.db,
            &ctx.ledger,
            kind,
            &plan,
            &accounts,
            Some(&group_fingerprint),
            std::slice::from_ref(&group_fingerprint),
        )
        .await
        {
            Ok(CommitOutcome::Committed) => committed += 1,
            Ok(CommitOutcome::AlreadyCommitted) => skipped += 1,
            Err(e) if e.kind() == ErrorKind::Auth => return Err(e),
            Err(e) => {
                warn!(label = %plan.label, error = %e, "deposit group failed; continuing");
                errors.push(format!(
                    "deposit {} / {}: {e}",
                    plan.label, group.key.location
                ));
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
            "{committed} committed, {skipped} skipped, {} unmapped, {} errors",
            outcome.skipped_unmapped.len(),
            errors.len()
        ),
        errors,
        skipped_unmapped: outcome.skipped_unmapped,
    })
}

fn to_record(donation: SourceDonation) -> RawRecord {
    RawRecord {
        id: donation.id,
        occurred_at: donation.received_at,
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
        batch_id: None,
    }
}
