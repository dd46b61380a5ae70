// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration sync: books event-registration payments as deposits, then
//! books refund deltas against each registration's last seen cumulative
//! refund total.
//!
//! Refund fingerprints encode the cumulative total, not the delta, so "have
//! we already booked this much refund for this registration" is a pure
//! lookup over previously marked totals.

use chrono::Utc;
use givesync_core::{ErrorKind, RawRecord, RunStatus, SyncError, SyncKind};
use givesync_source::SourceRegistration;
use givesync_storage::queries::{mappings, refunds};
use tracing::warn;

use crate::aggregate::aggregate;
use crate::commit::{self, CommitOutcome};
use crate::context::RunContext;
use crate::report::{RunReport, SyncOptions};
use crate::window::{self, WindowResolution};
use crate::{builder, fingerprint};

pub(crate) async fn run(ctx: &RunContext, opts: &SyncOptions) -> Result<RunReport, SyncError> {
    let kind = SyncKind::Registrations;
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
        ("paid_after", window.start.to_rfc3339()),
        ("paid_before", window.end.to_rfc3339()),
    ];
    let paid: Vec<SourceRegistration> = ctx.source.fetch_all("registrations", &query).await?;
    let records: Vec<RawRecord> = paid.into_iter().map(to_record).collect();

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
                warn!(label = %plan.label, error = %e, "registration deposit failed; continuing");
                errors.push(format!(
                    "deposit {} / {}: {e}",
                    plan.label, group.key.location
                ));
            }
        }
    }

    // Refund pass: one expense per registration whose cumulative refunded
    // total increased since last observed.
    let with_refunds: Vec<SourceRegistration> = ctx
        .source
        .fetch_all("registrations", &[("with_refunds", "true".to_string())])
        .await?;

    if !with_refunds.is_empty() {
        match commit::resolve_refund_account(&ctx.ledger, &ctx.config.ledger).await {
            Ok(refund_account) => {
                let txn_date = now.format("%Y-%m-%d").to_string();
                for registration in &with_refunds {
                    let prior = if opts.force_refunds {
                        0
                    } else {
                        refunds::get(&ctx.db, &registration.id).await?.unwrap_or(0)
                    };
                    let cumulative = registration.total_refunded_minor;
                    let delta = cumulative - prior;
                    if delta <= 0 {
                        continue;
                    }

                    let refund_fingerprint =
                        fingerprint::refund(kind, &registration.id, cumulative);
                    let plan = builder::build_refund(
                        &registration.id,
                        &registration.event_name,
                        delta,
                        cumulative,
                        &txn_date,
                    );
                    match commit::commit_refund(
                        &ctx.db,
                        &ctx.ledger,
                        &plan,
                        &accounts.bank,
                        &refund_account,
                        &refund_fingerprint,
                    )
                    .await
                    {
                        Ok(CommitOutcome::Committed) => {
                            refunds::set(&ctx.db, &registration.id, cumulative).await?;
                            committed += 1;
                        }
                        Ok(CommitOutcome::AlreadyCommitted) => {
                            // Already booked at this total; resync the
                            // watermark row and move on.
                            refunds::set(&ctx.db, &registration.id, cumulative).await?;
                            skipped += 1;
                        }
                        Err(e) if e.kind() == ErrorKind::Auth => return Err(e),
                        Err(e) => {
                            warn!(
                                registration = %registration.id,
                                error = %e,
                                "refund failed; continuing"
                            );
                            errors.push(format!("refund {}: {e}", registration.id));
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "refund account unavailable; skipping refund pass");
                errors.push(format!("refund pass skipped: {e}"));
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

fn to_record(registration: SourceRegistration) -> RawRecord {
    RawRecord {
        id: registration.id,
        occurred_at: registration.paid_at,
        gross_minor: registration.total_paid_minor,
        fee_minor: registration.fee_minor,
        instrument: registration.payment_method,
        allocations: vec![givesync_core::Allocation {
            category_id: registration.fund_id,
            amount_minor: registration.total_paid_minor,
        }],
        batch_id: None,
    }
}
