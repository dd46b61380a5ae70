// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Commit step: resolve ledger references, guard with the idempotency
//! ledger, and post the transaction.
//!
//! Account lookups are setup-scoped: a missing account is a configuration
//! error that aborts the run before any commit attempt. Class and location
//! lookups are group-scoped: a miss fails only the group being committed.

use givesync_config::model::LedgerConfig;
use givesync_core::{SyncError, SyncKind, format_minor};
use givesync_ledger::{
    LedgerClient, LedgerResource, MatchMode, TransactionLine, TransactionPayload, TxnType,
};
use givesync_storage::{Database, queries::idempotency};
use tracing::{debug, info};

use crate::builder::{DepositPlan, RefundPlan};

/// Ledger accounts every deposit needs, resolved once per run.
#[derive(Debug, Clone)]
pub struct DepositAccounts {
    pub bank: LedgerResource,
    pub income: LedgerResource,
    pub fee: LedgerResource,
}

/// Outcome of one commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The fingerprint was already recorded; the unit of work was skipped.
    AlreadyCommitted,
}

async fn require_account(
    ledger: &LedgerClient,
    name: &str,
) -> Result<LedgerResource, SyncError> {
    ledger
        .query_by_name("Account", name, MatchMode::Exact)
        .await?
        .ok_or_else(|| SyncError::Config(format!("ledger account '{name}' not found")))
}

/// Resolve the bank/income/fee accounts deposits post through.
pub async fn resolve_deposit_accounts(
    ledger: &LedgerClient,
    config: &LedgerConfig,
) -> Result<DepositAccounts, SyncError> {
    Ok(DepositAccounts {
        bank: require_account(ledger, &config.bank_account_name).await?,
        income: require_account(ledger, &config.income_account_name).await?,
        fee: require_account(ledger, &config.fee_account_name).await?,
    })
}

/// Resolve the expense account registration refunds post to.
pub async fn resolve_refund_account(
    ledger: &LedgerClient,
    config: &LedgerConfig,
) -> Result<LedgerResource, SyncError> {
    require_account(ledger, &config.refund_account_name).await
}

/// Commit one deposit plan.
///
/// When `check_fingerprint` is already recorded the plan is skipped. After a
/// successful post, every fingerprint in `mark_fingerprints` is recorded
/// under `mark_kind`.
pub async fn commit_deposit(
    db: &Database,
    ledger: &LedgerClient,
    kind: SyncKind,
    plan: &DepositPlan,
    accounts: &DepositAccounts,
    check_fingerprint: Option<&str>,
    mark_fingerprints: &[String],
) -> Result<CommitOutcome, SyncError> {
    let mark_kind = kind.to_string();
    if let Some(fingerprint) = check_fingerprint {
        if idempotency::has(db, &mark_kind, fingerprint).await? {
            debug!(%kind, label = %plan.label, "deposit already committed; skipping");
            return Ok(CommitOutcome::AlreadyCommitted);
        }
    }

    let mut lines = Vec::with_capacity(plan.lines.len());
    for line in &plan.lines {
        let class = ledger
            .query_by_name("Class", &line.class_name, MatchMode::Exact)
            .await?
            .ok_or_else(|| {
                SyncError::Config(format!("ledger class '{}' not found", line.class_name))
            })?;
        let department = ledger
            .query_by_name("Department", &line.location_name, MatchMode::Exact)
            .await?
            .ok_or_else(|| {
                SyncError::Config(format!(
                    "ledger department '{}' not found",
                    line.location_name
                ))
            })?;
        let account = if line.is_fee {
            &accounts.fee
        } else {
            &accounts.income
        };
        lines.push(TransactionLine {
            amount: format_minor(line.amount_minor),
            account_id: account.id.clone(),
            class_id: Some(class.id),
            department_id: Some(department.id),
            description: line.description.clone(),
        });
    }

    let payload = TransactionPayload {
        txn_type: TxnType::Deposit,
        account_id: accounts.bank.id.clone(),
        txn_date: plan.txn_date.clone(),
        memo: plan.memo.clone(),
        lines,
    };
    let committed = ledger.create_transaction(&payload).await?;
    info!(%kind, label = %plan.label, txn_id = %committed.id, "deposit committed");

    for fingerprint in mark_fingerprints {
        idempotency::mark(db, &mark_kind, fingerprint).await?;
    }
    Ok(CommitOutcome::Committed)
}

/// Idempotency type for refund fingerprints.
pub const REFUND_FINGERPRINT_KIND: &str = "refund";

/// Commit one refund plan as a single-line expense.
pub async fn commit_refund(
    db: &Database,
    ledger: &LedgerClient,
    plan: &RefundPlan,
    bank: &LedgerResource,
    refund_account: &LedgerResource,
    fingerprint: &str,
) -> Result<CommitOutcome, SyncError> {
    if idempotency::has(db, REFUND_FINGERPRINT_KIND, fingerprint).await? {
        debug!(
            registration = %plan.registration_id,
            "refund already committed at this cumulative total; skipping"
        );
        return Ok(CommitOutcome::AlreadyCommitted);
    }

    let payload = TransactionPayload {
        txn_type: TxnType::Expense,
        account_id: bank.id.clone(),
        txn_date: plan.txn_date.clone(),
        memo: plan.memo.clone(),
        lines: vec![TransactionLine {
            amount: format_minor(plan.amount_minor),
            account_id: refund_account.id.clone(),
            class_id: None,
            department_id: None,
            description: plan.memo.clone(),
        }],
    };
    let committed = ledger.create_transaction(&payload).await?;
    info!(
        registration = %plan.registration_id,
        txn_id = %committed.id,
        amount = %format_minor(plan.amount_minor),
        "refund committed"
    );

    idempotency::mark(db, REFUND_FINGERPRINT_KIND, fingerprint).await?;
    Ok(CommitOutcome::Committed)
}
