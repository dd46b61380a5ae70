// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transaction builder: turns an aggregated group into a ledger-ready plan.
//!
//! Plans carry ledger dimension *names*; the commit step resolves names to
//! ids through the ledger gateway's cached lookups. A group that yields zero
//! lines is skipped, never committed as an empty transaction.

use givesync_core::{PaymentInstrument, format_minor};

use crate::aggregate::TransactionGroup;

/// One planned deposit line, before name→id resolution.
#[derive(Debug, Clone)]
pub struct PlanLine {
    /// Signed amount in minor units; fee lines are negative.
    pub amount_minor: i64,
    /// True for a processing-fee line (posts to the fee account).
    pub is_fee: bool,
    pub class_name: String,
    pub location_name: String,
    pub instrument: PaymentInstrument,
    pub description: String,
}

/// A planned deposit for one transaction group.
#[derive(Debug, Clone)]
pub struct DepositPlan {
    /// Batch id or date label the group was keyed on.
    pub label: String,
    /// Transaction date, `YYYY-MM-DD`.
    pub txn_date: String,
    pub memo: String,
    pub lines: Vec<PlanLine>,
    /// Contributing raw-record ids, sorted.
    pub record_ids: Vec<String>,
}

/// A planned refund for one registration whose cumulative total increased.
#[derive(Debug, Clone)]
pub struct RefundPlan {
    pub registration_id: String,
    /// Refund delta to book, in minor units (positive).
    pub amount_minor: i64,
    /// New cumulative refunded total, recorded after commit.
    pub cumulative_minor: i64,
    pub txn_date: String,
    pub memo: String,
}

/// Build the deposit plan for a group: one gross line per non-zero
/// (category, instrument) cell, plus one fee line per cell with a non-zero
/// fee share. Returns `None` when every cell nets to zero.
pub fn build_deposit(group: &TransactionGroup) -> Option<DepositPlan> {
    let mut lines = Vec::new();

    for (cell_key, cell) in &group.cells {
        if cell.gross_minor != 0 {
            lines.push(PlanLine {
                amount_minor: cell.gross_minor,
                is_fee: false,
                class_name: cell.class_name.clone(),
                location_name: group.key.location.clone(),
                instrument: cell_key.instrument,
                description: format!("{} ({})", cell.display_name, cell_key.instrument),
            });
        }
        if cell.fee_minor != 0 {
            lines.push(PlanLine {
                amount_minor: -cell.fee_minor,
                is_fee: true,
                class_name: cell.class_name.clone(),
                location_name: group.key.location.clone(),
                instrument: cell_key.instrument,
                description: format!(
                    "{} ({}) processing fees",
                    cell.display_name, cell_key.instrument
                ),
            });
        }
    }

    if lines.is_empty() {
        return None;
    }

    let record_ids: Vec<String> = group.record_ids.iter().cloned().collect();
    Some(DepositPlan {
        label: group.key.label.clone(),
        txn_date: group.txn_date.clone(),
        memo: format!(
            "Givesync deposit {} / {} ({} records, gross {})",
            group.key.label,
            group.key.location,
            record_ids.len(),
            format_minor(group.total_gross_minor),
        ),
        lines,
        record_ids,
    })
}

/// Build the refund plan for a registration.
pub fn build_refund(
    registration_id: &str,
    event_name: &str,
    delta_minor: i64,
    cumulative_minor: i64,
    txn_date: &str,
) -> RefundPlan {
    RefundPlan {
        registration_id: registration_id.to_string(),
        amount_minor: delta_minor,
        cumulative_minor,
        txn_date: txn_date.to_string(),
        memo: format!(
            "Registration refund {registration_id} ({event_name}), cumulative {}",
            format_minor(cumulative_minor),
        ),
    }
}
