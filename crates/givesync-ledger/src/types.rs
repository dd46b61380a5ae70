// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Ledger accounting API.

use serde::{Deserialize, Serialize};

/// How a name lookup matches against ledger resource names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// `name = 'value'`
    Exact,
    /// `name LIKE 'value%'`
    Prefix,
}

/// A named ledger resource (account, class, or department).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerResource {
    pub id: String,
    pub name: String,
}

/// Response shape of the ledger's read-query endpoint.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub rows: Vec<LedgerResource>,
}

/// Transaction kinds the engine creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    /// Money into the bank account (aggregated donations/payments).
    Deposit,
    /// Money out of the bank account (registration refunds).
    Expense,
}

/// One line of a ledger transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionLine {
    /// Decimal amount string, e.g. `"100.00"`; negative for fee lines.
    pub amount: String,
    /// Account the line posts to (income or expense account id).
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    pub description: String,
}

/// A deposit or expense transaction posted to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPayload {
    #[serde(rename = "type")]
    pub txn_type: TxnType,
    /// Bank account the transaction moves money through.
    pub account_id: String,
    /// Transaction date, `YYYY-MM-DD`.
    pub txn_date: String,
    pub memo: String,
    pub lines: Vec<TransactionLine>,
}

/// The ledger's acknowledgement of a created transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct CommittedTransaction {
    pub id: String,
}
