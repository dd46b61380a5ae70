// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OAuth2 HTTP client for the Ledger accounting API.
//!
//! Provides [`LedgerClient`] which owns bearer-token lifecycle (refresh with
//! a safety margin, one refresh-and-retry on 401), caches name→id lookups
//! for the lifetime of one client instance, and posts deposit/refund
//! transactions.

pub mod client;
pub mod token;
pub mod types;

pub use client::LedgerClient;
pub use token::{LedgerToken, TokenStore};
pub use types::{
    CommittedTransaction, LedgerResource, MatchMode, TransactionLine, TransactionPayload, TxnType,
};
