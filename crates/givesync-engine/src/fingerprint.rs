// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fingerprint construction for the idempotency ledger.
//!
//! Three shapes, each deterministic:
//! - per-item: the raw item id, plus its batch id when present — stored
//!   individually so an item is skipped on all future runs regardless of
//!   which batch window it resurfaces in;
//! - per-group: SHA-256 over {sync kind, sorted contributing record ids,
//!   target bank-account id};
//! - refund: a delimited triple encoding the *cumulative* refunded total at
//!   commit time, not the delta.

use givesync_core::SyncKind;
use sha2::{Digest, Sha256};

/// Fingerprint for one batch-committed item.
pub fn item(item_id: &str, batch_id: Option<&str>) -> String {
    match batch_id {
        Some(batch_id) => format!("{item_id}|{batch_id}"),
        None => item_id.to_string(),
    }
}

/// Fingerprint for an aggregated deposit group.
///
/// Contributing ids are sorted before hashing so the fingerprint is stable
/// across fetch orderings.
pub fn group<I, S>(kind: SyncKind, record_ids: I, bank_account_id: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ids: Vec<String> = record_ids
        .into_iter()
        .map(|id| id.as_ref().to_string())
        .collect();
    ids.sort();

    let mut hasher = Sha256::new();
    hasher.update(kind.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(ids.join(",").as_bytes());
    hasher.update(b"|");
    hasher.update(bank_account_id.as_bytes());
    hex::encode(hasher.finalize())
}

/// Fingerprint for a registration refund at a given cumulative total.
pub fn refund(kind: SyncKind, registration_id: &str, cumulative_refund_minor: i64) -> String {
    format!("{kind}|{registration_id}|{cumulative_refund_minor}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_fingerprint_includes_batch_when_present() {
        assert_eq!(item("don-9", None), "don-9");
        assert_eq!(item("don-9", Some("batch-2")), "don-9|batch-2");
    }

    #[test]
    fn group_fingerprint_is_order_independent() {
        let a = group(SyncKind::Stripe, ["d2", "d1", "d3"], "acct-1");
        let b = group(SyncKind::Stripe, ["d1", "d3", "d2"], "acct-1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64, "hex SHA-256 digest");
    }

    #[test]
    fn group_fingerprint_varies_with_kind_ids_and_account() {
        let base = group(SyncKind::Stripe, ["d1", "d2"], "acct-1");
        assert_ne!(base, group(SyncKind::Registrations, ["d1", "d2"], "acct-1"));
        assert_ne!(base, group(SyncKind::Stripe, ["d1"], "acct-1"));
        assert_ne!(base, group(SyncKind::Stripe, ["d1", "d2"], "acct-2"));
    }

    #[test]
    fn refund_fingerprint_encodes_cumulative_total() {
        assert_eq!(
            refund(SyncKind::Registrations, "reg-7", 3500),
            "registrations|reg-7|3500"
        );
        assert_ne!(
            refund(SyncKind::Registrations, "reg-7", 3500),
            refund(SyncKind::Registrations, "reg-7", 2000)
        );
    }
}
