// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregation of raw records into ledger-ready transaction groups.
//!
//! Records group by (batch-or-date, resolved location); within a group,
//! amounts accumulate per (category, payment instrument) cell. An allocation
//! whose category has no mapping is reported as skipped-unmapped, never
//! silently dropped. Fee shares are allocated proportionally with the last
//! allocation absorbing the rounding remainder, so per-record shares always
//! sum exactly to the record's total fee.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use givesync_core::{CategoryMapping, PaymentInstrument, RawRecord};
use serde::Serialize;

/// Grouping key: one ledger transaction per key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupKey {
    /// Batch id for batch-committed records, otherwise the `YYYY-MM-DD` date.
    pub label: String,
    /// Resolved ledger location name.
    pub location: String,
}

/// Cell key within a group: one transaction line per cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellKey {
    pub category_id: String,
    pub instrument: PaymentInstrument,
}

/// Accumulated amounts for one (category, instrument) cell.
#[derive(Debug, Clone, Default)]
pub struct GroupCell {
    pub gross_minor: i64,
    pub fee_minor: i64,
    /// Mapping data resolved for the cell's category.
    pub display_name: String,
    pub class_name: String,
}

/// Transient aggregate built per run; exists only in memory.
#[derive(Debug, Clone)]
pub struct TransactionGroup {
    pub key: GroupKey,
    pub cells: BTreeMap<CellKey, GroupCell>,
    /// Ids of the raw records that contributed to this group.
    pub record_ids: BTreeSet<String>,
    pub total_gross_minor: i64,
    /// Latest record date in the group, `YYYY-MM-DD`; used as the txn date.
    pub txn_date: String,
}

/// An allocation excluded from aggregation because its category is unmapped.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedAllocation {
    pub record_id: String,
    pub category_id: String,
    pub amount_minor: i64,
    pub reason: String,
}

/// Result of one aggregation pass.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    pub groups: Vec<TransactionGroup>,
    pub skipped_unmapped: Vec<SkippedAllocation>,
}

impl Default for TransactionGroup {
    fn default() -> Self {
        Self {
            key: GroupKey {
                label: String::new(),
                location: String::new(),
            },
            cells: BTreeMap::new(),
            record_ids: BTreeSet::new(),
            total_gross_minor: 0,
            txn_date: String::new(),
        }
    }
}

/// Aggregate raw records into transaction groups using the mapping table.
///
/// Groups come back ordered by key; the order is deterministic within a run
/// but carries no meaning across runs.
pub fn aggregate(
    records: &[RawRecord],
    mappings: &HashMap<String, CategoryMapping>,
) -> AggregateOutcome {
    let mut groups: BTreeMap<GroupKey, TransactionGroup> = BTreeMap::new();
    let mut skipped_unmapped = Vec::new();

    for record in records {
        let fee_shares = allocate_fee(record.fee_minor, &record.allocations);
        let date = record.occurred_at.format("%Y-%m-%d").to_string();
        let label = record.batch_id.clone().unwrap_or_else(|| date.clone());

        for (allocation, fee_share) in record.allocations.iter().zip(fee_shares) {
            let Some(mapping) = mappings.get(&allocation.category_id) else {
                skipped_unmapped.push(SkippedAllocation {
                    record_id: record.id.clone(),
                    category_id: allocation.category_id.clone(),
                    amount_minor: allocation.amount_minor,
                    reason: format!(
                        "no mapping for category '{}'",
                        allocation.category_id
                    ),
                });
                continue;
            };

            let key = GroupKey {
                label: label.clone(),
                location: mapping.location_name.clone(),
            };
            let group = groups.entry(key.clone()).or_insert_with(|| TransactionGroup {
                key,
                ..TransactionGroup::default()
            });

            let cell = group
                .cells
                .entry(CellKey {
                    category_id: allocation.category_id.clone(),
                    instrument: record.instrument,
                })
                .or_default();
            cell.gross_minor += allocation.amount_minor;
            cell.fee_minor += fee_share;
            cell.display_name = mapping.display_name.clone();
            cell.class_name = mapping.class_name.clone();

            group.total_gross_minor += allocation.amount_minor;
            group.record_ids.insert(record.id.clone());
            if date > group.txn_date {
                group.txn_date = date.clone();
            }
        }
    }

    AggregateOutcome {
        groups: groups.into_values().collect(),
        skipped_unmapped,
    }
}

/// Split a record's total fee across its allocations, proportional to
/// allocation amounts.
///
/// The first N−1 shares round half away from zero; the last share is the
/// exact remainder. This is the canonical tie-break: shares always sum to
/// `fee_minor` exactly, for any fee (including zero and negative) and any
/// allocation count.
pub fn allocate_fee(fee_minor: i64, allocations: &[givesync_core::Allocation]) -> Vec<i64> {
    if allocations.is_empty() {
        return Vec::new();
    }

    let total_allocated: i64 = allocations.iter().map(|a| a.amount_minor).sum();
    let mut shares = Vec::with_capacity(allocations.len());
    let mut assigned: i64 = 0;

    for allocation in &allocations[..allocations.len() - 1] {
        let share = if total_allocated == 0 {
            0
        } else {
            round_half_away(
                fee_minor as i128 * allocation.amount_minor as i128,
                total_allocated as i128,
            )
        };
        shares.push(share);
        assigned += share;
    }
    // The last allocation absorbs the rounding remainder.
    shares.push(fee_minor - assigned);
    shares
}

/// Integer division rounding half away from zero. `den` must be positive.
fn round_half_away(num: i128, den: i128) -> i64 {
    let q = if num >= 0 {
        (num * 2 + den) / (den * 2)
    } else {
        -(((-num) * 2 + den) / (den * 2))
    };
    q as i64
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use givesync_core::Allocation;

    use super::*;

    fn record(
        id: &str,
        date: (i32, u32, u32),
        gross: i64,
        fee: i64,
        instrument: PaymentInstrument,
        allocations: Vec<(&str, i64)>,
    ) -> RawRecord {
        RawRecord {
            id: id.to_string(),
            occurred_at: Utc.with_ymd_and_hms(date.0, date.1, date.2, 12, 0, 0).unwrap(),
            gross_minor: gross,
            fee_minor: fee,
            instrument,
            allocations: allocations
                .into_iter()
                .map(|(category_id, amount_minor)| Allocation {
                    category_id: category_id.to_string(),
                    amount_minor,
                })
                .collect(),
            batch_id: None,
        }
    }

    fn mapping(category_id: &str, class: &str, location: &str) -> (String, CategoryMapping) {
        (
            category_id.to_string(),
            CategoryMapping {
                category_id: category_id.to_string(),
                display_name: format!("{class} Fund"),
                class_name: class.to_string(),
                location_name: location.to_string(),
            },
        )
    }

    #[test]
    fn fee_shares_sum_exactly_for_awkward_splits() {
        // 100 split across three equal allocations: 33 + 33 + 34.
        let allocations: Vec<Allocation> = [100, 100, 100]
            .iter()
            .map(|amount| Allocation {
                category_id: "c".into(),
                amount_minor: *amount,
            })
            .collect();
        let shares = allocate_fee(100, &allocations);
        assert_eq!(shares.iter().sum::<i64>(), 100);
        assert_eq!(shares, vec![33, 33, 34]);
    }

    #[test]
    fn fee_shares_sum_exactly_across_many_shapes() {
        let cases: &[(i64, &[i64])] = &[
            (0, &[100]),
            (1, &[1]),
            (450, &[10000, 5000]),
            (301, &[9999, 1, 50]),
            (-250, &[300, 700]),
            (7, &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1]),
            (100, &[0, 0]),
        ];
        for (fee, amounts) in cases {
            let allocations: Vec<Allocation> = amounts
                .iter()
                .map(|amount| Allocation {
                    category_id: "c".into(),
                    amount_minor: *amount,
                })
                .collect();
            let shares = allocate_fee(*fee, &allocations);
            assert_eq!(shares.len(), allocations.len());
            assert_eq!(
                shares.iter().sum::<i64>(),
                *fee,
                "fee {fee} over {amounts:?} gave {shares:?}"
            );
        }
    }

    #[test]
    fn single_allocation_takes_the_whole_fee() {
        let allocations = vec![Allocation {
            category_id: "c".into(),
            amount_minor: 10000,
        }];
        assert_eq!(allocate_fee(300, &allocations), vec![300]);
        assert_eq!(allocate_fee(0, &allocations), vec![0]);
    }

    #[test]
    fn proportional_shares_follow_allocation_weight() {
        // $4.50 fee over $100 + $50: $3.00 and $1.50.
        let allocations = vec![
            Allocation {
                category_id: "a".into(),
                amount_minor: 10000,
            },
            Allocation {
                category_id: "b".into(),
                amount_minor: 5000,
            },
        ];
        assert_eq!(allocate_fee(450, &allocations), vec![300, 150]);
    }

    #[test]
    fn same_date_and_location_aggregate_into_one_group() {
        let mappings: HashMap<_, _> = [
            mapping("fund-a", "Missions", "General"),
            mapping("fund-b", "Building", "General"),
        ]
        .into_iter()
        .collect();

        let records = vec![
            record("d1", (2026, 8, 1), 10000, 300, PaymentInstrument::Card, vec![("fund-a", 10000)]),
            record("d2", (2026, 8, 1), 5000, 150, PaymentInstrument::Card, vec![("fund-b", 5000)]),
        ];

        let outcome = aggregate(&records, &mappings);
        assert_eq!(outcome.groups.len(), 1);
        assert!(outcome.skipped_unmapped.is_empty());

        let group = &outcome.groups[0];
        assert_eq!(group.key.label, "2026-08-01");
        assert_eq!(group.key.location, "General");
        assert_eq!(group.total_gross_minor, 15000);
        assert_eq!(group.cells.len(), 2);
        assert_eq!(group.record_ids.len(), 2);

        let fees: i64 = group.cells.values().map(|c| c.fee_minor).sum();
        assert_eq!(fees, 450);
    }

    #[test]
    fn different_locations_split_into_separate_groups() {
        let mappings: HashMap<_, _> = [
            mapping("fund-a", "Missions", "General"),
            mapping("fund-b", "Youth", "North Campus"),
        ]
        .into_iter()
        .collect();

        let records = vec![record(
            "d1",
            (2026, 8, 1),
            15000,
            450,
            PaymentInstrument::Card,
            vec![("fund-a", 10000), ("fund-b", 5000)],
        )];

        let outcome = aggregate(&records, &mappings);
        assert_eq!(outcome.groups.len(), 2);
        // Per-record fee shares still sum to the record fee across groups.
        let fees: i64 = outcome
            .groups
            .iter()
            .flat_map(|g| g.cells.values())
            .map(|c| c.fee_minor)
            .sum();
        assert_eq!(fees, 450);
    }

    #[test]
    fn unmapped_category_is_reported_not_dropped() {
        let mappings: HashMap<_, _> = [mapping("fund-a", "Missions", "General")]
            .into_iter()
            .collect();

        let records = vec![record(
            "d1",
            (2026, 8, 1),
            15000,
            0,
            PaymentInstrument::Card,
            vec![("fund-a", 10000), ("fund-x", 5000)],
        )];

        let outcome = aggregate(&records, &mappings);
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].total_gross_minor, 10000);

        assert_eq!(outcome.skipped_unmapped.len(), 1);
        let skipped = &outcome.skipped_unmapped[0];
        assert_eq!(skipped.category_id, "fund-x");
        assert_eq!(skipped.amount_minor, 5000);
        assert!(skipped.reason.contains("fund-x"), "reason names the id");
    }

    #[test]
    fn instruments_get_separate_cells_within_a_group() {
        let mappings: HashMap<_, _> = [mapping("fund-a", "Missions", "General")]
            .into_iter()
            .collect();

        let records = vec![
            record("d1", (2026, 8, 1), 10000, 300, PaymentInstrument::Card, vec![("fund-a", 10000)]),
            record("d2", (2026, 8, 1), 4000, 0, PaymentInstrument::Check, vec![("fund-a", 4000)]),
        ];

        let outcome = aggregate(&records, &mappings);
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].cells.len(), 2);
    }

    #[test]
    fn batch_id_overrides_date_as_group_label() {
        let mappings: HashMap<_, _> = [mapping("fund-a", "Missions", "General")]
            .into_iter()
            .collect();

        let mut batch_record = record(
            "d1",
            (2026, 8, 1),
            10000,
            0,
            PaymentInstrument::Cash,
            vec![("fund-a", 10000)],
        );
        batch_record.batch_id = Some("batch-42".to_string());

        let outcome = aggregate(&[batch_record], &mappings);
        assert_eq!(outcome.groups[0].key.label, "batch-42");
        assert_eq!(outcome.groups[0].txn_date, "2026-08-01");
    }

    #[test]
    fn records_with_no_allocations_contribute_nothing() {
        let mappings = HashMap::new();
        let records = vec![record(
            "d1",
            (2026, 8, 1),
            0,
            0,
            PaymentInstrument::Other,
            vec![],
        )];
        let outcome = aggregate(&records, &mappings);
        assert!(outcome.groups.is_empty());
        assert!(outcome.skipped_unmapped.is_empty());
    }
}
