//! Ordering and filtering over enriched records.
//!
//! # Invariants
//! - Sorting is stable: ties keep input order.
//! - A record without `days_until_occurrence` sorts as if it were `0`.

use crate::model::record::DatedRecord;
use std::collections::BTreeSet;

/// Days value used for ordering; missing enrichment counts as today.
pub fn effective_days(record: &DatedRecord) -> u32 {
    record.days_until_occurrence.unwrap_or(0)
}

/// Sorts records by soonest upcoming occurrence.
pub fn sort_by_upcoming(records: &[DatedRecord]) -> Vec<DatedRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(effective_days);
    sorted
}

/// Splits records into `(todays, upcoming)`, both in `sort_by_upcoming` order.
pub fn partition_today(records: &[DatedRecord]) -> (Vec<DatedRecord>, Vec<DatedRecord>) {
    sort_by_upcoming(records)
        .into_iter()
        .partition(|record| effective_days(record) == 0)
}

/// Records tagged with `category`, in input order.
pub fn filter_by_category(records: &[DatedRecord], category: &str) -> Vec<DatedRecord> {
    records
        .iter()
        .filter(|record| record.categories.iter().any(|value| value == category))
        .cloned()
        .collect()
}

/// Every category used by `records`, deduplicated and sorted.
pub fn unique_categories(records: &[DatedRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|record| record.categories.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
