use cumple_core::schedule::date_math::enrich_all;
use cumple_core::schedule::ordering::{partition_today, sort_by_upcoming};
use cumple_core::{CalendarDate, DatedRecord};
use proptest::prelude::*;

fn record(id: &str, days: Option<u32>) -> DatedRecord {
    let mut record = DatedRecord::new(id, id, CalendarDate::new(2020, 1, 1).unwrap());
    record.days_until_occurrence = days;
    record
}

fn ids(records: &[DatedRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn sorts_by_days_and_keeps_ties_in_input_order() {
    let input = vec![
        record("c", Some(10)),
        record("a", Some(3)),
        record("d", Some(10)),
        record("b", Some(3)),
    ];
    assert_eq!(ids(&sort_by_upcoming(&input)), vec!["a", "b", "c", "d"]);
    assert_eq!(ids(&input), vec!["c", "a", "d", "b"]);
}

#[test]
fn missing_days_sort_as_today() {
    let input = vec![record("later", Some(1)), record("unknown", None)];
    assert_eq!(ids(&sort_by_upcoming(&input)), vec!["unknown", "later"]);

    let (today, upcoming) = partition_today(&input);
    assert_eq!(ids(&today), vec!["unknown"]);
    assert_eq!(ids(&upcoming), vec!["later"]);
}

#[test]
fn partition_after_enrichment_splits_todays_birthdays() {
    let today = CalendarDate::new(2024, 10, 19).unwrap();
    let records = vec![
        DatedRecord::new("tomorrow", "T", CalendarDate::new(2019, 10, 20).unwrap()),
        DatedRecord::new("now", "N", CalendarDate::new(2018, 10, 19).unwrap()),
        DatedRecord::new("passed", "P", CalendarDate::new(2017, 10, 18).unwrap()),
    ];

    let (todays, upcoming) = partition_today(&enrich_all(&records, today));
    assert_eq!(ids(&todays), vec!["now"]);
    assert_eq!(ids(&upcoming), vec!["tomorrow", "passed"]);
    assert_eq!(upcoming[1].days_until_occurrence, Some(364));
}

#[test]
fn empty_input_yields_empty_output() {
    assert!(sort_by_upcoming(&[]).is_empty());
    let (today, upcoming) = partition_today(&[]);
    assert!(today.is_empty() && upcoming.is_empty());
}

proptest! {
    #[test]
    fn sort_is_stable(days in prop::collection::vec(prop::option::of(0u32..5), 0..40)) {
        let input: Vec<DatedRecord> = days
            .iter()
            .enumerate()
            .map(|(index, days)| record(&index.to_string(), *days))
            .collect();
        let sorted = sort_by_upcoming(&input);

        prop_assert_eq!(sorted.len(), input.len());
        for pair in sorted.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            let left_days = left.days_until_occurrence.unwrap_or(0);
            let right_days = right.days_until_occurrence.unwrap_or(0);
            prop_assert!(left_days <= right_days);
            if left_days == right_days {
                let left_index: usize = left.id.parse().unwrap();
                let right_index: usize = right.id.parse().unwrap();
                prop_assert!(left_index < right_index);
            }
        }
    }

    #[test]
    fn partition_neither_drops_nor_duplicates(days in prop::collection::vec(prop::option::of(0u32..3), 0..40)) {
        let input: Vec<DatedRecord> = days
            .iter()
            .enumerate()
            .map(|(index, days)| record(&index.to_string(), *days))
            .collect();
        let (today, upcoming) = partition_today(&input);

        prop_assert!(today.iter().all(|r| r.days_until_occurrence.unwrap_or(0) == 0));
        prop_assert!(upcoming.iter().all(|r| r.days_until_occurrence.unwrap_or(0) > 0));

        let mut seen: Vec<usize> = today
            .iter()
            .chain(upcoming.iter())
            .map(|r| r.id.parse().unwrap())
            .collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..input.len()).collect::<Vec<_>>());
    }
}
