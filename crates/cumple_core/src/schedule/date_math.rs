//! Yearly-anniversary date arithmetic.
//!
//! # Responsibility
//! - Compute ages and days until the next anniversary of a calendar date.
//! - Attach those derived values to records (enrichment).
//!
//! # Invariants
//! - All functions are pure; `today` is always passed in.
//! - `days_until_next_occurrence` returns a value in `0..=366`.
//! - A Feb 29 anchor lands on Mar 1 in non-leap years, for every function.

use crate::model::calendar_date::CalendarDate;
use crate::model::record::DatedRecord;
use chrono::NaiveDate;

/// Completed years between `birth_date` and `today`.
///
/// Negative when `birth_date` lies in the future.
pub fn age_as_of(birth_date: CalendarDate, today: CalendarDate) -> i32 {
    let age = today.year() - birth_date.year();
    if today.month_day() < anchor_month_day(birth_date, today.year()) {
        age - 1
    } else {
        age
    }
}

/// Age turned on the next anniversary, counting today as not yet passed.
pub fn upcoming_age(birth_date: CalendarDate, today: CalendarDate) -> i32 {
    let year = today.year();
    if anchor_month_day(birth_date, year) >= today.month_day() {
        year - birth_date.year()
    } else {
        year + 1 - birth_date.year()
    }
}

/// Calendar days from `today` until the next anniversary of `anchor`.
///
/// Returns `0` when the anniversary is today. Dates at the very edge of the
/// supported calendar range saturate to `0`.
pub fn days_until_next_occurrence(anchor: CalendarDate, today: CalendarDate) -> u32 {
    let today_naive = today.as_naive();
    let occurrence = match anniversary_in(anchor, today.year()) {
        Some(this_year) if this_year >= today_naive => this_year,
        _ => anniversary_in(anchor, today.year() + 1).unwrap_or(today_naive),
    };

    u32::try_from((occurrence - today_naive).num_days()).unwrap_or(0)
}

/// Next anniversary of `anchor` on or after `today`.
pub fn next_occurrence(anchor: CalendarDate, today: CalendarDate) -> CalendarDate {
    let days = days_until_next_occurrence(anchor, today);
    today
        .as_naive()
        .checked_add_days(chrono::Days::new(u64::from(days)))
        .map(CalendarDate::from_naive)
        .unwrap_or(today)
}

/// Returns a copy of `record` with `computed_age` and `days_until_occurrence`
/// derived for `today`.
///
/// `computed_age` is set only when a birth date is known.
pub fn enrich(record: &DatedRecord, today: CalendarDate) -> DatedRecord {
    let mut enriched = record.clone();
    enriched.computed_age = record
        .birth_date
        .map(|birth_date| upcoming_age(birth_date, today));
    enriched.days_until_occurrence =
        Some(days_until_next_occurrence(record.celebration_date, today));
    enriched
}

/// Enriches every record in input order.
pub fn enrich_all(records: &[DatedRecord], today: CalendarDate) -> Vec<DatedRecord> {
    records.iter().map(|record| enrich(record, today)).collect()
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// `(month, day)` the anchor falls on in `year`.
fn anchor_month_day(anchor: CalendarDate, year: i32) -> (u32, u32) {
    if anchor.is_leap_day() && !is_leap_year(year) {
        (3, 1)
    } else {
        anchor.month_day()
    }
}

fn anniversary_in(anchor: CalendarDate, year: i32) -> Option<NaiveDate> {
    let (month, day) = anchor_month_day(anchor, year);
    NaiveDate::from_ymd_opt(year, month, day)
}
