//! Recurrence math and ordering for dated records.
//!
//! # Responsibility
//! - Derive ages and days-until-anniversary from stored dates.
//! - Order enriched records by soonest occurrence.
//!
//! # Invariants
//! - Nothing in this module touches storage or the system clock.

pub mod date_math;
pub mod ordering;
