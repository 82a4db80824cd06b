//! Domain model for dated records and their containers.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own the parse-or-reject boundary between raw store documents and typed
//!   records.
//!
//! # Invariants
//! - Dates are local-calendar dates; no time zone is ever attached.
//! - Persisted field names are camelCase and stable across releases.

pub mod calendar_date;
pub mod directory;
pub mod document;
pub mod record;
