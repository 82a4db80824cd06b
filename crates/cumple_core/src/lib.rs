//! Core domain logic for the birthday and event tracker.
//! This crate is the single source of truth for date math, id generation
//! and the school/class structure migration.

pub mod db;
pub mod error;
pub mod ids;
pub mod logging;
pub mod model;
pub mod schedule;
pub mod service;
pub mod store;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use ids::slug::{is_valid_slug, slugify, unique_slug, SlugNamespace};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::calendar_date::{CalendarDate, DateError};
pub use model::directory::{Class, Group, School};
pub use model::document::{Document, DocumentError, StoredDocument};
pub use model::record::DatedRecord;
pub use service::directory_service::DirectoryService;
pub use service::event_service::{EventDraft, EventService, UpcomingView};
pub use service::group_service::{GroupDraft, GroupService};
pub use service::migration::{
    needs_migration, MigrationConfig, MigrationMapping, MigrationOutcome, MigrationRunner,
    MigrationState,
};
pub use store::{Collection, RecordStore, SqliteRecordStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
