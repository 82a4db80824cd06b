//! Record store contract and bundled implementation.
//!
//! # Responsibility
//! - Define the document-store collaborator that services and migrations use.
//! - Isolate persistence details from use-case orchestration.
//!
//! # Invariants
//! - Caller-supplied ids are never silently replaced or overwritten.
//! - `update` of a missing id is `NotFound`; `delete` of a missing id is a no-op.
//! - Each call completes (and is durable) before it returns.

use crate::db::DbError;
use crate::model::document::{Document, StoredDocument};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite_store;

pub use sqlite_store::SqliteRecordStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Named document collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Schools,
    Classes,
    Groups,
    Events,
    Birthdays,
    /// Bookkeeping documents such as migration markers.
    Meta,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Schools => "schools",
            Self::Classes => "classes",
            Self::Groups => "groups",
            Self::Events => "events",
            Self::Birthdays => "birthdays",
            Self::Meta => "meta",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store-level failure.
#[derive(Debug)]
pub enum StoreError {
    NotFound { collection: Collection, id: String },
    /// Create with an id that is already taken.
    Conflict { collection: Collection, id: String },
    /// Persisted bytes are not a JSON object, or the input is unusable.
    InvalidData(String),
    Serialization(serde_json::Error),
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { collection, id } => write!(f, "{collection}/{id} not found"),
            Self::Conflict { collection, id } => write!(f, "{collection}/{id} already exists"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialization(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Document store used by services and migrations.
///
/// Documents are JSON objects; the id is kept beside the body.
pub trait RecordStore {
    /// Creates a document under a caller-chosen id (slug collections).
    ///
    /// Fails with `Conflict` when the id is taken.
    fn create_with_id(&self, collection: Collection, id: &str, data: &Document)
        -> StoreResult<()>;

    /// Creates a document under a store-generated id and returns it.
    fn create(&self, collection: Collection, data: &Document) -> StoreResult<String>;

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<StoredDocument>>;

    /// Shallow-merges `patch` into an existing document.
    fn update(&self, collection: Collection, id: &str, patch: &Document) -> StoreResult<()>;

    /// Removes a document; absent ids are ignored.
    fn delete(&self, collection: Collection, id: &str) -> StoreResult<()>;

    /// Documents whose top-level `field` equals `value`, in creation order.
    fn query_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<StoredDocument>>;

    /// Every document of a collection, in creation order.
    fn query_all(&self, collection: Collection) -> StoreResult<Vec<StoredDocument>>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn create_with_id(
        &self,
        collection: Collection,
        id: &str,
        data: &Document,
    ) -> StoreResult<()> {
        (**self).create_with_id(collection, id, data)
    }

    fn create(&self, collection: Collection, data: &Document) -> StoreResult<String> {
        (**self).create(collection, data)
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<StoredDocument>> {
        (**self).get(collection, id)
    }

    fn update(&self, collection: Collection, id: &str, patch: &Document) -> StoreResult<()> {
        (**self).update(collection, id, patch)
    }

    fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        (**self).delete(collection, id)
    }

    fn query_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<StoredDocument>> {
        (**self).query_by_field(collection, field, value)
    }

    fn query_all(&self, collection: Collection) -> StoreResult<Vec<StoredDocument>> {
        (**self).query_all(collection)
    }
}
