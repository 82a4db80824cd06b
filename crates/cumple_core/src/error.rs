//! Use-case error classification.
//!
//! # Responsibility
//! - Give callers one stable error type with a coarse `ErrorKind`.
//! - Fold store and document failures into that classification.
//!
//! # Invariants
//! - Pure components never produce `ErrorKind::Upstream`.
//! - Store `NotFound`/`Conflict` keep their kind; every other store failure
//!   is `Upstream`.

use crate::model::calendar_date::DateError;
use crate::model::document::DocumentError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CoreResult<T> = Result<T, CoreError>;

/// Stable classification presented to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Forbidden,
    Upstream,
}

#[derive(Debug)]
pub enum CoreError {
    /// Malformed input: trust code, empty slug, invalid date or document.
    Validation(String),
    /// Referenced entity is absent.
    NotFound(String),
    /// Entity already exists or the operation is already satisfied.
    Conflict(String),
    /// Caller is not allowed to perform the operation.
    Forbidden(String),
    /// Record store call failed.
    Upstream(StoreError),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Upstream(_) => ErrorKind::Upstream,
        }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::NotFound(message) => write!(f, "not found: {message}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Forbidden(message) => write!(f, "forbidden: {message}"),
            Self::Upstream(err) => write!(f, "store call failed: {err}"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Upstream(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { collection, id } => Self::NotFound(format!("{collection}/{id}")),
            StoreError::Conflict { collection, id } => {
                Self::Conflict(format!("{collection}/{id} already exists"))
            }
            other => Self::Upstream(other),
        }
    }
}

impl From<DocumentError> for CoreError {
    fn from(value: DocumentError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<DateError> for CoreError {
    fn from(value: DateError) -> Self {
        Self::Validation(value.to_string())
    }
}

// Only raised while encoding a typed value into a store body.
impl From<serde_json::Error> for CoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Upstream(StoreError::Serialization(value))
    }
}
