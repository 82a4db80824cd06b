//! Untyped store document boundary.
//!
//! # Responsibility
//! - Name the raw JSON document shape exchanged with record stores.
//! - Provide the parse-or-reject error used when typing raw documents.
//!
//! # Invariants
//! - A document body never carries its own id; the id travels next to it.
//! - Raw documents are typed before reaching date math or ordering.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// JSON object body of one stored document.
pub type Document = Map<String, Value>;

/// One document together with its store id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Document,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, data: Document) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Returns a string field, treating empty strings as absent.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.data
            .get(field)
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

/// Rejection reason for a raw document that cannot be typed.
#[derive(Debug)]
pub enum DocumentError {
    /// Required field is absent or empty.
    MissingField { id: String, field: &'static str },
    /// Field is present but has an unusable value.
    InvalidField {
        id: String,
        field: &'static str,
        message: String,
    },
    /// Body does not match the expected shape at all.
    Shape { id: String, source: serde_json::Error },
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { id, field } => {
                write!(f, "document `{id}` is missing required field `{field}`")
            }
            Self::InvalidField { id, field, message } => {
                write!(f, "document `{id}` has invalid `{field}`: {message}")
            }
            Self::Shape { id, source } => write!(f, "document `{id}` has invalid shape: {source}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Shape { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Deserializes a document body into a raw intermediate shape.
pub(crate) fn decode_body<T: DeserializeOwned>(doc: &StoredDocument) -> Result<T, DocumentError> {
    serde_json::from_value(Value::Object(doc.data.clone())).map_err(|source| DocumentError::Shape {
        id: doc.id.clone(),
        source,
    })
}

/// Serializes a typed value and drops the listed keys from the body.
pub(crate) fn encode_body<T: Serialize>(
    value: &T,
    excluded: &[&str],
) -> Result<Document, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            for key in excluded {
                map.remove(*key);
            }
            Ok(map)
        }
        other => Err(serde::ser::Error::custom(format!(
            "expected object body, got {other}"
        ))),
    }
}

/// Treats `None` and blank strings alike.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
