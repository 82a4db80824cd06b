//! School, class and group containers.
//!
//! # Responsibility
//! - Define the parent containers that dated records are scoped to.
//! - Type raw store documents into containers.
//!
//! # Invariants
//! - Container ids are slugs unique within their namespace.
//! - `Group::members` always contains the owner after creation.

use crate::model::document::{
    decode_body, encode_body, non_blank, Document, DocumentError, StoredDocument,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Current instant as an RFC 3339 UTC string with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Top-level container for classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Class within one school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    pub school_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Shareable group joined through a trust code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Owner user id.
    pub user_id: String,
    pub trust_code: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl School {
    pub fn from_document(doc: &StoredDocument) -> Result<Self, DocumentError> {
        let mut school: Self = decode_with_id(doc)?;
        school.name = require_name(doc, school.name)?;
        Ok(school)
    }

    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        encode_body(self, &["id"])
    }
}

impl Class {
    pub fn from_document(doc: &StoredDocument) -> Result<Self, DocumentError> {
        let mut class: Self = decode_with_id(doc)?;
        class.name = require_name(doc, class.name)?;
        class.school_id =
            non_blank(Some(class.school_id)).ok_or_else(|| DocumentError::MissingField {
                id: doc.id.clone(),
                field: "schoolId",
            })?;
        Ok(class)
    }

    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        encode_body(self, &["id"])
    }
}

impl Group {
    pub fn from_document(doc: &StoredDocument) -> Result<Self, DocumentError> {
        let mut group: Self = decode_with_id(doc)?;
        group.name = require_name(doc, group.name)?;
        Ok(group)
    }

    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        encode_body(self, &["id"])
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|member| member == user_id)
    }
}

/// Decodes a body after injecting the store id, so `id` is never read from
/// the body itself.
fn decode_with_id<T: serde::de::DeserializeOwned>(
    doc: &StoredDocument,
) -> Result<T, DocumentError> {
    let mut with_id = doc.clone();
    with_id
        .data
        .insert("id".to_string(), serde_json::Value::String(doc.id.clone()));
    decode_body(&with_id)
}

fn require_name(doc: &StoredDocument, name: String) -> Result<String, DocumentError> {
    non_blank(Some(name)).ok_or_else(|| DocumentError::MissingField {
        id: doc.id.clone(),
        field: "name",
    })
}

#[cfg(test)]
mod tests {
    use super::{Class, Group, School};
    use crate::model::document::{DocumentError, StoredDocument};
    use serde_json::json;

    fn doc(id: &str, body: serde_json::Value) -> StoredDocument {
        match body {
            serde_json::Value::Object(map) => StoredDocument::new(id, map),
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn school_tolerates_missing_timestamps() {
        let school = School::from_document(&doc("Xk2p9", json!({ "name": "Brains" }))).unwrap();
        assert_eq!(school.id, "Xk2p9");
        assert!(school.created_at.is_empty());
    }

    #[test]
    fn class_requires_school_reference() {
        let err = Class::from_document(&doc("c1", json!({ "name": "Patos", "schoolId": " " })))
            .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::MissingField {
                field: "schoolId",
                ..
            }
        ));
    }

    #[test]
    fn group_round_trips_through_document_body() {
        let group = Group::from_document(&doc(
            "familia",
            json!({
                "name": "Familia",
                "categories": ["family"],
                "userId": "u1",
                "trustCode": "ABC123",
                "members": ["u1", "u2"],
                "createdAt": "2025-01-01T00:00:00.000Z",
                "updatedAt": "2025-01-01T00:00:00.000Z"
            }),
        ))
        .unwrap();

        assert!(group.is_owner("u1"));
        assert!(group.is_member("u2"));
        assert!(!group.is_member("u3"));

        let body = group.to_document().unwrap();
        assert!(!body.contains_key("id"));
        assert_eq!(body["trustCode"], "ABC123");
    }
}
