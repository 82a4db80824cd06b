//! Dated record domain model.
//!
//! # Responsibility
//! - Define the birthday/event record consumed by date math and ordering.
//! - Type raw store documents into records, rejecting malformed ones.
//!
//! # Invariants
//! - `celebration_date` is always a valid calendar date.
//! - `birth_date`, when present, only drives the age calculation.
//! - Computed fields are never persisted.

use crate::model::calendar_date::CalendarDate;
use crate::model::document::{
    decode_body, encode_body, non_blank, Document, DocumentError, StoredDocument,
};
use serde::{Deserialize, Serialize};

/// Keys that belong to the record identity or enrichment, not the stored body.
const NON_PERSISTED_KEYS: &[&str] = &["id", "computedAge", "daysUntilOccurrence"];

/// Birthday or event with a yearly anniversary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatedRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<CalendarDate>,
    /// Authoritative anniversary date for recurrence math.
    pub celebration_date: CalendarDate,
    /// Class reference introduced by the school/class schema generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Age turned on the next anniversary. Set by enrichment only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_age: Option<i32>,
    /// Days until the next anniversary. Set by enrichment only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_occurrence: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    name: Option<String>,
    birth_date: Option<String>,
    celebration_date: Option<String>,
    class_id: Option<String>,
    group_id: Option<String>,
    user_id: Option<String>,
    location: Option<String>,
    #[serde(default)]
    attendees: Vec<String>,
    #[serde(default)]
    categories: Vec<String>,
}

impl DatedRecord {
    /// Creates a record with only the required fields populated.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        celebration_date: CalendarDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            birth_date: None,
            celebration_date,
            class_id: None,
            group_id: None,
            user_id: None,
            location: None,
            attendees: Vec::new(),
            categories: Vec::new(),
            computed_age: None,
            days_until_occurrence: None,
        }
    }

    /// Builder-style helper for the optional birth date.
    pub fn with_birth_date(mut self, birth_date: CalendarDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    /// Builder-style helper for the class reference.
    pub fn with_class_id(mut self, class_id: impl Into<String>) -> Self {
        self.class_id = Some(class_id.into());
        self
    }

    /// Whether the record still lacks the class reference.
    pub fn lacks_class(&self) -> bool {
        self.class_id
            .as_deref()
            .map_or(true, |value| value.trim().is_empty())
    }

    /// Types one raw store document.
    ///
    /// Legacy birthday documents without `celebrationDate` use `birthDate`
    /// as their anniversary.
    ///
    /// # Errors
    /// - `MissingField` when `name` or both dates are absent.
    /// - `InvalidField` when a date string is not a valid calendar date.
    pub fn from_document(doc: &StoredDocument) -> Result<Self, DocumentError> {
        let raw: RawRecord = decode_body(doc)?;

        let name = non_blank(raw.name).ok_or_else(|| DocumentError::MissingField {
            id: doc.id.clone(),
            field: "name",
        })?;
        let birth_date = parse_optional_date(doc, "birthDate", raw.birth_date)?;
        let celebration_date =
            match parse_optional_date(doc, "celebrationDate", raw.celebration_date)? {
                Some(date) => date,
                None => birth_date.ok_or_else(|| DocumentError::MissingField {
                    id: doc.id.clone(),
                    field: "celebrationDate",
                })?,
            };

        Ok(Self {
            id: doc.id.clone(),
            name,
            birth_date,
            celebration_date,
            class_id: non_blank(raw.class_id),
            group_id: non_blank(raw.group_id),
            user_id: non_blank(raw.user_id),
            location: non_blank(raw.location),
            attendees: raw.attendees,
            categories: raw.categories,
            computed_age: None,
            days_until_occurrence: None,
        })
    }

    /// Store body for this record, without id and computed fields.
    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        encode_body(self, NON_PERSISTED_KEYS)
    }
}

fn parse_optional_date(
    doc: &StoredDocument,
    field: &'static str,
    value: Option<String>,
) -> Result<Option<CalendarDate>, DocumentError> {
    match non_blank(value) {
        None => Ok(None),
        Some(text) => CalendarDate::parse(&text)
            .map(Some)
            .map_err(|err| DocumentError::InvalidField {
                id: doc.id.clone(),
                field,
                message: err.to_string(),
            }),
    }
}
