//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record-store calls into use-case level APIs.
//! - Keep callers decoupled from the store implementation.
//!
//! # Invariants
//! - Store calls inside one operation are issued strictly one after another.
//! - Raw documents are typed before they leave a service.

use crate::error::{CoreError, CoreResult};
use crate::ids::slug::slugify;
use crate::model::document::{DocumentError, StoredDocument};
use log::warn;
use std::cmp::Ordering;

pub mod directory_service;
pub mod event_service;
pub mod group_service;
pub mod migration;

/// Types every document, dropping (and logging) the ones that fail.
///
/// Used for list views, where one corrupt document must not hide the rest.
pub(crate) fn parse_documents<T>(
    module: &'static str,
    documents: &[StoredDocument],
    parse: impl Fn(&StoredDocument) -> Result<T, DocumentError>,
) -> Vec<T> {
    documents
        .iter()
        .filter_map(|doc| match parse(doc) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    "event=document_rejected module={module} status=error id={} error={err}",
                    doc.id
                );
                None
            }
        })
        .collect()
}

/// Case-insensitive name order with id as tie-break.
pub(crate) fn by_name(a_name: &str, a_id: &str, b_name: &str, b_id: &str) -> Ordering {
    a_name
        .to_lowercase()
        .cmp(&b_name.to_lowercase())
        .then_with(|| a_id.cmp(b_id))
}

/// Rejects names that would produce an empty slug.
pub(crate) fn require_sluggable(name: &str) -> CoreResult<String> {
    let trimmed = name.trim();
    if slugify(trimmed).is_empty() {
        return Err(CoreError::Validation(format!(
            "name `{trimmed}` has no characters usable in an id"
        )));
    }
    Ok(trimmed.to_string())
}
