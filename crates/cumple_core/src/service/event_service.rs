//! Event and birthday use-case service.
//!
//! # Responsibility
//! - Persist dated records owned by a user and attached to a group or class.
//! - Build "upcoming" views: parse, enrich for a given day, then order.
//!
//! # Invariants
//! - Record ids are store-generated.
//! - Views never fail on one corrupt document; it is logged and skipped.
//! - `today` is always supplied by the caller.

use crate::error::{CoreError, CoreResult};
use crate::model::calendar_date::CalendarDate;
use crate::model::document::Document;
use crate::model::record::DatedRecord;
use crate::schedule::date_math::enrich_all;
use crate::schedule::ordering::{partition_today, sort_by_upcoming};
use crate::service::parse_documents;
use crate::store::{Collection, RecordStore};
use log::info;
use serde_json::Value;

/// User input for creating or editing an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub birth_date: Option<CalendarDate>,
    pub celebration_date: CalendarDate,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub group_id: String,
    pub categories: Vec<String>,
}

impl EventDraft {
    pub fn new(
        name: impl Into<String>,
        celebration_date: CalendarDate,
        group_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            birth_date: None,
            celebration_date,
            location: None,
            attendees: Vec::new(),
            group_id: group_id.into(),
            categories: Vec::new(),
        }
    }

    fn to_document(&self, user_id: Option<&str>) -> CoreResult<Document> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("event name is empty".to_string()));
        }

        let mut record = DatedRecord::new("", name, self.celebration_date);
        record.birth_date = self.birth_date;
        record.location = self.location.clone();
        record.attendees = self.attendees.clone();
        record.group_id = Some(self.group_id.clone());
        record.categories = self.categories.clone();
        record.user_id = user_id.map(str::to_string);
        Ok(record.to_document()?)
    }
}

/// Upcoming view split around today.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpcomingView {
    /// Records whose anniversary is today.
    pub today: Vec<DatedRecord>,
    /// Every other record, soonest first.
    pub upcoming: Vec<DatedRecord>,
}

/// Use-case service over one dated-record collection.
pub struct EventService<S: RecordStore> {
    store: S,
    collection: Collection,
}

impl<S: RecordStore> EventService<S> {
    /// Service over the `events` collection.
    pub fn new(store: S) -> Self {
        Self::for_collection(store, Collection::Events)
    }

    /// Service over another dated-record collection, e.g. `birthdays`.
    pub fn for_collection(store: S, collection: Collection) -> Self {
        Self { store, collection }
    }

    /// Stores a new event owned by `user_id` and returns its generated id.
    pub fn add_event(&self, draft: &EventDraft, user_id: &str) -> CoreResult<String> {
        let body = draft.to_document(Some(user_id))?;
        let id = self.store.create(self.collection, &body)?;
        info!(
            "event=record_create module=events status=ok collection={} id={id}",
            self.collection
        );
        Ok(id)
    }

    /// Overwrites the editable fields of an event. Ownership is kept.
    pub fn update_event(&self, id: &str, draft: &EventDraft) -> CoreResult<()> {
        let mut patch = draft.to_document(None)?;
        // Cleared optional fields must be cleared in the store too.
        for key in ["birthDate", "location"] {
            patch.entry(key.to_string()).or_insert(Value::Null);
        }
        self.store.update(self.collection, id, &patch)?;
        Ok(())
    }

    pub fn delete_event(&self, id: &str) -> CoreResult<()> {
        self.store.delete(self.collection, id)?;
        info!(
            "event=record_delete module=events status=ok collection={} id={id}",
            self.collection
        );
        Ok(())
    }

    /// Loads one record.
    ///
    /// # Errors
    /// - `NotFound` when absent, `Validation` when the stored body is invalid.
    pub fn get_event(&self, id: &str) -> CoreResult<DatedRecord> {
        let doc = self
            .store
            .get(self.collection, id)?
            .ok_or_else(|| CoreError::NotFound(format!("{}/{id}", self.collection)))?;
        Ok(DatedRecord::from_document(&doc)?)
    }

    /// Every parsable record of the collection, in store order.
    pub fn all_records(&self) -> CoreResult<Vec<DatedRecord>> {
        let documents = self.store.query_all(self.collection)?;
        Ok(parse_documents(
            "events",
            &documents,
            DatedRecord::from_document,
        ))
    }

    /// Events `user_id` created in `group_id`, ordered by soonest anniversary.
    pub fn upcoming_for_group(
        &self,
        group_id: &str,
        user_id: &str,
        today: CalendarDate,
    ) -> CoreResult<Vec<DatedRecord>> {
        let records: Vec<DatedRecord> = self
            .records_where("groupId", group_id)?
            .into_iter()
            .filter(|record| record.user_id.as_deref() == Some(user_id))
            .collect();
        Ok(sort_by_upcoming(&enrich_all(&records, today)))
    }

    /// Records of one class, split into today's and the upcoming ones.
    pub fn upcoming_for_class(
        &self,
        class_id: &str,
        today: CalendarDate,
    ) -> CoreResult<UpcomingView> {
        let records = self.records_where("classId", class_id)?;
        Ok(split_today(&records, today))
    }

    /// Every record of the collection, split into today's and the upcoming ones.
    pub fn upcoming(&self, today: CalendarDate) -> CoreResult<UpcomingView> {
        Ok(split_today(&self.all_records()?, today))
    }

    fn records_where(&self, field: &str, value: &str) -> CoreResult<Vec<DatedRecord>> {
        let documents =
            self.store
                .query_by_field(self.collection, field, &Value::String(value.to_string()))?;
        Ok(parse_documents(
            "events",
            &documents,
            DatedRecord::from_document,
        ))
    }
}

fn split_today(records: &[DatedRecord], today: CalendarDate) -> UpcomingView {
    let (today, upcoming) = partition_today(&enrich_all(records, today));
    UpcomingView { today, upcoming }
}
