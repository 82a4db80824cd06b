//! School/class structure migration and identifier repair.
//!
//! # Responsibility
//! - Move flat birthday records under one default school and class.
//! - Repair stores whose schools and classes carry store-generated ids.
//! - Backfill missing container timestamps.
//!
//! # Invariants
//! - Default containers have deterministic slug ids and are reused when
//!   present, so a retried run never creates a second container.
//! - A completed migration is recorded under `meta/class-structure-migration`
//!   and is never re-entered.
//! - Records that already carry a `classId` are never rewritten by `run`.
//! - Store calls are issued one at a time; each completes before the next.
//! - Repair creates the replacement document, points every reference at it
//!   and deletes the old document last.

use crate::error::{CoreError, CoreResult};
use crate::ids::slug::{slugify, SlugNamespace};
use crate::model::directory::{now_timestamp, Class, School};
use crate::model::document::{Document, StoredDocument};
use crate::model::record::DatedRecord;
use crate::service::parse_documents;
use crate::store::{Collection, RecordStore};
use chrono::DateTime;
use log::{error, info, warn};
use serde_json::Value;
use std::collections::BTreeMap;

/// Id of the completion marker in [`Collection::Meta`].
pub const MIGRATION_MARKER_ID: &str = "class-structure-migration";

/// Field naming the id a repaired school or class replaces.
pub const REPAIRED_FROM_FIELD: &str = "repairedFrom";

/// Names and collections the structure migration works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    pub school_name: String,
    pub class_name: String,
    /// Collection holding the records to attach to the default class.
    pub records_collection: Collection,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            school_name: "Brains - Las Palmas".to_string(),
            class_name: "Superheroes - infantil".to_string(),
            records_collection: Collection::Birthdays,
        }
    }
}

impl MigrationConfig {
    pub fn school_id(&self) -> String {
        slugify(&self.school_name)
    }

    pub fn class_id(&self) -> String {
        slugify(&self.class_name)
    }
}

/// Runner lifecycle for one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    NotStarted,
    Migrating,
    Complete,
}

/// Old id to new id, per entity kind.
///
/// For `run`, `records` maps each rewritten record id to the class id it was
/// attached to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationMapping {
    pub schools: BTreeMap<String, String>,
    pub classes: BTreeMap<String, String>,
    pub records: BTreeMap<String, String>,
}

impl MigrationMapping {
    pub fn is_empty(&self) -> bool {
        self.schools.is_empty() && self.classes.is_empty() && self.records.is_empty()
    }
}

/// Result of one `run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub school_id: String,
    pub class_id: String,
    pub mapping: MigrationMapping,
    /// `true` when the completion marker was already present and nothing ran.
    pub already_complete: bool,
}

/// Whether any record still lacks the class reference.
pub fn needs_migration(records: &[DatedRecord]) -> bool {
    records.iter().any(DatedRecord::lacks_class)
}

/// One-shot structure migration plus repair passes over a record store.
pub struct MigrationRunner<S: RecordStore> {
    store: S,
    config: MigrationConfig,
    state: MigrationState,
}

impl<S: RecordStore> MigrationRunner<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, MigrationConfig::default())
    }

    pub fn with_config(store: S, config: MigrationConfig) -> Self {
        Self {
            store,
            config,
            state: MigrationState::NotStarted,
        }
    }

    pub fn state(&self) -> MigrationState {
        self.state
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Whether the store still has unmigrated records and no completion marker.
    pub fn check_needed(&self) -> CoreResult<bool> {
        if self.marker()?.is_some() {
            return Ok(false);
        }
        Ok(needs_migration(&self.load_records()?))
    }

    /// Loads every record of the configured collection and migrates it.
    pub fn run_from_store(&mut self) -> CoreResult<MigrationOutcome> {
        let records = self.load_records()?;
        self.run(&records)
    }

    /// Attaches every record lacking a class to the default class.
    ///
    /// # Contract
    /// - Returns a no-op outcome when the completion marker exists.
    /// - Default school and class are created only when absent.
    /// - On error the runner returns to `NotStarted`; completed writes stay,
    ///   and a retry only touches what is left.
    pub fn run(&mut self, records: &[DatedRecord]) -> CoreResult<MigrationOutcome> {
        if let Some(marker) = self.marker()? {
            self.state = MigrationState::Complete;
            info!("event=class_migration module=migration status=skipped reason=already_complete");
            return Ok(self.completed_outcome(&marker));
        }

        self.state = MigrationState::Migrating;
        info!(
            "event=class_migration module=migration status=start records={}",
            records.len()
        );

        match self.migrate(records) {
            Ok(outcome) => {
                self.state = MigrationState::Complete;
                info!(
                    "event=class_migration module=migration status=ok school_id={} class_id={} migrated={}",
                    outcome.school_id,
                    outcome.class_id,
                    outcome.mapping.records.len()
                );
                Ok(outcome)
            }
            Err(err) => {
                self.state = MigrationState::NotStarted;
                error!("event=class_migration module=migration status=error error={err}");
                Err(err)
            }
        }
    }

    fn migrate(&self, records: &[DatedRecord]) -> CoreResult<MigrationOutcome> {
        let school_id = self.ensure_school()?;
        let class_id = self.ensure_class(&school_id)?;

        let mut mapping = MigrationMapping::default();
        for record in records.iter().filter(|record| record.lacks_class()) {
            let mut patch = Document::new();
            patch.insert("classId".to_string(), Value::String(class_id.clone()));
            self.store
                .update(self.config.records_collection, &record.id, &patch)?;
            mapping.records.insert(record.id.clone(), class_id.clone());
        }

        let mut marker = Document::new();
        marker.insert("schoolId".to_string(), Value::String(school_id.clone()));
        marker.insert("classId".to_string(), Value::String(class_id.clone()));
        marker.insert(
            "migratedRecords".to_string(),
            Value::from(mapping.records.len()),
        );
        marker.insert("completedAt".to_string(), Value::String(now_timestamp()));
        self.store
            .create_with_id(Collection::Meta, MIGRATION_MARKER_ID, &marker)?;

        Ok(MigrationOutcome {
            school_id,
            class_id,
            mapping,
            already_complete: false,
        })
    }

    fn ensure_school(&self) -> CoreResult<String> {
        let id = non_empty_slug(&self.config.school_name)?;
        if self.store.get(Collection::Schools, &id)?.is_some() {
            info!("event=default_school module=migration status=reused id={id}");
            return Ok(id);
        }

        let now = now_timestamp();
        let school = School {
            id: id.clone(),
            name: self.config.school_name.clone(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.store
            .create_with_id(Collection::Schools, &id, &school.to_document()?)?;
        info!("event=default_school module=migration status=created id={id}");
        Ok(id)
    }

    fn ensure_class(&self, school_id: &str) -> CoreResult<String> {
        let id = non_empty_slug(&self.config.class_name)?;
        if let Some(existing) = self.store.get(Collection::Classes, &id)? {
            if existing.str_field("schoolId") != Some(school_id) {
                warn!(
                    "event=default_class module=migration status=reused id={id} note=foreign_school"
                );
            } else {
                info!("event=default_class module=migration status=reused id={id}");
            }
            return Ok(id);
        }

        let now = now_timestamp();
        let class = Class {
            id: id.clone(),
            name: self.config.class_name.clone(),
            school_id: school_id.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.store
            .create_with_id(Collection::Classes, &id, &class.to_document()?)?;
        info!("event=default_class module=migration status=created id={id}");
        Ok(id)
    }

    fn marker(&self) -> CoreResult<Option<StoredDocument>> {
        Ok(self.store.get(Collection::Meta, MIGRATION_MARKER_ID)?)
    }

    fn completed_outcome(&self, marker: &StoredDocument) -> MigrationOutcome {
        MigrationOutcome {
            school_id: marker
                .str_field("schoolId")
                .map_or_else(|| self.config.school_id(), str::to_string),
            class_id: marker
                .str_field("classId")
                .map_or_else(|| self.config.class_id(), str::to_string),
            mapping: MigrationMapping::default(),
            already_complete: true,
        }
    }

    fn load_records(&self) -> CoreResult<Vec<DatedRecord>> {
        let documents = self.store.query_all(self.config.records_collection)?;
        Ok(parse_documents(
            "migration",
            &documents,
            DatedRecord::from_document,
        ))
    }

    /// Moves schools and classes with store-generated ids to slug ids.
    ///
    /// Every id already in use is reserved up front, so a derived slug never
    /// lands on an existing document. Each move creates the replacement,
    /// points every reference at it (classes' `schoolId`, records'
    /// `classId`) and deletes the old document last.
    ///
    /// # Contract
    /// - Documents whose id already is a slug of their name stay in place.
    /// - Replacements carry `repairedFrom` with the id they replace. A retry
    ///   after a failed call adopts that replacement and finishes the move.
    pub fn repair_identifiers(&self) -> CoreResult<MigrationMapping> {
        info!("event=id_repair module=migration status=start");
        let mut mapping = MigrationMapping::default();

        let school_docs = self.store.query_all(Collection::Schools)?;
        let schools = parse_documents("migration", &school_docs, School::from_document);
        let mut namespace = SlugNamespace::from_ids(schools.iter().map(|s| s.id.clone()));

        for school in schools.iter().filter(|s| !is_slug_of(&s.id, &s.name)) {
            let new_id = match self.replacement_of(Collection::Schools, &school.id)? {
                Some(id) => id,
                None => {
                    let moved = School {
                        id: namespace.claim(&school.name),
                        updated_at: now_timestamp(),
                        ..school.clone()
                    };
                    self.create_replacement(
                        Collection::Schools,
                        &moved.id,
                        moved.to_document()?,
                        &school.id,
                    )?;
                    moved.id
                }
            };
            self.move_classes(&school.id, &new_id)?;
            self.store.delete(Collection::Schools, &school.id)?;
            info!(
                "event=id_repair module=migration status=moved collection=schools from={} to={new_id}",
                school.id
            );
            mapping.schools.insert(school.id.clone(), new_id);
        }

        let class_docs = self.store.query_all(Collection::Classes)?;
        let classes = parse_documents("migration", &class_docs, Class::from_document);
        let mut namespace = SlugNamespace::from_ids(classes.iter().map(|c| c.id.clone()));

        for class in classes.iter().filter(|c| !is_slug_of(&c.id, &c.name)) {
            let new_id = match self.replacement_of(Collection::Classes, &class.id)? {
                Some(id) => id,
                None => {
                    let moved = Class {
                        id: namespace.claim(&class.name),
                        updated_at: now_timestamp(),
                        ..class.clone()
                    };
                    self.create_replacement(
                        Collection::Classes,
                        &moved.id,
                        moved.to_document()?,
                        &class.id,
                    )?;
                    moved.id
                }
            };
            self.move_records(&class.id, &new_id, &mut mapping)?;
            self.store.delete(Collection::Classes, &class.id)?;
            info!(
                "event=id_repair module=migration status=moved collection=classes from={} to={new_id}",
                class.id
            );
            mapping.classes.insert(class.id.clone(), new_id);
        }

        info!(
            "event=id_repair module=migration status=ok schools={} classes={} records={}",
            mapping.schools.len(),
            mapping.classes.len(),
            mapping.records.len()
        );
        Ok(mapping)
    }

    /// Id of a replacement an earlier repair created for `old_id`.
    fn replacement_of(&self, collection: Collection, old_id: &str) -> CoreResult<Option<String>> {
        let found = self.store.query_by_field(
            collection,
            REPAIRED_FROM_FIELD,
            &Value::String(old_id.to_string()),
        )?;
        Ok(found.into_iter().next().map(|doc| doc.id))
    }

    fn create_replacement(
        &self,
        collection: Collection,
        id: &str,
        mut data: Document,
        old_id: &str,
    ) -> CoreResult<()> {
        data.insert(
            REPAIRED_FROM_FIELD.to_string(),
            Value::String(old_id.to_string()),
        );
        self.store.create_with_id(collection, id, &data)?;
        Ok(())
    }

    /// Points every class of `old_school_id` at `new_school_id`.
    fn move_classes(&self, old_school_id: &str, new_school_id: &str) -> CoreResult<()> {
        let classes = self.store.query_by_field(
            Collection::Classes,
            "schoolId",
            &Value::String(old_school_id.to_string()),
        )?;
        for class in classes {
            let mut patch = Document::new();
            patch.insert(
                "schoolId".to_string(),
                Value::String(new_school_id.to_string()),
            );
            patch.insert("updatedAt".to_string(), Value::String(now_timestamp()));
            self.store.update(Collection::Classes, &class.id, &patch)?;
        }
        Ok(())
    }

    fn move_records(
        &self,
        old_class_id: &str,
        new_class_id: &str,
        mapping: &mut MigrationMapping,
    ) -> CoreResult<()> {
        let collection = self.config.records_collection;
        let records = self.store.query_by_field(
            collection,
            "classId",
            &Value::String(old_class_id.to_string()),
        )?;
        for record in records {
            let mut patch = Document::new();
            patch.insert(
                "classId".to_string(),
                Value::String(new_class_id.to_string()),
            );
            self.store.update(collection, &record.id, &patch)?;
            mapping
                .records
                .insert(record.id, new_class_id.to_string());
        }
        Ok(())
    }

    /// Fills missing or unparsable `createdAt`/`updatedAt` on schools and
    /// classes with the current instant. Returns how many documents changed.
    pub fn repair_timestamps(&self) -> CoreResult<usize> {
        let mut repaired = 0;
        for collection in [Collection::Schools, Collection::Classes] {
            for doc in self.store.query_all(collection)? {
                let now = now_timestamp();
                let mut patch = Document::new();
                for field in ["createdAt", "updatedAt"] {
                    if !is_timestamp(doc.str_field(field)) {
                        patch.insert(field.to_string(), Value::String(now.clone()));
                    }
                }
                if patch.is_empty() {
                    continue;
                }
                self.store.update(collection, &doc.id, &patch)?;
                repaired += 1;
            }
        }

        info!("event=timestamp_repair module=migration status=ok repaired={repaired}");
        Ok(repaired)
    }
}

fn non_empty_slug(name: &str) -> CoreResult<String> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(CoreError::Validation(format!(
            "container name `{name}` has no characters usable in an id"
        )));
    }
    Ok(slug)
}

/// Whether `id` is the slug of `name`, optionally with a numeric suffix.
fn is_slug_of(id: &str, name: &str) -> bool {
    let base = slugify(name);
    if base.is_empty() {
        return false;
    }
    if id == base {
        return true;
    }
    id.strip_prefix(base.as_str())
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
}

fn is_timestamp(value: Option<&str>) -> bool {
    value.is_some_and(|text| DateTime::parse_from_rfc3339(text).is_ok())
}
