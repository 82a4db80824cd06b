//! School and class use-case service.
//!
//! # Responsibility
//! - Create, rename, delete and list schools and their classes.
//! - Assign slug ids unique within the right namespace.
//!
//! # Invariants
//! - School ids are unique among all schools.
//! - Class ids are unique across all classes, whatever their school.
//! - A class is only created under an existing school.

use crate::error::{CoreError, CoreResult};
use crate::ids::slug::unique_slug;
use crate::model::directory::{now_timestamp, Class, School};
use crate::model::document::Document;
use crate::service::{by_name, parse_documents, require_sluggable};
use crate::store::{Collection, RecordStore};
use log::info;
use serde_json::Value;

/// Use-case service for the school/class hierarchy.
pub struct DirectoryService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> DirectoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a school and returns its slug id.
    ///
    /// # Errors
    /// - `Validation` when the name has no slug-eligible characters.
    pub fn add_school(&self, name: &str) -> CoreResult<String> {
        let name = require_sluggable(name)?;
        let existing = self.school_ids()?;
        let id = unique_slug(&name, &existing);

        let now = now_timestamp();
        let school = School {
            id: id.clone(),
            name,
            created_at: now.clone(),
            updated_at: now,
        };
        self.store
            .create_with_id(Collection::Schools, &id, &school.to_document()?)?;

        info!("event=school_create module=directory status=ok id={id}");
        Ok(id)
    }

    /// Creates a class under `school_id` and returns its slug id.
    ///
    /// # Errors
    /// - `Validation` when the name has no slug-eligible characters.
    /// - `NotFound` when the school does not exist.
    pub fn add_class(&self, name: &str, school_id: &str) -> CoreResult<String> {
        let name = require_sluggable(name)?;
        if self.store.get(Collection::Schools, school_id)?.is_none() {
            return Err(CoreError::NotFound(format!("school `{school_id}`")));
        }

        let existing = self.class_ids()?;
        let id = unique_slug(&name, &existing);

        let now = now_timestamp();
        let class = Class {
            id: id.clone(),
            name,
            school_id: school_id.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.store
            .create_with_id(Collection::Classes, &id, &class.to_document()?)?;

        info!("event=class_create module=directory status=ok id={id} school_id={school_id}");
        Ok(id)
    }

    /// Renames a school. The id stays the same.
    pub fn rename_school(&self, id: &str, name: &str) -> CoreResult<()> {
        let name = require_sluggable(name)?;
        self.store
            .update(Collection::Schools, id, &rename_patch(name))?;
        Ok(())
    }

    /// Renames a class. The id stays the same.
    pub fn rename_class(&self, id: &str, name: &str) -> CoreResult<()> {
        let name = require_sluggable(name)?;
        self.store
            .update(Collection::Classes, id, &rename_patch(name))?;
        Ok(())
    }

    pub fn delete_school(&self, id: &str) -> CoreResult<()> {
        self.store.delete(Collection::Schools, id)?;
        info!("event=school_delete module=directory status=ok id={id}");
        Ok(())
    }

    pub fn delete_class(&self, id: &str) -> CoreResult<()> {
        self.store.delete(Collection::Classes, id)?;
        info!("event=class_delete module=directory status=ok id={id}");
        Ok(())
    }

    /// Every school, ordered by name.
    pub fn list_schools(&self) -> CoreResult<Vec<School>> {
        let documents = self.store.query_all(Collection::Schools)?;
        let mut schools = parse_documents("directory", &documents, School::from_document);
        schools.sort_by(|a, b| by_name(&a.name, &a.id, &b.name, &b.id));
        Ok(schools)
    }

    /// Classes of one school, ordered by name.
    pub fn list_classes(&self, school_id: &str) -> CoreResult<Vec<Class>> {
        let documents = self.store.query_by_field(
            Collection::Classes,
            "schoolId",
            &Value::String(school_id.to_string()),
        )?;
        let mut classes = parse_documents("directory", &documents, Class::from_document);
        classes.sort_by(|a, b| by_name(&a.name, &a.id, &b.name, &b.id));
        Ok(classes)
    }

    fn school_ids(&self) -> CoreResult<Vec<String>> {
        Ok(self
            .store
            .query_all(Collection::Schools)?
            .into_iter()
            .map(|doc| doc.id)
            .collect())
    }

    fn class_ids(&self) -> CoreResult<Vec<String>> {
        Ok(self
            .store
            .query_all(Collection::Classes)?
            .into_iter()
            .map(|doc| doc.id)
            .collect())
    }
}

fn rename_patch(name: String) -> Document {
    let mut patch = Document::new();
    patch.insert("name".to_string(), Value::String(name));
    patch.insert("updatedAt".to_string(), Value::String(now_timestamp()));
    patch
}
