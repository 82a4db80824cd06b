//! Group use-case service.
//!
//! # Responsibility
//! - Create and maintain groups owned by one user.
//! - Issue, rotate and redeem trust codes for joining groups.
//!
//! # Invariants
//! - Group ids are unique across all groups, whoever owns them.
//! - A group always has exactly one current trust code; rotating it makes the
//!   previous code unusable.
//! - The owner is a member and cannot leave; only the owner may rotate codes.

use crate::error::{CoreError, CoreResult};
use crate::ids::slug::unique_slug;
use crate::ids::trust_code;
use crate::model::directory::{now_timestamp, Group};
use crate::model::document::Document;
use crate::service::{by_name, parse_documents, require_sluggable};
use crate::store::{Collection, RecordStore};
use log::{info, warn};
use serde_json::Value;

/// Attempts at drawing a trust code not used by any other group.
const MAX_TRUST_CODE_ATTEMPTS: usize = 8;

/// User input for creating or editing a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDraft {
    pub name: String,
    /// Free-form tags such as `school`, `friends`, `family`.
    pub categories: Vec<String>,
}

/// Use-case service for shareable groups.
pub struct GroupService<S: RecordStore, G = fn() -> String> {
    store: S,
    next_code: G,
}

impl<S: RecordStore> GroupService<S> {
    /// Creates a service drawing codes from the thread RNG.
    pub fn new(store: S) -> Self {
        Self {
            store,
            next_code: trust_code::generate,
        }
    }
}

impl<S: RecordStore, G: Fn() -> String> GroupService<S, G> {
    /// Creates a service with a custom trust code source.
    pub fn with_code_source(store: S, next_code: G) -> Self {
        Self { store, next_code }
    }

    /// Creates a group owned by `user_id` and returns its slug id.
    ///
    /// # Contract
    /// - The creator is the first member.
    /// - A fresh trust code is assigned.
    pub fn create_group(&self, draft: &GroupDraft, user_id: &str) -> CoreResult<String> {
        let name = require_sluggable(&draft.name)?;
        let existing = self.group_ids()?;
        let id = unique_slug(&name, &existing);

        let now = now_timestamp();
        let group = Group {
            id: id.clone(),
            name,
            categories: draft.categories.clone(),
            user_id: user_id.to_string(),
            trust_code: self.fresh_trust_code()?,
            members: vec![user_id.to_string()],
            created_at: now.clone(),
            updated_at: now,
        };
        self.store
            .create_with_id(Collection::Groups, &id, &group.to_document()?)?;

        info!("event=group_create module=groups status=ok id={id}");
        Ok(id)
    }

    /// Replaces name and categories. The id stays the same.
    pub fn update_group(&self, group_id: &str, draft: &GroupDraft) -> CoreResult<()> {
        let name = require_sluggable(&draft.name)?;
        let mut patch = Document::new();
        patch.insert("name".to_string(), Value::String(name));
        patch.insert(
            "categories".to_string(),
            Value::from(draft.categories.clone()),
        );
        patch.insert("updatedAt".to_string(), Value::String(now_timestamp()));
        self.store.update(Collection::Groups, group_id, &patch)?;
        Ok(())
    }

    pub fn delete_group(&self, group_id: &str) -> CoreResult<()> {
        self.store.delete(Collection::Groups, group_id)?;
        info!("event=group_delete module=groups status=ok id={group_id}");
        Ok(())
    }

    /// Loads one group.
    ///
    /// # Errors
    /// - `NotFound` when absent, `Validation` when the stored body is invalid.
    pub fn get_group(&self, group_id: &str) -> CoreResult<Group> {
        let doc = self
            .store
            .get(Collection::Groups, group_id)?
            .ok_or_else(|| CoreError::NotFound(format!("group `{group_id}`")))?;
        Ok(Group::from_document(&doc)?)
    }

    /// Groups `user_id` belongs to (owned or joined), ordered by name.
    pub fn groups_for_member(&self, user_id: &str) -> CoreResult<Vec<Group>> {
        let documents = self.store.query_all(Collection::Groups)?;
        let mut groups: Vec<Group> = parse_documents("groups", &documents, Group::from_document)
            .into_iter()
            .filter(|group| group.is_member(user_id))
            .collect();
        groups.sort_by(|a, b| by_name(&a.name, &a.id, &b.name, &b.id));
        Ok(groups)
    }

    /// Replaces the trust code of a group and returns the new one.
    ///
    /// # Errors
    /// - `NotFound` when the group is absent.
    /// - `Forbidden` when `user_id` is not the owner.
    pub fn regenerate_trust_code(&self, group_id: &str, user_id: &str) -> CoreResult<String> {
        let group = self.get_group(group_id)?;
        if !group.is_owner(user_id) {
            return Err(CoreError::Forbidden(
                "only the group owner can regenerate the trust code".to_string(),
            ));
        }

        let code = self.fresh_trust_code()?;
        let mut patch = Document::new();
        patch.insert("trustCode".to_string(), Value::String(code.clone()));
        patch.insert("updatedAt".to_string(), Value::String(now_timestamp()));
        self.store.update(Collection::Groups, group_id, &patch)?;

        info!("event=trust_code_rotate module=groups status=ok id={group_id}");
        Ok(code)
    }

    /// Looks up the group whose current code matches user input.
    ///
    /// Input is normalized first, so `abc-123` finds `ABC123`.
    ///
    /// # Errors
    /// - `Validation` when the normalized input is not a well-formed code.
    pub fn find_group_by_trust_code(&self, input: &str) -> CoreResult<Option<Group>> {
        let code = canonical_code(input)?;
        let documents = self.store.query_by_field(
            Collection::Groups,
            "trustCode",
            &Value::String(code),
        )?;
        match documents.first() {
            Some(doc) => Ok(Some(Group::from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Adds `user_id` to the group identified by a trust code.
    ///
    /// # Errors
    /// - `Validation` for malformed codes.
    /// - `NotFound` when no group currently uses the code.
    /// - `Conflict` when the user is already a member.
    pub fn join_group_by_trust_code(&self, input: &str, user_id: &str) -> CoreResult<Group> {
        let mut group = self
            .find_group_by_trust_code(input)?
            .ok_or_else(|| CoreError::NotFound("no group uses this trust code".to_string()))?;

        if group.is_member(user_id) {
            return Err(CoreError::Conflict(format!(
                "user is already a member of group `{}`",
                group.id
            )));
        }

        group.members.push(user_id.to_string());
        group.updated_at = now_timestamp();
        self.store
            .update(Collection::Groups, &group.id, &membership_patch(&group))?;

        info!(
            "event=group_join module=groups status=ok id={} members={}",
            group.id,
            group.members.len()
        );
        Ok(group)
    }

    /// Removes `user_id` from a group. Leaving a group one is not in is a no-op.
    ///
    /// # Errors
    /// - `NotFound` when the group is absent.
    /// - `Forbidden` when `user_id` is the owner.
    pub fn leave_group(&self, group_id: &str, user_id: &str) -> CoreResult<()> {
        let mut group = self.get_group(group_id)?;
        if group.is_owner(user_id) {
            return Err(CoreError::Forbidden(
                "the group owner cannot leave; delete the group instead".to_string(),
            ));
        }

        let before = group.members.len();
        group.members.retain(|member| member != user_id);
        if group.members.len() == before {
            return Ok(());
        }

        group.updated_at = now_timestamp();
        self.store
            .update(Collection::Groups, group_id, &membership_patch(&group))?;
        info!("event=group_leave module=groups status=ok id={group_id}");
        Ok(())
    }

    fn group_ids(&self) -> CoreResult<Vec<String>> {
        Ok(self
            .store
            .query_all(Collection::Groups)?
            .into_iter()
            .map(|doc| doc.id)
            .collect())
    }

    /// Draws codes until one is unused by every group.
    fn fresh_trust_code(&self) -> CoreResult<String> {
        for attempt in 1..=MAX_TRUST_CODE_ATTEMPTS {
            let code = (self.next_code)();
            if !trust_code::is_valid(&code) {
                return Err(CoreError::Validation(format!(
                    "trust code source produced malformed code `{code}`"
                )));
            }

            let taken = self.store.query_by_field(
                Collection::Groups,
                "trustCode",
                &Value::String(code.clone()),
            )?;
            if taken.is_empty() {
                return Ok(code);
            }
            warn!("event=trust_code_collision module=groups status=retry attempt={attempt}");
        }

        Err(CoreError::Conflict(format!(
            "no unused trust code after {MAX_TRUST_CODE_ATTEMPTS} attempts"
        )))
    }
}

fn canonical_code(input: &str) -> CoreResult<String> {
    let code = trust_code::normalize(input);
    if !trust_code::is_valid(&code) {
        return Err(CoreError::Validation(
            "trust code must be 6 letters or digits".to_string(),
        ));
    }
    Ok(code)
}

fn membership_patch(group: &Group) -> Document {
    let mut patch = Document::new();
    patch.insert("members".to_string(), Value::from(group.members.clone()));
    patch.insert(
        "updatedAt".to_string(),
        Value::String(group.updated_at.clone()),
    );
    patch
}
