//! Slug derivation for human-readable container ids.
//!
//! # Responsibility
//! - Turn free-text names into URL-safe ids.
//! - Pick a collision-free id within one namespace.
//!
//! # Invariants
//! - `slugify` output matches `^[a-z0-9-]*$` without edge hyphens.
//! - `slugify` is idempotent.
//! - Suffixes are always appended to the original base, never stacked.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static DISALLOWED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("valid disallowed-char regex"));
static SEPARATOR_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_-]+").expect("valid separator regex"));
static VALID_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("valid slug regex"));

/// Converts text to a lowercase hyphenated slug.
///
/// Characters outside ASCII letters, digits, whitespace, `_` and `-` are
/// dropped (accented letters included). Returns an empty string when nothing
/// eligible remains.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = DISALLOWED_RE.replace_all(lowered.trim(), "");
    let collapsed = SEPARATOR_RUN_RE.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

/// Whether `slug` is non-empty, lowercase-hyphenated and has no edge hyphen.
pub fn is_valid_slug(slug: &str) -> bool {
    VALID_SLUG_RE.is_match(slug) && !slug.starts_with('-') && !slug.ends_with('-')
}

/// Slug of `text` that is not present in `existing`.
///
/// Returns `slugify(text)` untouched when free, otherwise the first free of
/// `base-1`, `base-2`, ...
pub fn unique_slug<S: AsRef<str>>(text: &str, existing: &[S]) -> String {
    unique_slug_by(text, |candidate| {
        existing.iter().any(|id| id.as_ref() == candidate)
    })
}

/// Like [`unique_slug`], with namespace membership supplied as a predicate.
pub fn unique_slug_by(text: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let base = slugify(text);
    if !is_taken(&base) {
        return base;
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{base}-{counter}");
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Set of ids already used under one parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlugNamespace {
    used: BTreeSet<String>,
}

impl SlugNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            used: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Marks an id as used without deriving it.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.used.insert(id.into())
    }

    /// Derives a free slug for `text` and marks it as used.
    pub fn claim(&mut self, text: &str) -> String {
        let slug = unique_slug_by(text, |candidate| self.used.contains(candidate));
        self.used.insert(slug.clone());
        slug
    }
}
