//! Name-conflict resolution for imported lists.
//!
//! A [`NameLookup`] is built once per import batch from the lists already in
//! the store. Names are compared case-insensitively. Every name handed out by
//! [`resolve`] is recorded back into the lookup so later lists in the same
//! batch cannot receive it again.

use std::collections::HashMap;

use super::types::ConflictResolution;

/// Numbered copy attempts before falling back to [`FALLBACK_COPY_NUMBER`].
const MAX_COPY_ATTEMPTS: u32 = 100;

const FALLBACK_COPY_NUMBER: u32 = 9999;

/// Case-insensitive map of taken list names to their IDs.
///
/// Names reserved during the current batch have no ID.
#[derive(Debug, Clone, Default)]
pub struct NameLookup {
    names: HashMap<String, Option<i64>>,
}

impl NameLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a lookup from `(name, id)` pairs of existing lists.
    pub fn from_existing<'a>(lists: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        let names = lists
            .into_iter()
            .map(|(name, id)| (name.to_lowercase(), Some(id)))
            .collect();
        Self { names }
    }

    /// Whether `name` is taken.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&name.to_lowercase())
    }

    /// `None` if the name is free, `Some(id)` if taken (`id` is `None` for
    /// names reserved in this batch).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Option<i64>> {
        self.names.get(&name.to_lowercase()).copied()
    }

    /// Mark `name` as taken without an ID.
    pub fn reserve(&mut self, name: &str) {
        self.names.entry(name.to_lowercase()).or_insert(None);
    }

    /// Record the ID of a list created under `name` in this batch.
    pub fn record(&mut self, name: &str, id: i64) {
        self.names.insert(name.to_lowercase(), Some(id));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Outcome of resolving one imported list name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Create the list under this name.
    Create(String),
    /// Delete `existing_id` (when known), then create under `name`.
    Replace { name: String, existing_id: Option<i64> },
    /// Do not import the list.
    Skip,
}

/// Mint `"{base} ({suffix})"`, then `"{base} ({suffix} 2)"` and so on.
///
/// After 100 attempts `"{base} ({suffix} 9999)"` is returned. The result is
/// reserved in `lookup`.
pub fn find_unique_name(base: &str, suffix: &str, lookup: &mut NameLookup) -> String {
    let first = format!("{base} ({suffix})");
    let candidate = if lookup.contains(&first) {
        (2..=MAX_COPY_ATTEMPTS)
            .map(|n| format!("{base} ({suffix} {n})"))
            .find(|name| !lookup.contains(name))
            .unwrap_or_else(|| format!("{base} ({suffix} {FALLBACK_COPY_NUMBER})"))
    } else {
        first
    };

    lookup.reserve(&candidate);
    candidate
}

/// Decide what happens to an imported list called `name`.
pub fn resolve(
    name: &str,
    mode: ConflictResolution,
    suffix: &str,
    lookup: &mut NameLookup,
) -> Resolution {
    let Some(existing_id) = lookup.get(name) else {
        lookup.reserve(name);
        return Resolution::Create(name.to_string());
    };

    match mode {
        ConflictResolution::Skip => Resolution::Skip,
        ConflictResolution::Replace => Resolution::Replace {
            name: name.to_string(),
            existing_id,
        },
        ConflictResolution::Copy => Resolution::Create(find_unique_name(name, suffix, lookup)),
    }
}
