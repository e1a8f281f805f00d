//! Working AOV set: the `key <-> suffix` pairs confirmed for one build.
//!
//! Files and channel layers are matched by suffix, and the matched AOV is
//! reported by key. Both directions live in one structure so a suffix always
//! resolves to exactly one key.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

use super::aov::{AovTable, Level};

/// Bijective `key <-> suffix` mapping, ordered by insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSet {
    by_key: IndexMap<String, String>,
    by_suffix: HashMap<String, String>,
}

/// Validation errors for a working set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkingSetError {
    EmptySuffix { key: String },
    DuplicateSuffix { suffix: String, key: String, existing: String },
}

impl fmt::Display for WorkingSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkingSetError::EmptySuffix { key } => write!(f, "AOV '{}' has an empty suffix", key),
            WorkingSetError::DuplicateSuffix { suffix, key, existing } => write!(
                f,
                "Suffix '{}' of AOV '{}' is already used by AOV '{}'",
                suffix, key, existing
            ),
        }
    }
}

impl std::error::Error for WorkingSetError {}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a table level, applying per-key suffix overrides.
    ///
    /// Overrides for keys outside the level are ignored.
    pub fn from_table(
        table: &AovTable,
        level: Level,
        overrides: &IndexMap<String, String>,
    ) -> Result<Self, WorkingSetError> {
        let mut set = Self::new();
        for (key, (_, suffix)) in table.get_subset(level) {
            let suffix = overrides.get(&key).cloned().unwrap_or(suffix);
            set.insert(key, suffix)?;
        }
        Ok(set)
    }

    /// Build from plain pairs, as handed over by a front-end
    pub fn from_pairs<K, S, I>(pairs: I) -> Result<Self, WorkingSetError>
    where
        K: Into<String>,
        S: Into<String>,
        I: IntoIterator<Item = (K, S)>,
    {
        let mut set = Self::new();
        for (key, suffix) in pairs {
            set.insert(key, suffix)?;
        }
        Ok(set)
    }

    /// Insert or replace the suffix of `key`.
    pub fn insert(&mut self, key: impl Into<String>, suffix: impl Into<String>) -> Result<(), WorkingSetError> {
        let key = key.into();
        let suffix = suffix.into();

        if suffix.trim().is_empty() {
            return Err(WorkingSetError::EmptySuffix { key });
        }
        if let Some(existing) = self.by_suffix.get(&suffix) {
            if *existing != key {
                return Err(WorkingSetError::DuplicateSuffix {
                    suffix,
                    key,
                    existing: existing.clone(),
                });
            }
        }

        if let Some(old) = self.by_key.insert(key.clone(), suffix.clone()) {
            self.by_suffix.remove(&old);
        }
        self.by_suffix.insert(suffix, key);
        Ok(())
    }

    pub fn key_for_suffix(&self, suffix: &str) -> Option<&str> {
        self.by_suffix.get(suffix).map(String::as_str)
    }

    pub fn suffix_for_key(&self, key: &str) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    pub fn contains_suffix(&self, suffix: &str) -> bool {
        self.by_suffix.contains_key(suffix)
    }

    /// `(key, suffix)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_key.iter().map(|(k, s)| (k.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::aov::RenderEngine;

    #[test]
    fn test_from_table_with_overrides() {
        let table = AovTable::builtin(RenderEngine::Arnold);
        let mut overrides = IndexMap::new();
        overrides.insert("direct".to_string(), "dir".to_string());
        overrides.insert("coat".to_string(), "ignored".to_string());

        let set = WorkingSet::from_table(&table, Level::Standard, &overrides).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.suffix_for_key("direct"), Some("dir"));
        assert_eq!(set.key_for_suffix("dir"), Some("direct"));
        assert!(!set.contains_suffix("direct"));
        assert!(!set.contains_suffix("ignored"));
    }

    #[test]
    fn test_duplicate_suffix_rejected() {
        let err = WorkingSet::from_pairs([("diffuse", "diff"), ("specular", "diff")]).unwrap_err();
        assert_eq!(
            err,
            WorkingSetError::DuplicateSuffix {
                suffix: "diff".into(),
                key: "specular".into(),
                existing: "diffuse".into(),
            }
        );
    }

    #[test]
    fn test_empty_suffix_rejected() {
        assert!(matches!(
            WorkingSet::from_pairs([("diffuse", " ")]),
            Err(WorkingSetError::EmptySuffix { .. })
        ));
    }

    #[test]
    fn test_reinsert_replaces_reverse_entry() {
        let mut set = WorkingSet::from_pairs([("diffuse", "diffuse")]).unwrap();
        set.insert("diffuse", "diff").unwrap();
        assert_eq!(set.len(), 1);
        assert!(!set.contains_suffix("diffuse"));
        assert_eq!(set.key_for_suffix("diff"), Some("diffuse"));

        // Freed suffix can be taken by another key
        set.insert("albedo", "diffuse").unwrap();
        assert_eq!(set.key_for_suffix("diffuse"), Some("albedo"));
    }
}
