//! Alias-map configuration for import and ref path indirection
//!
//! An alias map translates logical names to concrete file paths before the
//! pipeline touches the filesystem. It is applied to the root document path,
//! to every import reference, and to every `ref` body. Resolution is a
//! single table lookup; aliases are not applied recursively.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Bundled default alias mappings, packaged with the crate
const DEFAULT_ALIASES: &str = include_str!("../resources/alias-mappings.yaml");

/// A mapping from logical names to concrete file paths
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AliasMap {
    entries: IndexMap<String, String>,
}

impl AliasMap {
    /// Create an empty alias map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the bundled default alias map
    ///
    /// # Errors
    ///
    /// Returns a `BlueprintError` if the packaged resource is not a valid
    /// YAML mapping.
    pub fn bundled() -> Result<Self> {
        let entries: Option<IndexMap<String, String>> = serde_yaml::from_str(DEFAULT_ALIASES)?;
        Ok(Self {
            entries: entries.unwrap_or_default(),
        })
    }

    /// Resolve a name through the map, returning it unchanged when unmapped
    #[must_use]
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries.get(name).map_or(name, String::as_str)
    }

    /// Add or replace a mapping
    pub fn insert(&mut self, name: impl Into<String>, target: impl Into<String>) {
        self.entries.insert(name.into(), target.into());
    }

    /// Whether the map has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<IndexMap<String, String>> for AliasMap {
    fn from(entries: IndexMap<String, String>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, String)> for AliasMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
