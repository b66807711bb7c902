//! Data model shared by the pipeline stages

use std::collections::{BTreeMap, HashMap};

use citebridge_bibtex::BibTeXEntry;
use serde::Serialize;

use crate::canonical::CanonicalTitle;

/// A keyed record of the structured reference database
///
/// Field names are stored lowercased; lookups ignore case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseEntry {
    pub key: String,
    pub fields: HashMap<String, String>,
}

impl DatabaseEntry {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: HashMap::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }
}

impl From<&BibTeXEntry> for DatabaseEntry {
    fn from(entry: &BibTeXEntry) -> Self {
        Self {
            key: entry.cite_key.clone(),
            fields: entry
                .fields_lowercase()
                .map(|(name, value)| (name, value.to_string()))
                .collect(),
        }
    }
}

/// One entry of the numbered reference list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibliographyEntry {
    /// 1-based position in the list, independent of the marker's digits
    pub ordinal: usize,
    /// Text between the typographic quotes, whitespace already stripped
    pub raw_title: String,
    pub canonical_title: CanonicalTitle,
}

/// Outcome of looking up one reference in the database
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Resolved(String),
    Unresolved,
}

impl Resolution {
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Resolved(key) => Some(key),
            Self::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Ordinal to database key, ordered by ordinal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CorrespondenceMap(BTreeMap<usize, Resolution>);

impl CorrespondenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ordinal: usize, resolution: Resolution) {
        self.0.insert(ordinal, resolution);
    }

    pub fn get(&self, ordinal: usize) -> Option<&Resolution> {
        self.0.get(&ordinal)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Resolution)> {
        self.0.iter().map(|(ordinal, resolution)| (*ordinal, resolution))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn resolved_count(&self) -> usize {
        self.0.values().filter(|r| r.is_resolved()).count()
    }

    pub fn unresolved_ordinals(&self) -> Vec<usize> {
        self.iter()
            .filter(|(_, resolution)| !resolution.is_resolved())
            .map(|(ordinal, _)| ordinal)
            .collect()
    }
}

impl FromIterator<(usize, Resolution)> for CorrespondenceMap {
    fn from_iter<I: IntoIterator<Item = (usize, Resolution)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
