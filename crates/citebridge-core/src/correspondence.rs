//! Matching reference list entries to database keys
//!
//! Every titled database entry is canonicalized once into a [`TitleIndex`].
//! A reference resolves to the key whose canonical title is exactly equal
//! to its own; no similarity scoring is attempted.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::canonical::{canonicalize, CanonicalTitle};
use crate::error::Diagnostic;
use crate::model::{BibliographyEntry, CorrespondenceMap, DatabaseEntry, Resolution};
use crate::rewrite::is_usable_key;

/// How to resolve a title shared by several database entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateTitlePolicy {
    /// Take the earliest entry in database order
    #[default]
    FirstSeen,
    /// Leave the reference unresolved
    Reject,
}

impl FromStr for DuplicateTitlePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first-seen" | "first" => Ok(Self::FirstSeen),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unknown duplicate title policy '{}' (expected first-seen or reject)",
                other
            )),
        }
    }
}

/// Canonical title to database keys, keys in database order
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    by_title: HashMap<CanonicalTitle, Vec<String>>,
    indexed: usize,
    diagnostics: Vec<Diagnostic>,
}

impl TitleIndex {
    pub fn build(database: &[DatabaseEntry]) -> Self {
        let mut index = Self::default();
        let mut titled = Vec::with_capacity(database.len());

        for entry in database {
            if !is_usable_key(&entry.key) {
                tracing::warn!(
                    key = %entry.key,
                    "database key would read as citation syntax, skipping"
                );
                index.diagnostics.push(Diagnostic::UnusableKey {
                    key: entry.key.clone(),
                });
                continue;
            }
            match entry.title() {
                Some(title) => {
                    let canonical = canonicalize(title);
                    tracing::debug!(
                        key = %entry.key,
                        title,
                        canonical = %canonical,
                        "indexed database title"
                    );
                    index
                        .by_title
                        .entry(canonical.clone())
                        .or_default()
                        .push(entry.key.clone());
                    titled.push(canonical);
                }
                None => {
                    tracing::warn!(key = %entry.key, "database entry has no title field, skipping");
                    index.diagnostics.push(Diagnostic::MissingTitleField {
                        key: entry.key.clone(),
                    });
                }
            }
        }
        index.indexed = titled.len();

        // Ambiguity reports in database order
        let mut reported = HashSet::new();
        for canonical in titled {
            let keys = &index.by_title[&canonical];
            if keys.len() > 1 && !reported.contains(&canonical) {
                tracing::warn!(
                    canonical = %canonical,
                    keys = ?keys,
                    "several database entries share a title"
                );
                index.diagnostics.push(Diagnostic::AmbiguousTitle {
                    canonical_title: canonical.to_string(),
                    keys: keys.clone(),
                });
                reported.insert(canonical);
            }
        }

        index
    }

    pub fn lookup(&self, title: &CanonicalTitle, policy: DuplicateTitlePolicy) -> Resolution {
        match self.by_title.get(title).map(Vec::as_slice) {
            Some([key]) => Resolution::Resolved(key.clone()),
            Some([first, ..]) => match policy {
                DuplicateTitlePolicy::FirstSeen => Resolution::Resolved(first.clone()),
                DuplicateTitlePolicy::Reject => Resolution::Unresolved,
            },
            _ => Resolution::Unresolved,
        }
    }

    /// Number of database entries that carry a title
    pub fn len(&self) -> usize {
        self.indexed
    }

    pub fn is_empty(&self) -> bool {
        self.indexed == 0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// The correspondence map together with everything that went wrong
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Correspondence {
    pub map: CorrespondenceMap,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve every reference against the database
///
/// Entries are independent of each other; several ordinals may resolve to
/// the same key.
pub fn build_correspondence(
    entries: &[BibliographyEntry],
    database: &[DatabaseEntry],
    policy: DuplicateTitlePolicy,
) -> Correspondence {
    let index = TitleIndex::build(database);
    resolve_with_index(entries, &index, policy)
}

/// Like [`build_correspondence`] but against a prebuilt index
pub fn resolve_with_index(
    entries: &[BibliographyEntry],
    index: &TitleIndex,
    policy: DuplicateTitlePolicy,
) -> Correspondence {
    let mut correspondence = Correspondence {
        map: CorrespondenceMap::new(),
        diagnostics: index.diagnostics().to_vec(),
    };

    for entry in entries {
        let resolution = index.lookup(&entry.canonical_title, policy);
        match resolution.key() {
            Some(key) => tracing::debug!(ordinal = entry.ordinal, key, "resolved reference"),
            None => {
                tracing::warn!(
                    ordinal = entry.ordinal,
                    title = %entry.raw_title,
                    "reference matches no database title"
                );
                correspondence
                    .diagnostics
                    .push(Diagnostic::UnresolvedCorrespondence {
                        ordinal: entry.ordinal,
                        raw_title: entry.raw_title.clone(),
                    });
            }
        }
        correspondence.map.insert(entry.ordinal, resolution);
    }

    correspondence
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(ordinal: usize, title: &str) -> BibliographyEntry {
        BibliographyEntry {
            ordinal,
            raw_title: title.to_string(),
            canonical_title: canonicalize(title),
        }
    }

    fn database() -> Vec<DatabaseEntry> {
        vec![
            DatabaseEntry::new("muel22").with_field("title", "Deep Learning, 2nd Ed."),
            DatabaseEntry::new("web2020").with_field("url", "https://example.org"),
            DatabaseEntry::new("chen21").with_field("Title", "Graph Networks for {P}hysics"),
        ]
    }

    #[test]
    fn test_exact_canonical_match_resolves() {
        let entries = vec![
            reference(1, "Deep Learning 2nd Ed"),
            reference(2, "GRAPH networks for physics"),
        ];
        let result = build_correspondence(&entries, &database(), DuplicateTitlePolicy::FirstSeen);

        assert_eq!(result.map.get(1), Some(&Resolution::Resolved("muel22".to_string())));
        assert_eq!(result.map.get(2), Some(&Resolution::Resolved("chen21".to_string())));
    }

    #[test]
    fn test_missing_title_is_reported_not_matched() {
        let index = TitleIndex::build(&database());
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.diagnostics(),
            &[Diagnostic::MissingTitleField { key: "web2020".to_string() }]
        );
    }

    #[test]
    fn test_unmatched_reference_is_unresolved_with_diagnostic() {
        let entries = vec![reference(3, "Something Else Entirely")];
        let result = build_correspondence(&entries, &database(), DuplicateTitlePolicy::FirstSeen);

        assert_eq!(result.map.get(3), Some(&Resolution::Unresolved));
        assert!(result.diagnostics.contains(&Diagnostic::UnresolvedCorrespondence {
            ordinal: 3,
            raw_title: "Something Else Entirely".to_string(),
        }));
    }

    #[test]
    fn test_repeated_reference_resolves_to_same_key() {
        let entries = vec![
            reference(1, "Deep Learning"),
            reference(5, "Deep Learning 2nd Ed"),
            reference(6, "Deep-Learning, 2nd ed."),
        ];
        let result = build_correspondence(&entries, &database(), DuplicateTitlePolicy::FirstSeen);

        assert_eq!(result.map.get(1), Some(&Resolution::Unresolved));
        assert_eq!(result.map.get(5), result.map.get(6));
        assert_eq!(result.map.resolved_count(), 2);
    }

    #[test]
    fn test_shared_title_follows_policy() {
        let database = vec![
            DatabaseEntry::new("a1").with_field("title", "Results, Part 1"),
            DatabaseEntry::new("a2").with_field("title", "Results Part 2"),
        ];
        let entries = vec![reference(1, "Results, part 3")];

        let first = build_correspondence(&entries, &database, DuplicateTitlePolicy::FirstSeen);
        assert_eq!(first.map.get(1), Some(&Resolution::Resolved("a1".to_string())));
        assert_eq!(
            first.diagnostics,
            vec![Diagnostic::AmbiguousTitle {
                canonical_title: "resultspart".to_string(),
                keys: vec!["a1".to_string(), "a2".to_string()],
            }]
        );

        let rejected = build_correspondence(&entries, &database, DuplicateTitlePolicy::Reject);
        assert_eq!(rejected.map.get(1), Some(&Resolution::Unresolved));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "first-seen".parse::<DuplicateTitlePolicy>(),
            Ok(DuplicateTitlePolicy::FirstSeen)
        );
        assert_eq!(
            " Reject ".parse::<DuplicateTitlePolicy>(),
            Ok(DuplicateTitlePolicy::Reject)
        );
        assert!("last-seen".parse::<DuplicateTitlePolicy>().is_err());
    }

    #[test]
    fn test_bracketed_key_never_resolves() {
        let database = vec![
            DatabaseEntry::new("[2]").with_field("title", "Marker Key"),
            DatabaseEntry::new("brace{d").with_field("title", "Braced Key"),
        ];
        let entries = vec![reference(1, "Marker Key"), reference(2, "Braced Key")];
        let result = build_correspondence(&entries, &database, DuplicateTitlePolicy::FirstSeen);

        assert_eq!(result.map.get(1), Some(&Resolution::Unresolved));
        assert_eq!(result.map.get(2), Some(&Resolution::Unresolved));
        assert!(result.diagnostics.contains(&Diagnostic::UnusableKey { key: "[2]".to_string() }));
        assert!(result
            .diagnostics
            .contains(&Diagnostic::UnusableKey { key: "brace{d".to_string() }));
    }

    #[test]
    fn test_ambiguity_reported_once_in_database_order() {
        let database = vec![
            DatabaseEntry::new("b1").with_field("title", "Beta"),
            DatabaseEntry::new("a1").with_field("title", "Alpha"),
            DatabaseEntry::new("b2").with_field("title", "beta."),
            DatabaseEntry::new("a2").with_field("title", "ALPHA"),
            DatabaseEntry::new("b3").with_field("title", "Beta!"),
        ];
        let index = TitleIndex::build(&database);

        let titles: Vec<&str> = index
            .diagnostics()
            .iter()
            .filter_map(|d| match d {
                Diagnostic::AmbiguousTitle {
                    canonical_title, ..
                } => Some(canonical_title.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(titles, vec!["beta", "alpha"]);
        assert_eq!(index.len(), 5);
    }
}
