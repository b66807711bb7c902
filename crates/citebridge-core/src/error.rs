//! Error and diagnostic types for citebridge

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for citebridge operations
pub type Result<T> = std::result::Result<T, TranslateError>;

/// Faults that stop a run
#[derive(Error, Debug)]
pub enum TranslateError {
    /// A reference list entry has no typographically quoted title
    #[error("reference [{ordinal}] has no title enclosed in \u{201c}\u{201d}: '{excerpt}'")]
    MalformedReferenceEntry { ordinal: usize, excerpt: String },

    /// Reading or writing one of the run's files failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The BibTeX database yielded no usable entries
    #[error("cannot read BibTeX database {}: {message}", .path.display())]
    Database { path: PathBuf, message: String },
}

impl TranslateError {
    /// Ordinal of the offending reference, for structural faults
    pub fn ordinal(&self) -> Option<usize> {
        match self {
            Self::MalformedReferenceEntry { ordinal, .. } => Some(*ordinal),
            _ => None,
        }
    }
}

/// Conditions that degrade the output without stopping the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Database entry without a title; it never takes part in matching
    MissingTitleField { key: String },

    /// Database key containing brackets or braces; it is never matched
    UnusableKey { key: String },

    /// No database title matches the reference's canonical title
    UnresolvedCorrespondence { ordinal: usize, raw_title: String },

    /// Several database entries share one canonical title
    AmbiguousTitle {
        canonical_title: String,
        keys: Vec<String>,
    },

    /// The BibTeX reader skipped or dropped a record
    DatabaseParseIssue { line: u32, message: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitleField { key } => {
                write!(f, "database entry '{}' has no title and is never matched", key)
            }
            Self::UnusableKey { key } => {
                write!(f, "database key '{}' contains brackets or braces and is never matched", key)
            }
            Self::UnresolvedCorrespondence { ordinal, raw_title } => write!(
                f,
                "reference [{}] \u{201c}{}\u{201d} matches no database title",
                ordinal, raw_title
            ),
            Self::AmbiguousTitle {
                canonical_title,
                keys,
            } => write!(
                f,
                "database entries {} share the canonical title '{}'",
                keys.join(", "),
                canonical_title
            ),
            Self::DatabaseParseIssue { line, message } => {
                write!(f, "BibTeX line {}: {}", line, message)
            }
        }
    }
}
