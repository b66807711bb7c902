//! The end-to-end translation
//!
//! `translate` is a pure function of its inputs; `run` wraps it with the
//! file reads and the single output write.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::TranslatorConfig;
use crate::correspondence::build_correspondence;
use crate::error::{Diagnostic, Result};
use crate::io::{load_database, read_text, write_text};
use crate::model::{CorrespondenceMap, DatabaseEntry};
use crate::rewrite::rewrite;
use crate::segment::segment;

/// Output of one translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub correspondence: CorrespondenceMap,
    pub replacements: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Counts for the end-of-run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationSummary {
    pub references: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub replacements: usize,
    pub untitled_database_entries: usize,
    pub ambiguous_titles: usize,
}

impl Translation {
    pub fn summary(&self) -> TranslationSummary {
        let count = |pred: fn(&Diagnostic) -> bool| {
            self.diagnostics.iter().filter(|d| pred(d)).count()
        };
        TranslationSummary {
            references: self.correspondence.len(),
            resolved: self.correspondence.resolved_count(),
            unresolved: self.correspondence.len() - self.correspondence.resolved_count(),
            replacements: self.replacements,
            untitled_database_entries: count(|d| matches!(d, Diagnostic::MissingTitleField { .. })),
            ambiguous_titles: count(|d| matches!(d, Diagnostic::AmbiguousTitle { .. })),
        }
    }
}

/// Map the reference list onto `database` and rewrite `body_text`
pub fn translate(
    database: &[DatabaseEntry],
    bibliography_text: &str,
    body_text: &str,
    config: &TranslatorConfig,
) -> Result<Translation> {
    let entries = segment(bibliography_text)?;
    let correspondence = build_correspondence(&entries, database, config.duplicate_titles);
    let rewritten = rewrite(body_text, &correspondence.map, &config.citation);

    Ok(Translation {
        text: rewritten.text,
        correspondence: correspondence.map,
        replacements: rewritten.replacements,
        diagnostics: correspondence.diagnostics,
    })
}

/// The four files of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub bibtex: PathBuf,
    pub bibliography: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Read the inputs, translate, and write the output
///
/// Nothing is written when the reference list is malformed.
pub fn run(paths: &RunPaths, config: &TranslatorConfig) -> Result<Translation> {
    let (database, mut diagnostics) = load_database(&paths.bibtex)?;
    let bibliography_text = read_text(&paths.bibliography)?;
    let body_text = read_text(&paths.input)?;

    let mut translation = translate(&database, &bibliography_text, &body_text, config)?;
    write_text(&paths.output, &translation.text)?;

    diagnostics.append(&mut translation.diagnostics);
    translation.diagnostics = diagnostics;

    for diagnostic in &translation.diagnostics {
        tracing::warn!("{}", diagnostic);
    }
    let summary = translation.summary();
    match serde_json::to_string(&summary) {
        Ok(json) => tracing::info!(summary = %json, "translation finished"),
        Err(e) => tracing::debug!("cannot serialize summary: {}", e),
    }

    Ok(translation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslateError;
    use crate::model::Resolution;

    fn database() -> Vec<DatabaseEntry> {
        vec![
            DatabaseEntry::new("muel22").with_field("title", "Deep Learning, 2nd Ed."),
            DatabaseEntry::new("misc1").with_field("note", "no title"),
        ]
    }

    #[test]
    fn test_translate_end_to_end() {
        let bibliography = "[1] A. Muller, “Deep Learning 2nd Ed,” Springer.\n\
                            [2] Z. Nobody, “Lost Work,” 1999.";
        let translation = translate(
            &database(),
            bibliography,
            "as shown in [1] and [2], not [3]",
            &TranslatorConfig::default(),
        )
        .unwrap();

        assert_eq!(
            translation.text,
            "as shown in \\cite{muel22} and \\cite{unresolved}, not [3]"
        );
        assert_eq!(translation.correspondence.get(2), Some(&Resolution::Unresolved));

        let summary = translation.summary();
        assert_eq!(summary.references, 2);
        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.unresolved, 1);
        assert_eq!(summary.replacements, 2);
        assert_eq!(summary.untitled_database_entries, 1);
        assert_eq!(summary.ambiguous_titles, 0);
    }

    #[test]
    fn test_translate_stops_on_malformed_reference() {
        let err = translate(&database(), "[1] A, no quotes", "[1]", &TranslatorConfig::default())
            .unwrap_err();
        assert!(matches!(err, TranslateError::MalformedReferenceEntry { ordinal: 1, .. }));
    }
}
