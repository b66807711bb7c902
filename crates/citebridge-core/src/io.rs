//! Whole-file reads and writes
//!
//! Each helper opens, fully reads or writes, and closes its file before
//! returning.

use std::path::Path;

use crate::error::{Diagnostic, Result, TranslateError};
use crate::model::DatabaseEntry;

pub fn read_text(path: &Path) -> Result<String> {
    tracing::info!("Reading file {}", path.display());
    std::fs::read_to_string(path).map_err(|source| TranslateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_text(path: &Path, content: &str) -> Result<()> {
    tracing::info!("Writing file {}", path.display());
    std::fs::write(path, content).map_err(|source| TranslateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a BibTeX file into database entries, in file order
///
/// Records the reader had to skip come back as diagnostics.
pub fn load_database(path: &Path) -> Result<(Vec<DatabaseEntry>, Vec<Diagnostic>)> {
    let text = read_text(path)?;
    let bibtex = citebridge_bibtex::parse(&text).map_err(|e| TranslateError::Database {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let entries: Vec<DatabaseEntry> = bibtex.entries.iter().map(DatabaseEntry::from).collect();
    let diagnostics = bibtex
        .issues
        .into_iter()
        .map(|issue| Diagnostic::DatabaseParseIssue {
            line: issue.line,
            message: issue.message,
        })
        .collect();

    tracing::info!(entries = entries.len(), "loaded BibTeX database");
    Ok((entries, diagnostics))
}
