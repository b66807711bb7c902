//! Splitting a numbered reference list into entries
//!
//! The list is the plain-text export of a word processor bibliography:
//!
//! ```text
//! [1] A. Muller, “Deep Learning 2nd Ed,” Springer, 2022.
//! [2] B. Chen and C. Diaz, “Graph Networks for
//!     Physics,” in Proc. ICML, 2021.
//! ```
//!
//! Whitespace only wraps lines there, so it is removed before splitting on
//! `[digits]`. Entries are numbered by position; the marker digits are not
//! read back.

use lazy_static::lazy_static;
use regex::Regex;

use crate::canonical::canonicalize;
use crate::error::{Result, TranslateError};
use crate::model::BibliographyEntry;

pub const LEFT_QUOTE: char = '\u{201c}';
pub const RIGHT_QUOTE: char = '\u{201d}';

lazy_static! {
    static ref ENTRY_MARKER: Regex = Regex::new(r"\[\d+\]").unwrap();
}

/// Split a reference list into entries with ordinals `1..=n`
///
/// Text before the first marker is preamble and dropped. An entry without
/// a quoted title aborts with [`TranslateError::MalformedReferenceEntry`].
pub fn segment(text: &str) -> Result<Vec<BibliographyEntry>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let entries = ENTRY_MARKER
        .split(&compact)
        .skip(1)
        .enumerate()
        .map(|(index, body)| parse_entry(index + 1, body))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(count = entries.len(), "segmented reference list");
    Ok(entries)
}

fn parse_entry(ordinal: usize, body: &str) -> Result<BibliographyEntry> {
    let raw_title = quoted_title(body).ok_or_else(|| TranslateError::MalformedReferenceEntry {
        ordinal,
        excerpt: body.chars().take(60).collect(),
    })?;
    let canonical_title = canonicalize(raw_title);
    tracing::debug!(ordinal, raw_title, canonical = %canonical_title, "reference entry");

    Ok(BibliographyEntry {
        ordinal,
        raw_title: raw_title.to_string(),
        canonical_title,
    })
}

/// Text from the first left quote to the last right quote after it
fn quoted_title(body: &str) -> Option<&str> {
    let start = body.find(LEFT_QUOTE)? + LEFT_QUOTE.len_utf8();
    let len = body[start..].rfind(RIGHT_QUOTE)?;
    Some(&body[start..start + len])
}
