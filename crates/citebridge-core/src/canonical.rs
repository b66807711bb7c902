//! Title canonicalization
//!
//! Two independently typeset titles are compared by their lowercase
//! letter sequence only. Digits, punctuation, whitespace and any letter
//! outside `a..=z` are dropped, so "Deep Learning, 2nd Ed." and
//! "Deep Learning 2nd Ed" meet at `deeplearningnded`.

use serde::Serialize;

/// A title reduced to lowercase ASCII letters
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalTitle(String);

impl CanonicalTitle {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for CanonicalTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalize a title for exact comparison
pub fn canonicalize(title: &str) -> CanonicalTitle {
    CanonicalTitle(
        title
            .to_lowercase()
            .chars()
            .filter(char::is_ascii_lowercase)
            .collect(),
    )
}
