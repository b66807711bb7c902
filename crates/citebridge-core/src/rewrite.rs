//! Rewriting `[n]` markers in body text as citation commands

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::model::{CorrespondenceMap, Resolution};

lazy_static! {
    static ref CITATION_MARKER: Regex = Regex::new(r"\[([0-9]+)\]").unwrap();
}

/// Shape of the emitted citation, `\<command>{<key>}`
///
/// Deserialization runs the same checks as [`CitationFormat::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CitationFormatFields")]
pub struct CitationFormat {
    /// LaTeX command name without the backslash
    pub command: String,
    /// Key written for references that matched nothing
    pub unresolved: String,
}

impl Default for CitationFormat {
    fn default() -> Self {
        Self {
            command: "cite".to_string(),
            unresolved: "unresolved".to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct CitationFormatFields {
    command: String,
    unresolved: String,
}

impl Default for CitationFormatFields {
    fn default() -> Self {
        let CitationFormat {
            command,
            unresolved,
        } = CitationFormat::default();
        Self {
            command,
            unresolved,
        }
    }
}

impl TryFrom<CitationFormatFields> for CitationFormat {
    type Error = String;

    fn try_from(fields: CitationFormatFields) -> Result<Self, Self::Error> {
        Self::new(fields.command, fields.unresolved)
    }
}

impl CitationFormat {
    /// Checked constructor
    pub fn new(
        command: impl Into<String>,
        unresolved: impl Into<String>,
    ) -> Result<Self, String> {
        let command = command.into();
        let unresolved = unresolved.into();
        if !is_command_name(&command) {
            return Err(format!(
                "citation command must be ASCII letters only, got '{}'",
                command
            ));
        }
        if !is_usable_key(&unresolved) {
            return Err(format!(
                "unresolved sentinel must be non-empty without brackets or braces, got '{}'",
                unresolved
            ));
        }
        Ok(Self {
            command,
            unresolved,
        })
    }

    pub fn render(&self, resolution: &Resolution) -> String {
        let key = resolution.key().unwrap_or(&self.unresolved);
        format!("\\{}{{{}}}", self.command, key)
    }
}

pub(crate) fn is_command_name(command: &str) -> bool {
    !command.is_empty() && command.chars().all(|c| c.is_ascii_alphabetic())
}

/// Whether `key` may sit inside `{}` without ever reading as a marker again
pub fn is_usable_key(key: &str) -> bool {
    !key.trim().is_empty() && !key.contains(|c: char| matches!(c, '[' | ']' | '{' | '}'))
}

/// Rewritten body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub text: String,
    /// Number of markers replaced
    pub replacements: usize,
}

/// Replace every `[ordinal]` whose ordinal is in `correspondence`
///
/// The body is scanned once, so inserted citations are never rescanned and
/// the result does not depend on ordinal order. A marker's digits must be
/// the exact decimal form of the ordinal: `[01]` is not `[1]`. Markers for
/// ordinals outside the map are left as they are.
pub fn rewrite(
    body: &str,
    correspondence: &CorrespondenceMap,
    format: &CitationFormat,
) -> Rewritten {
    let citations: HashMap<String, String> = correspondence
        .iter()
        .map(|(ordinal, resolution)| (ordinal.to_string(), format.render(resolution)))
        .collect();

    let mut replacements = 0;
    let text = CITATION_MARKER
        .replace_all(body, |caps: &Captures| match citations.get(&caps[1]) {
            Some(citation) => {
                replacements += 1;
                citation.clone()
            }
            None => caps[0].to_string(),
        })
        .into_owned();

    tracing::debug!(replacements, "rewrote citation markers");
    Rewritten { text, replacements }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(usize, Option<&str>)]) -> CorrespondenceMap {
        pairs
            .iter()
            .map(|(ordinal, key)| {
                let resolution = match key {
                    Some(key) => Resolution::Resolved(key.to_string()),
                    None => Resolution::Unresolved,
                };
                (*ordinal, resolution)
            })
            .collect()
    }

    #[test]
    fn test_marker_becomes_cite_command() {
        let correspondence = map(&[(1, Some("muel22"))]);
        let out = rewrite("as shown in [1]", &correspondence, &CitationFormat::default());
        assert_eq!(out.text, "as shown in \\cite{muel22}");
        assert_eq!(out.replacements, 1);
    }

    #[test]
    fn test_unresolved_sentinel_is_embedded() {
        let out = rewrite("see [3].", &map(&[(3, None)]), &CitationFormat::default());
        assert_eq!(out.text, "see \\cite{unresolved}.");
    }

    #[test]
    fn test_every_occurrence_is_replaced() {
        let correspondence = map(&[(1, Some("samekey")), (5, Some("samekey"))]);
        let out = rewrite("[1] and [5], again [1]", &correspondence, &CitationFormat::default());
        assert_eq!(
            out.text,
            "\\cite{samekey} and \\cite{samekey}, again \\cite{samekey}"
        );
        assert_eq!(out.replacements, 3);
    }

    #[test]
    fn test_only_exact_known_markers_change() {
        let correspondence = map(&[(1, Some("a")), (12, Some("b"))]);
        let body = "[01] [1] [12] [121] [ 1] [x] [[12]]";
        let out = rewrite(body, &correspondence, &CitationFormat::default());
        assert_eq!(out.text, "[01] \\cite{a} \\cite{b} [121] [ 1] [x] [\\cite{b}]");
        assert_eq!(out.replacements, 3);
    }

    #[test]
    fn test_custom_command() {
        let format = CitationFormat::new("citep", "TODO").unwrap();
        let out = rewrite("[1][2]", &map(&[(1, Some("k")), (2, None)]), &format);
        assert_eq!(out.text, "\\citep{k}\\citep{TODO}");
    }

    #[test]
    fn test_second_pass_changes_nothing() {
        let correspondence = map(&[(1, Some("a")), (2, None)]);
        let first = rewrite("x [1] y [2] z [3]", &correspondence, &CitationFormat::default());
        let second = rewrite(&first.text, &correspondence, &CitationFormat::default());
        assert_eq!(second.text, first.text);
        assert_eq!(second.replacements, 0);
    }

    #[test]
    fn test_new_rejects_marker_like_values() {
        assert!(CitationFormat::new("cite", "[1]").is_err());
        assert!(CitationFormat::new("cite", "{x}").is_err());
        assert!(CitationFormat::new("cite", "  ").is_err());
        assert!(CitationFormat::new("\\cite", "none").is_err());
        assert!(CitationFormat::new("autocite", "None").is_ok());
    }

    #[test]
    fn test_deserialize_runs_the_same_checks() {
        let err = serde_json::from_str::<CitationFormat>(r#"{"unresolved": "[1]"}"#).unwrap_err();
        assert!(err.to_string().contains("unresolved sentinel"));

        let format: CitationFormat = serde_json::from_str(r#"{"command": "citet"}"#).unwrap();
        assert_eq!(format.command, "citet");
        assert_eq!(format.unresolved, "unresolved");
    }
}
