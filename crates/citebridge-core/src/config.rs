//! Run configuration
//!
//! The command line only takes file paths. The few knobs that exist are
//! read from the environment:
//!
//! | Variable                      | Default      |
//! |-------------------------------|--------------|
//! | `CITEBRIDGE_CITE_COMMAND`     | `cite`       |
//! | `CITEBRIDGE_UNRESOLVED`       | `unresolved` |
//! | `CITEBRIDGE_DUPLICATE_TITLES` | `first-seen` |
//!
//! Invalid values are logged and replaced by the default.

use serde::{Deserialize, Serialize};

use crate::correspondence::DuplicateTitlePolicy;
use crate::rewrite::{is_command_name, is_usable_key, CitationFormat};

pub const ENV_CITE_COMMAND: &str = "CITEBRIDGE_CITE_COMMAND";
pub const ENV_UNRESOLVED: &str = "CITEBRIDGE_UNRESOLVED";
pub const ENV_DUPLICATE_TITLES: &str = "CITEBRIDGE_DUPLICATE_TITLES";

/// Deserializing rejects the same values `from_lookup` would warn about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub citation: CitationFormat,
    pub duplicate_titles: DuplicateTitlePolicy,
}

impl TranslatorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset variables keep their default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(command) = lookup(ENV_CITE_COMMAND) {
            if is_command_name(&command) {
                config.citation.command = command;
            } else {
                tracing::warn!(
                    "{} must be a LaTeX command name, got '{}', using '{}'",
                    ENV_CITE_COMMAND,
                    command,
                    config.citation.command
                );
            }
        }

        if let Some(sentinel) = lookup(ENV_UNRESOLVED) {
            if is_usable_key(&sentinel) {
                config.citation.unresolved = sentinel;
            } else {
                tracing::warn!(
                    "{} must be non-empty without brackets or braces, got '{}', using '{}'",
                    ENV_UNRESOLVED,
                    sentinel,
                    config.citation.unresolved
                );
            }
        }

        if let Some(policy) = lookup(ENV_DUPLICATE_TITLES) {
            match policy.parse() {
                Ok(policy) => config.duplicate_titles = policy,
                Err(e) => tracing::warn!("{}: {}, using first-seen", ENV_DUPLICATE_TITLES, e),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = TranslatorConfig::from_lookup(lookup(&[]));
        assert_eq!(config, TranslatorConfig::default());
        assert_eq!(config.citation.command, "cite");
        assert_eq!(config.citation.unresolved, "unresolved");
        assert_eq!(config.duplicate_titles, DuplicateTitlePolicy::FirstSeen);
    }

    #[test]
    fn test_valid_overrides_apply() {
        let config = TranslatorConfig::from_lookup(lookup(&[
            (ENV_CITE_COMMAND, "citep"),
            (ENV_UNRESOLVED, "None"),
            (ENV_DUPLICATE_TITLES, "reject"),
        ]));
        assert_eq!(config.citation.command, "citep");
        assert_eq!(config.citation.unresolved, "None");
        assert_eq!(config.duplicate_titles, DuplicateTitlePolicy::Reject);
    }

    #[test]
    fn test_invalid_overrides_fall_back() {
        let config = TranslatorConfig::from_lookup(lookup(&[
            (ENV_CITE_COMMAND, "\\cite"),
            (ENV_UNRESOLVED, "[0]"),
            (ENV_DUPLICATE_TITLES, "last-seen"),
        ]));
        assert_eq!(config, TranslatorConfig::default());
    }

    #[test]
    fn test_deserializes_partial_config() {
        let json = r#"{"duplicate_titles": "reject", "citation": {"command": "autocite"}}"#;
        let config: TranslatorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.duplicate_titles, DuplicateTitlePolicy::Reject);
        assert_eq!(config.citation.command, "autocite");
        assert_eq!(config.citation.unresolved, "unresolved");
    }

    #[test]
    fn test_deserialize_rejects_bracketed_sentinel() {
        for json in [
            r#"{"citation": {"unresolved": "[1]"}}"#,
            r#"{"citation": {"command": "cite{"}}"#,
        ] {
            assert!(serde_json::from_str::<TranslatorConfig>(json).is_err(), "{}", json);
        }
    }
}
