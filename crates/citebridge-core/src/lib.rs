//! Numbered-reference to BibTeX citation translation
//!
//! A word processor bibliography numbers its references `[1]`, `[2]`, ...
//! and quotes each title with typographic quotes. This crate matches those
//! titles against a BibTeX database and rewrites every `[n]` in a body text
//! as `\cite{key}`.
//!
//! The pipeline:
//! - [`segment`] splits the numbered list into [`BibliographyEntry`] values
//! - [`build_correspondence`] maps each ordinal to a database key by
//!   exact comparison of [`canonicalize`]d titles
//! - [`rewrite`] substitutes the markers in the body text
//!
//! References that match nothing become `\cite{unresolved}` so they can be
//! found in the output; only a reference without a quoted title aborts.
//!
//! # Example
//!
//! ```
//! use citebridge_core::{translate, DatabaseEntry, TranslatorConfig};
//!
//! let database = vec![DatabaseEntry::new("muel22").with_field("title", "Deep Learning, 2nd Ed.")];
//! let list = "[1] A. Muller, \u{201c}Deep Learning 2nd Ed\u{201d}, 2022.";
//! let out = translate(&database, list, "as shown in [1]", &TranslatorConfig::default()).unwrap();
//! assert_eq!(out.text, "as shown in \\cite{muel22}");
//! ```

pub mod canonical;
pub mod config;
pub mod correspondence;
pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod rewrite;
pub mod segment;

pub use canonical::{canonicalize, CanonicalTitle};
pub use config::TranslatorConfig;
pub use correspondence::{
    build_correspondence, resolve_with_index, Correspondence, DuplicateTitlePolicy, TitleIndex,
};
pub use error::{Diagnostic, Result, TranslateError};
pub use model::{BibliographyEntry, CorrespondenceMap, DatabaseEntry, Resolution};
pub use pipeline::{run, translate, RunPaths, Translation, TranslationSummary};
pub use rewrite::{rewrite, CitationFormat, Rewritten};
pub use segment::segment;
