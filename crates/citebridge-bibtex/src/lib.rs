//! BibTeX reading for citebridge
//!
//! The reader keeps entries in file order and guarantees unique cite keys.
//! It is deliberately tolerant: an entry that cannot be parsed is recorded
//! as a [`ParseIssue`] and reading resumes at the next `@`.

mod entry;
pub mod parser;

pub use entry::{BibTeXEntry, BibTeXField};
pub use parser::{parse, BibTeXDatabase, IssueKind, ParseError, ParseIssue};
