//! citebridge command line
//!
//! ```text
//! citebridge references.bib bibliography.txt body.txt body.tex
//! ```
//!
//! Logging goes to stderr and honours `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::process::ExitCode;

use citebridge_core::{run, RunPaths, TranslatorConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "citebridge",
    version,
    about = "Rewrite numbered [n] reference markers as \\cite{key} using a BibTeX database"
)]
struct Args {
    /// BibTeX file including all references
    bibtex: PathBuf,
    /// Numbered bibliography exported from the word processor
    bibliography: PathBuf,
    /// Text containing numbered markers such as [1]
    input: PathBuf,
    /// Where to write the text with citation commands
    output: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = TranslatorConfig::from_env();
    let paths = RunPaths {
        bibtex: args.bibtex,
        bibliography: args.bibliography,
        input: args.input,
        output: args.output,
    };

    match run(&paths, &config) {
        Ok(translation) => {
            let unresolved = translation.correspondence.unresolved_ordinals();
            if !unresolved.is_empty() {
                tracing::warn!(
                    ?unresolved,
                    "unmatched references were written as \\{}{{{}}}",
                    config.citation.command,
                    config.citation.unresolved
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
