//! BibTeX parser implementation using nom
//!
//! Handles the subset of BibTeX that real-world `.bib` exports contain:
//! - `@string` definitions, with `#` concatenation and macro references
//! - `@preamble` and `@comment` records
//! - entries delimited by braces or parentheses
//! - braced values with nested braces, quoted values, bare numbers
//! - `%` comment lines between records

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    IResult,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::entry::BibTeXEntry;

/// Month macros every BibTeX style predefines
const MONTH_MACROS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// What went wrong with a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueKind {
    /// The record could not be parsed and was skipped
    Syntax,
    /// The cite key was already used by an earlier entry
    DuplicateKey,
}

/// A non-fatal problem found while reading, with the line it starts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseIssue {
    pub line: u32,
    pub kind: IssueKind,
    pub message: String,
}

/// Everything read from one BibTeX file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibTeXDatabase {
    /// Entries in file order, cite keys unique (case-insensitive)
    pub entries: Vec<BibTeXEntry>,
    pub preambles: Vec<String>,
    /// `@string` macros, keyed by lowercased name
    pub strings: HashMap<String, String>,
    pub issues: Vec<ParseIssue>,
}

impl BibTeXDatabase {
    /// Look up an entry by cite key (case-insensitive)
    pub fn get(&self, cite_key: &str) -> Option<&BibTeXEntry> {
        let wanted = cite_key.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.cite_key.to_lowercase() == wanted)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push_entry(&mut self, entry: BibTeXEntry) {
        if let Some(first) = self.get(&entry.cite_key) {
            let message = format!(
                "duplicate cite key '{}', first defined on line {}",
                entry.cite_key, first.line
            );
            tracing::warn!(line = entry.line, "{}", message);
            self.issues.push(ParseIssue {
                line: entry.line,
                kind: IssueKind::DuplicateKey,
                message,
            });
            return;
        }
        self.entries.push(entry);
    }
}

/// Error type for inputs that yield nothing usable
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no BibTeX entry could be parsed ({0} malformed records)")]
    NothingParsed(usize),
}

/// Parse a BibTeX document
///
/// Malformed records are reported in [`BibTeXDatabase::issues`]; the call
/// only fails when records were present and none of them parsed.
pub fn parse(input: &str) -> Result<BibTeXDatabase, ParseError> {
    let mut db = BibTeXDatabase::default();
    let mut remaining = input;

    while let Some(record_start) = skip_to_next_record(remaining) {
        let line = line_of(input, record_start);

        match parse_record(record_start, &db.strings) {
            Ok((rest, record)) => {
                match record {
                    Record::Entry(mut entry) => {
                        entry.line = line;
                        db.push_entry(entry);
                    }
                    Record::String(name, value) => {
                        db.strings.insert(name.to_lowercase(), value);
                    }
                    Record::Preamble(text) => db.preambles.push(text),
                    Record::Comment => {}
                }
                remaining = rest;
            }
            Err(_) => {
                let message = format!("cannot parse record '{}'", excerpt(record_start));
                tracing::warn!(line, "{}", message);
                db.issues.push(ParseIssue {
                    line,
                    kind: IssueKind::Syntax,
                    message,
                });
                // Resume after the '@' so the next record still gets a chance
                remaining = &record_start[1..];
            }
        }
    }

    let syntax_issues = db
        .issues
        .iter()
        .filter(|i| i.kind == IssueKind::Syntax)
        .count();
    if db.entries.is_empty() && syntax_issues > 0 {
        return Err(ParseError::NothingParsed(syntax_issues));
    }

    Ok(db)
}

enum Record {
    Entry(BibTeXEntry),
    String(String, String),
    Preamble(String),
    Comment,
}

/// Advance to the next `@`, skipping `%` comment lines
fn skip_to_next_record(input: &str) -> Option<&str> {
    let mut rest = input;
    loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            return None;
        }
        let line_end = trimmed.find('\n');
        if trimmed.starts_with('%') {
            rest = line_end.map_or("", |end| &trimmed[end..]);
            continue;
        }
        match (trimmed.find('@'), line_end) {
            (Some(at), Some(end)) if at < end => return Some(&trimmed[at..]),
            (Some(at), None) => return Some(&trimmed[at..]),
            (_, Some(end)) => rest = &trimmed[end..],
            (None, None) => return None,
        }
    }
}

fn line_of(input: &str, position: &str) -> u32 {
    let offset = input.len() - position.len();
    input[..offset].matches('\n').count() as u32 + 1
}

fn excerpt(input: &str) -> String {
    let first_line = input.lines().next().unwrap_or_default();
    first_line.chars().take(40).collect()
}

fn parse_record<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Record> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, kind) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;
    let (rest, _) = multispace0(rest)?;

    match kind.to_lowercase().as_str() {
        "comment" => {
            let rest = skip_comment_body(rest)?;
            Ok((rest, Record::Comment))
        }
        "string" => {
            let (rest, (name, value)) = parse_string_definition(rest, strings)?;
            Ok((rest, Record::String(name, value)))
        }
        "preamble" => {
            let (rest, text) = parse_preamble(rest, strings)?;
            Ok((rest, Record::Preamble(text)))
        }
        _ => {
            let (rest, entry) = parse_entry_body(rest, kind, strings)?;
            Ok((rest, Record::Entry(entry)))
        }
    }
}

/// Opening delimiter of a record body; returns the matching closer
fn open_body(input: &str) -> IResult<&str, char> {
    map(alt((char('{'), char('('))), |open| {
        if open == '(' {
            ')'
        } else {
            '}'
        }
    })(input)
}

fn skip_comment_body(input: &str) -> Result<&str, nom::Err<nom::error::Error<&str>>> {
    if input.starts_with('{') {
        let (rest, _) = parse_braced_content(input)?;
        Ok(rest)
    } else {
        let end = input.find('\n').unwrap_or(input.len());
        Ok(&input[end..])
    }
}

fn parse_string_definition<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, close) = open_body(input)?;
    let (rest, (name, value)) = parse_single_field(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(close)(rest)?;

    Ok((rest, (name, value)))
}

fn parse_preamble<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let (rest, close) = open_body(input)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(close)(rest)?;

    Ok((rest, value))
}

fn is_cite_key_char(c: char) -> bool {
    c.is_alphanumeric() || "_-:./+'".contains(c)
}

fn is_field_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_-:.+".contains(c)
}

fn parse_entry_body<'a>(
    input: &'a str,
    entry_type: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, BibTeXEntry> {
    let (rest, close) = open_body(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, cite_key) = take_while1(is_cite_key_char)(rest)?;
    let (rest, _) = multispace0(rest)?;

    // `@misc{key}` is legal and carries no fields
    let (rest, fields) = match rest.strip_prefix(',') {
        Some(after_comma) => parse_fields(after_comma, strings, close)?,
        None => (rest, Vec::new()),
    };

    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(close)(rest)?;

    let mut entry = BibTeXEntry::new(cite_key, entry_type);
    for (name, value) in fields {
        entry.add_field(name, value);
    }

    Ok((rest, entry))
}

fn parse_fields<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
    close: char,
) -> IResult<&'a str, Vec<(String, String)>> {
    let mut fields = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;
        if rest.starts_with(close) {
            return Ok((rest, fields));
        }

        match parse_single_field(rest, strings) {
            Ok((rest, field)) => {
                fields.push(field);
                let (rest, _) = multispace0(rest)?;
                remaining = rest.strip_prefix(',').unwrap_or(rest);
            }
            // Let the caller fail on the missing closing delimiter
            Err(_) => return Ok((rest, fields)),
        }
    }
}

fn parse_single_field<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, name) = take_while1(is_field_name_char)(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;

    Ok((rest, (name.to_string(), value)))
}

/// A value is one or more `#`-joined parts
fn parse_field_value<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let mut value = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;
        let (rest, part) = alt((
            parse_braced_value,
            parse_quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), str::to_string),
            map(take_while1(is_field_name_char), |name: &str| {
                expand_macro(name, strings)
            }),
        ))(rest)?;
        value.push_str(&part);

        let (rest, _) = multispace0(rest)?;
        match rest.strip_prefix('#') {
            Some(after_hash) => remaining = after_hash,
            None => return Ok((rest, value)),
        }
    }
}

fn expand_macro(name: &str, strings: &HashMap<String, String>) -> String {
    let lower = name.to_lowercase();
    if let Some(value) = strings.get(&lower) {
        return value.clone();
    }
    MONTH_MACROS
        .iter()
        .find(|(abbrev, _)| *abbrev == lower)
        .map(|(_, month)| month.to_string())
        .unwrap_or_else(|| name.to_string())
}

fn parse_braced_value(input: &str) -> IResult<&str, String> {
    let (rest, content) = parse_braced_content(input)?;
    Ok((rest, content[1..content.len() - 1].to_string()))
}

/// Braced content including the outer braces; nesting is tracked
fn parse_braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(char_error(input));
    }

    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(char_error(input))
}

/// Quoted value; a `"` inside braces does not terminate it
fn parse_quoted_value(input: &str) -> IResult<&str, String> {
    let Some(body) = input.strip_prefix('"') else {
        return Err(char_error(input));
    };

    let mut depth = 0usize;
    let mut escaped = false;

    for (pos, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '"' if depth == 0 => {
                return Ok((&body[pos + 1..], body[..pos].to_string()));
            }
            _ => {}
        }
    }

    Err(char_error(input))
}

fn char_error(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char))
}
