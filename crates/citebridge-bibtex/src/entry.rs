//! BibTeX entry data structures

use serde::Serialize;

/// A single `name = value` pair of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibTeXField {
    pub name: String,
    pub value: String,
}

/// A parsed BibTeX entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibTeXEntry {
    pub cite_key: String,
    /// Entry type as written, lowercased (`article`, `inproceedings`, ...)
    pub entry_type: String,
    pub fields: Vec<BibTeXField>,
    /// 1-based line of the `@` that opened the entry
    pub line: u32,
}

impl BibTeXEntry {
    pub fn new(cite_key: impl Into<String>, entry_type: &str) -> Self {
        Self {
            cite_key: cite_key.into(),
            entry_type: entry_type.to_lowercase(),
            fields: Vec::new(),
            line: 0,
        }
    }

    /// Add a field; a repeated name keeps the first value, as BibTeX does
    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if self.get_field(&name).is_some() {
            return;
        }
        self.fields.push(BibTeXField {
            name,
            value: value.into(),
        });
    }

    /// Get a field value by name (case-insensitive)
    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.value.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.get_field("title")
    }

    /// Iterate fields as `(lowercased name, value)` pairs
    pub fn fields_lowercase(&self) -> impl Iterator<Item = (String, &str)> {
        self.fields
            .iter()
            .map(|f| (f.name.to_lowercase(), f.value.as_str()))
    }
}
