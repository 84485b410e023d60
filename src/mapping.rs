//! Keyword → category lookup tables.
//!
//! Four independently loaded tables (algorithms, NFRs, backend technologies,
//! integration mechanisms) classify normalized element labels into domain
//! categories. Tables are plain data: the library parses them from text and
//! the caller decides where that text comes from. The four tables are
//! independent namespaces; the same keyword may map differently across them.
//!
//! File format, one entry per line:
//!
//! ```text
//! # comment
//! metodo a => MonteCarlo
//! base de datos => Database
//! ```
//!
//! A non-blank line without the `=>` separator is unusable; it is skipped
//! with a warning and processing continues.

use indexmap::IndexMap;

use crate::text::normalize_label;

/// A single keyword → category lookup table.
///
/// Keywords are stored in normalized form (lower-case, diacritic-free) and
/// matched as substrings of normalized labels, so "metodo a" matches the
/// element "Método A (rápido)". Entries keep file order, which makes
/// classification deterministic when several keywords match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: IndexMap<String, String>,
}

impl MappingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from line-oriented `keyword => category` text.
    ///
    /// Blank lines and `#` comments are skipped silently; malformed lines
    /// are skipped with a warning.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((keyword, category)) = line.split_once("=>") else {
                tracing::warn!(line = number + 1, "mapping line has no '=>' separator, skipped");
                continue;
            };
            let keyword = normalize_label(keyword);
            let category = category.trim();
            if keyword.is_empty() || category.is_empty() {
                tracing::warn!(line = number + 1, "mapping line has an empty side, skipped");
                continue;
            }
            table.insert(keyword, category);
        }
        table
    }

    /// Insert an entry. The keyword is normalized; a repeated keyword
    /// keeps its original position but takes the new category.
    pub fn insert(&mut self, keyword: impl AsRef<str>, category: impl Into<String>) {
        self.entries
            .insert(normalize_label(keyword.as_ref()), category.into());
    }

    /// All categories whose keyword occurs in the normalized text, in
    /// table order. Repeated categories are not deduplicated here.
    pub fn matches<'a>(&'a self, normalized_text: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(keyword, _)| normalized_text.contains(keyword.as_str()))
            .map(|(_, category)| category.as_str())
    }

    /// First matching category, if any. Used for feature-name suffixes.
    pub fn first_match<'a>(&'a self, normalized_text: &'a str) -> Option<&'a str> {
        self.matches(normalized_text).next()
    }

    /// Iterate over the category labels in table order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The four classification tables, injected into the tree builder as one
/// immutable value. Read-only for the duration of a run and safe to share
/// across runs.
#[derive(Clone, Debug, Default)]
pub struct MappingSet {
    pub algorithms: MappingTable,
    pub nfrs: MappingTable,
    pub backend: MappingTable,
    pub integration: MappingTable,
}

impl MappingSet {
    /// An empty mapping set; classification becomes a no-op.
    pub fn empty() -> Self {
        Self::default()
    }
}
