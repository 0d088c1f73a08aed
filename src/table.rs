//! Header-keyed CSV parsing for staff-maintained spreadsheets.
//!
//! The first row names the fields; every later row becomes a [`Record`]
//! mapping header → cell. Headers and cells are trimmed. Rows whose cells are
//! all empty are dropped without comment. Rows with the wrong number of
//! cells are kept (short rows padded with empty cells, extra cells ignored)
//! and reported as warnings. Rows the CSV reader cannot decode at all are
//! skipped with a warning. A warning never aborts the parse.
//!
//! ## Duplicate headers
//!
//! When two columns share a header, the record keeps the key at the position
//! of the first column and the value of the last one. This is deterministic
//! but otherwise unvalidated.
//!
//! A table left with zero data rows is an error ([`TableError::Empty`]); the
//! loaders treat it as a signal to try their next source.

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("table contained no data rows")]
    Empty,
    #[error("unreadable header row: {0}")]
    Header(String),
}

/// One data row, keyed by header name, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Exact-match lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Case-insensitive lookup; an exact match takes priority.
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| {
            self.fields
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str())
        })
    }

    /// First non-empty value among `keys`, compared case-insensitively.
    pub fn first_non_empty(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get_ignore_case(key))
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every cell is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.trim().is_empty())
    }

    /// Apply `f` to every value, keeping keys and order.
    pub fn map_values(self, f: impl Fn(&str) -> String) -> Self {
        Self {
            fields: self.fields.into_iter().map(|(k, v)| (k, f(&v))).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Result of a successful parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Trimmed header names in column order.
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
    /// Human-readable notes about malformed rows.
    pub warnings: Vec<String>,
}

/// Parse CSV text with a header row into records.
pub fn parse_table(text: &str) -> Result<Table, TableError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| TableError::Header(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    let mut warnings = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                warnings.push(format!("Row {line}: skipped unreadable row ({e})"));
                continue;
            }
        };

        if record.iter().all(str::is_empty) {
            continue;
        }

        if record.len() != headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let detail = if record.len() < headers.len() {
                "missing cells left empty"
            } else {
                "extra cells ignored"
            };
            warnings.push(format!(
                "Row {line}: expected {} fields, found {} ({detail})",
                headers.len(),
                record.len()
            ));
        }

        let row: Record = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.as_str(), record.get(i).unwrap_or("")))
            .collect();
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(TableError::Empty);
    }

    Ok(Table {
        headers,
        rows,
        warnings,
    })
}
