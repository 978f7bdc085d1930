//! Diary record type.
//!
//! A record is one CSV row. Column order is kept exactly as it appears in the
//! header so the prompt shows fields the way the diary author wrote them.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One diary row as ordered `(column, value)` pairs.
///
/// Empty cells are stored as `None` and serialize as JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiaryRecord {
    fields: Vec<(String, Option<String>)>,
}

impl DiaryRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record by pairing header names with row values.
    ///
    /// Empty values become `None`, and so do columns the row is too short
    /// to reach. Values beyond the last header are dropped.
    pub fn from_row<H, V>(headers: H, values: V) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let mut values = values.into_iter();
        let fields = headers
            .into_iter()
            .map(|header| {
                let value = values
                    .next()
                    .map(|v| v.as_ref().to_string())
                    .filter(|v| !v.is_empty());
                (header.into(), value)
            })
            .collect();
        Self { fields }
    }

    /// Appends a field.
    pub fn push(&mut self, column: impl Into<String>, value: Option<String>) {
        self.fields.push((column.into(), value));
    }

    /// Returns the value of a column, if present and non-empty.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Column names in header order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for DiaryRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
