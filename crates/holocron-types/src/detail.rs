//! Detail view types
//!
//! A [`DetailView`] is one catalog record after exclusion filtering and link
//! resolution, ready for display. Field order always matches the source
//! record.

use serde::{Deserialize, Serialize};

use crate::record::RawRecord;

/// Shown wherever a value is empty or could not be resolved.
pub const NONE_DISPLAY: &str = "none";

/// Outcome of resolving one cross-reference link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ResolvedValue {
    /// The proxy answered with a JSON record
    Record(RawRecord),
    /// The proxy answered with plain text (a display name, or alternate-language text)
    Text(String),
    /// The fetch failed or returned nothing usable
    Missing,
}

impl ResolvedValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Display text, `None` when there is nothing to show.
    pub fn display(&self) -> Option<String> {
        match self {
            Self::Record(record) => Some(
                record
                    .title()
                    .map(str::to_string)
                    .unwrap_or_else(|| serde_json::Value::from(record.clone()).to_string()),
            ),
            Self::Text(text) if !text.is_empty() => Some(text.clone()),
            Self::Text(_) | Self::Missing => None,
        }
    }
}

/// Value of one field in a [`DetailView`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Plain display text
    Scalar(String),
    /// Comma-embedded free text split for display (alternate language only)
    Segments(Vec<String>),
    /// A single resolved link
    ResolvedSingle(ResolvedValue),
    /// A comma-joined link list, one entry per link, in link order
    ResolvedList(Vec<ResolvedValue>),
}

impl FieldValue {
    /// One display line per value; empty and unresolved values show as `none`.
    pub fn display_lines(&self) -> Vec<String> {
        let lines: Vec<String> = match self {
            Self::Scalar(text) if text.is_empty() => vec![],
            Self::Scalar(text) => vec![text.clone()],
            Self::Segments(segments) => segments.clone(),
            Self::ResolvedSingle(value) => value.display().into_iter().collect(),
            Self::ResolvedList(values) => values
                .iter()
                .map(|v| v.display().unwrap_or_else(|| NONE_DISPLAY.to_string()))
                .collect(),
        };

        if lines.is_empty() {
            vec![NONE_DISPLAY.to_string()]
        } else {
            lines
        }
    }
}

/// One `(name, value)` pair of a [`DetailView`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub name: String,
    pub value: FieldValue,
}

impl FieldEntry {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Field name with underscores shown as spaces (`eye_color` -> `eye color`)
    pub fn label(&self) -> String {
        display_label(&self.name)
    }
}

/// Human label for a record key
pub fn display_label(key: &str) -> String {
    key.replace('_', " ")
}

/// A fully resolved record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailView {
    pub fields: Vec<FieldEntry>,
}

impl DetailView {
    pub fn new(fields: Vec<FieldEntry>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
