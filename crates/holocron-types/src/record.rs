//! Catalog records
//!
//! The upstream record shape varies by category and is never modelled per
//! category. A [`RawRecord`] is an ordered string-keyed map over a small
//! closed set of [`RecordValue`] variants; everything downstream works on it
//! structurally.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A value inside a [`RawRecord`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RecordValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<RecordValue>),
    Record(RawRecord),
}

impl RecordValue {
    /// True for values whose display text may carry links or comma-joined lists.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text(_) | Self::List(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Display text of the value.
    ///
    /// Lists join their elements with `,`, which is how a list of link URLs
    /// becomes a comma-joined link string. Nested records show their title or
    /// name, falling back to compact JSON.
    pub fn display_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(text) => text.clone(),
            Self::List(items) => items
                .iter()
                .map(RecordValue::display_text)
                .collect::<Vec<_>>()
                .join(","),
            Self::Record(record) => match record.title() {
                Some(title) => title.to_string(),
                None => Value::from(record.clone()).to_string(),
            },
        }
    }
}

impl From<Value> for RecordValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Record(RawRecord::from(map)),
        }
    }
}

impl From<RecordValue> for Value {
    fn from(value: RecordValue) -> Self {
        match value {
            RecordValue::Null => Value::Null,
            RecordValue::Bool(b) => Value::Bool(b),
            RecordValue::Number(n) => Value::Number(n),
            RecordValue::Text(s) => Value::String(s),
            RecordValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            RecordValue::Record(record) => Value::from(record),
        }
    }
}

impl From<&str> for RecordValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i32> for RecordValue {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for RecordValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// One catalog record, fields in upstream document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct RawRecord {
    fields: Vec<(String, RecordValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for fixtures.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RecordValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a field. An existing field keeps its position and gets the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RecordValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RecordValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The record's display name: a non-empty `title`, else a non-empty `name`.
    pub fn title(&self) -> Option<&str> {
        ["title", "name"]
            .iter()
            .filter_map(|key| self.get(key).and_then(RecordValue::as_text))
            .find(|text| !text.is_empty())
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            fields: map
                .into_iter()
                .map(|(name, value)| (name, RecordValue::from(value)))
                .collect(),
        }
    }
}

impl From<RawRecord> for Map<String, Value> {
    fn from(record: RawRecord) -> Self {
        record
            .fields
            .into_iter()
            .map(|(name, value)| (name, Value::from(value)))
            .collect()
    }
}

impl From<RawRecord> for Value {
    fn from(record: RawRecord) -> Self {
        Value::Object(record.into())
    }
}

impl From<RawRecord> for RecordValue {
    fn from(record: RawRecord) -> Self {
        Self::Record(record)
    }
}

impl FromIterator<(String, RecordValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, RecordValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}
