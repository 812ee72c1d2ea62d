//! Record normalization
//!
//! Strips bookkeeping fields and turns the rest into display strings, in
//! record order.

use holocron_types::{FieldValue, RawRecord, RecordValue};

use super::classify::split_links;

/// Fields never shown in a detail view.
///
/// The last three are the alternate-language spellings of `created`,
/// `edited` and `url`; they exist only to be dropped.
pub const EXCLUDED_FIELDS: &[&str] = &[
    "created",
    "edited",
    "url",
    "oarcworaaowowa",
    "wowaahaowowa",
    "hurcan",
];

pub fn is_excluded(name: &str) -> bool {
    EXCLUDED_FIELDS.contains(&name)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ResolveOptions {
    /// Ask the upstream for the alternate display language
    pub alternate_language: bool,
}

impl ResolveOptions {
    pub fn alternate_language() -> Self {
        Self {
            alternate_language: true,
        }
    }
}

/// A field that survived exclusion
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedField {
    pub name: String,
    /// Display text of the value
    pub text: String,
    /// Whether the original value was text (or a list of text), and so may
    /// carry links
    pub textual: bool,
    pub value: RecordValue,
}

/// Drop excluded fields, keep the rest in record order.
pub fn normalize(raw: &RawRecord) -> Vec<NormalizedField> {
    raw.iter()
        .filter(|(name, _)| !is_excluded(name))
        .map(|(name, value)| NormalizedField {
            name: name.to_string(),
            text: value.display_text(),
            textual: value.is_textual(),
            value: value.clone(),
        })
        .collect()
}

/// Display value of a field that is not a link.
///
/// In the alternate language, free text with embedded commas is split into
/// trimmed segments. This never applies to link lists, which are resolved
/// instead.
pub fn scalar_value(field: &NormalizedField, options: ResolveOptions) -> FieldValue {
    if options.alternate_language && field.textual && field.text.contains(',') {
        let segments: Vec<String> = split_links(&field.text)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !segments.is_empty() {
            return FieldValue::Segments(segments);
        }
    }
    FieldValue::Scalar(field.text.clone())
}
