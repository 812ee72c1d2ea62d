//! Link classification
//!
//! Decides, purely from a field's value, whether it is plain data, a single
//! cross-reference link or a comma-joined list of links.

use holocron_types::RecordValue;
use tracing::trace;

/// Scheme + host prefix every cross-reference link starts with
pub const LINK_PREFIX: &str = "https://";

/// Marker preceding a link's resource path
pub const API_PATH_MARKER: &str = "api/";

/// Separator of joined link lists
pub const LINK_SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Scalar,
    SingleLink,
    MultiLink,
}

/// Classify one field value.
///
/// Only text and lists (which display comma-joined) can carry links; any
/// other value is a scalar.
pub fn classify(field: &str, value: &RecordValue) -> LinkKind {
    let kind = if value.is_textual() {
        classify_text(&value.display_text())
    } else {
        LinkKind::Scalar
    };
    trace!(field, ?kind, "classified");
    kind
}

/// Classify a display string.
///
/// A multi-link value needs both a separator and every non-empty segment to
/// start with [`LINK_PREFIX`]; a comma in free text is not enough.
pub fn classify_text(text: &str) -> LinkKind {
    if text.contains(LINK_SEPARATOR) {
        let segments = split_links(text);
        if !segments.is_empty() && segments.iter().all(|s| s.starts_with(LINK_PREFIX)) {
            return LinkKind::MultiLink;
        }
    }
    if text.contains(LINK_PREFIX) {
        LinkKind::SingleLink
    } else {
        LinkKind::Scalar
    }
}

/// Split a joined value into trimmed, non-empty segments.
pub fn split_links(text: &str) -> Vec<&str> {
    text.split(LINK_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// The resource path of a link: the part after [`API_PATH_MARKER`], up to
/// any further marker. `None` when the link has no marker or nothing after it.
pub fn link_path(link: &str) -> Option<&str> {
    link.trim()
        .split(API_PATH_MARKER)
        .nth(1)
        .filter(|path| !path.is_empty())
}
