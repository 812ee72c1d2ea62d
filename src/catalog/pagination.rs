//! Listing helpers: page arithmetic and table columns

use holocron_types::RawRecord;

use crate::detail::classify::link_path;

/// Records per upstream page
pub const PAGE_SIZE: u64 = 10;

/// Consecutive page links shown around the current page
pub const PAGE_WINDOW: u32 = 3;

/// Columns taken from the first record of a listing
pub const TABLE_COLUMNS: usize = 5;

/// Never shown as a table column, its value is a multi-paragraph crawl.
pub const HIDDEN_COLUMN: &str = "opening_crawl";

/// Number of pages needed for `count` records.
pub fn page_count(count: u64) -> u32 {
    u32::try_from(count.div_ceil(PAGE_SIZE)).unwrap_or(u32::MAX)
}

/// Up to [`PAGE_WINDOW`] consecutive page numbers centred on `current`,
/// clamped to `1..=total`.
pub fn page_window(current: u32, total: u32) -> Vec<u32> {
    if total == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total);
    let half = PAGE_WINDOW / 2;

    let start = current.saturating_sub(half).max(1);
    let end = start.saturating_add(PAGE_WINDOW - 1).min(total);
    let start = end.saturating_sub(PAGE_WINDOW - 1).max(1);
    (start..=end).collect()
}

/// The page to move to, or `None` when `requested` is outside `1..=total`.
pub fn turn_page(requested: u32, total: u32) -> Option<u32> {
    (1..=total).contains(&requested).then_some(requested)
}

/// Table columns for a listing: the first record's first five keys, minus
/// the opening crawl.
pub fn table_headers(record: &RawRecord) -> Vec<&str> {
    record
        .keys()
        .take(TABLE_COLUMNS)
        .filter(|key| *key != HIDDEN_COLUMN)
        .collect()
}

/// Resource path of a record's self `url`, e.g. `people/1/`.
pub fn record_path(record: &RawRecord) -> Option<&str> {
    record
        .get("url")
        .and_then(|value| value.as_text())
        .and_then(link_path)
}
