//! Fan-out over comma-joined link lists

use futures::future::join_all;
use holocron_types::{FieldEntry, FieldValue, ResolvedValue};
use tracing::debug;

use super::classify::split_links;
use super::fetcher::ReferenceResolver;

/// Resolve every link of a joined list concurrently.
///
/// Waits for all of them; the result has one entry per non-empty segment,
/// in segment order, whatever each fetch's outcome.
pub async fn resolve_all(resolver: &ReferenceResolver, field: &str, joined: &str) -> FieldEntry {
    let links = split_links(joined);
    debug!(field, links = links.len(), "resolving link list");

    let values: Vec<ResolvedValue> = join_all(links.iter().map(|link| resolver.resolve(link))).await;
    FieldEntry::new(field, FieldValue::ResolvedList(values))
}
