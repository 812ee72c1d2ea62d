//! Detail-view resolution
//!
//! Turns one catalog record into a display-ready [`DetailView`]: bookkeeping
//! fields are dropped, cross-reference links are resolved one level deep
//! and every value is kept in record order.
//!
//! [`DetailView`]: holocron_types::DetailView

pub mod classify;
pub mod fanout;
pub mod fetcher;
pub mod normalize;
pub mod pipeline;
pub mod viewer;

pub use classify::{classify, classify_text, link_path, LinkKind};
pub use fanout::resolve_all;
pub use fetcher::{ReferenceFetcher, ReferenceResolver};
pub use normalize::{normalize, ResolveOptions, EXCLUDED_FIELDS};
pub use pipeline::{DetailRequest, DetailResolver, RecordSource};
pub use viewer::{DetailViewer, ViewState};
