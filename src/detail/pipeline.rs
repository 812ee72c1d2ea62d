//! Detail resolution pipeline
//!
//! ```text
//! fetch record ─► normalize ─► per field (concurrent):
//!                                 Scalar     ─► display text / segments
//!                                 SingleLink ─► ReferenceResolver
//!                                 MultiLink  ─► resolve_all
//!                             ─► join in field order ─► DetailView
//! ```
//!
//! A failed record fetch fails the whole view. A failed link only blanks
//! that one value.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use holocron_types::{DetailView, FieldEntry, FieldValue, RawRecord};
use tracing::{debug, error, info_span, Instrument};

use crate::catalog::Category;
use crate::error::{CatalogError, Result};

use super::classify::{classify, LinkKind};
use super::fanout::resolve_all;
use super::fetcher::{ReferenceFetcher, ReferenceResolver};
use super::normalize::{normalize, scalar_value, NormalizedField, ResolveOptions};

/// Fetches the record a detail view is built from
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_record(
        &self,
        category: Category,
        id: &str,
        options: ResolveOptions,
    ) -> Result<RawRecord>;
}

/// What a detail view is keyed on; a change of any part restarts resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DetailRequest {
    pub category: Category,
    pub id: String,
    pub options: ResolveOptions,
}

impl DetailRequest {
    pub fn new(category: Category, id: impl Into<String>, options: ResolveOptions) -> Self {
        Self {
            category,
            id: id.into(),
            options,
        }
    }

    /// The options actually in effect; the alternate language is dropped for
    /// categories that do not have one.
    pub fn effective_options(&self) -> ResolveOptions {
        ResolveOptions {
            alternate_language: self.options.alternate_language
                && self.category.supports_alternate_language(),
        }
    }
}

#[derive(Clone)]
pub struct DetailResolver {
    source: Arc<dyn RecordSource>,
    references: ReferenceResolver,
}

impl DetailResolver {
    pub fn new(source: Arc<dyn RecordSource>, references: ReferenceResolver) -> Self {
        Self { source, references }
    }

    /// One client serving both seams, with the given per-fetch timeout.
    pub fn from_client<C>(client: Arc<C>, timeout: Duration) -> Self
    where
        C: RecordSource + ReferenceFetcher + 'static,
    {
        let references = ReferenceResolver::new(client.clone(), timeout);
        Self::new(client, references)
    }

    /// Fetch a record and resolve it into a [`DetailView`].
    pub async fn resolve_details(&self, request: &DetailRequest) -> Result<DetailView> {
        let options = request.effective_options();
        let span = info_span!(
            "resolve_details",
            category = %request.category,
            id = %request.id,
            alternate_language = options.alternate_language
        );

        async {
            debug!("fetching record");
            let timeout = self.references.timeout();
            let fetched = tokio::time::timeout(
                timeout,
                self.source
                    .fetch_record(request.category, &request.id, options),
            )
            .await
            .map_err(|_| CatalogError::Transport(format!("timed out after {timeout:?}")))
            .and_then(|result| result);

            let raw = match fetched {
                Ok(raw) => raw,
                Err(e) => {
                    error!(error = %e, "record fetch failed");
                    return Err(e);
                }
            };

            let view = self.resolve_record(&raw, options).await;
            debug!(fields = view.len(), "detail view assembled");
            Ok(view)
        }
        .instrument(span)
        .await
    }

    /// Resolve an already fetched record. Never fails.
    pub async fn resolve_record(&self, raw: &RawRecord, options: ResolveOptions) -> DetailView {
        let fields = normalize(raw);
        debug!(fields = fields.len(), "record normalized");

        let entries = join_all(fields.iter().map(|field| self.resolve_field(field, options))).await;
        DetailView::new(entries)
    }

    async fn resolve_field(&self, field: &NormalizedField, options: ResolveOptions) -> FieldEntry {
        match classify(&field.name, &field.value) {
            LinkKind::Scalar => FieldEntry::new(&field.name, scalar_value(field, options)),
            LinkKind::SingleLink => FieldEntry::new(
                &field.name,
                FieldValue::ResolvedSingle(self.references.resolve(&field.text).await),
            ),
            LinkKind::MultiLink => resolve_all(&self.references, &field.name, &field.text).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::fetcher::tests::{StubFetcher, StubResponse};
    use holocron_types::{RecordValue, ResolvedValue};
    use std::sync::Mutex;

    /// Serves one record, or fails with a fixed status.
    struct StubSource {
        record: std::result::Result<RawRecord, u16>,
        seen: Mutex<Vec<(Category, String, ResolveOptions)>>,
    }

    impl StubSource {
        fn serving(record: RawRecord) -> Self {
            Self {
                record: Ok(record),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                record: Err(status),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RecordSource for StubSource {
        async fn fetch_record(
            &self,
            category: Category,
            id: &str,
            options: ResolveOptions,
        ) -> Result<RawRecord> {
            self.seen
                .lock()
                .unwrap()
                .push((category, id.to_string(), options));
            self.record
                .clone()
                .map_err(CatalogError::upstream_status)
        }
    }

    fn luke() -> RawRecord {
        RawRecord::new()
            .with("name", "Luke")
            .with("homeworld", "https://api/planets/1")
            .with("created", "2020")
            .with("films", "https://api/films/1,https://api/films/2")
    }

    fn luke_fetcher() -> StubFetcher {
        StubFetcher::default()
            .with("planets/1", StubResponse::Json(r#"{"name":"Tatooine"}"#))
            .with("films/1", StubResponse::Json(r#"{"title":"A New Hope"}"#))
            .with("films/2", StubResponse::Json(r#"{"title":"Empire"}"#))
    }

    fn resolver(source: StubSource, fetcher: StubFetcher) -> DetailResolver {
        DetailResolver::new(
            Arc::new(source),
            ReferenceResolver::new(Arc::new(fetcher), Duration::from_secs(1)),
        )
    }

    fn request(category: Category) -> DetailRequest {
        DetailRequest::new(category, "1", ResolveOptions::default())
    }

    #[tokio::test]
    async fn resolves_luke() {
        let resolver = resolver(StubSource::serving(luke()), luke_fetcher());
        let view = resolver.resolve_details(&request(Category::People)).await.unwrap();

        assert_eq!(
            view,
            DetailView::new(vec![
                FieldEntry::new("name", FieldValue::Scalar("Luke".into())),
                FieldEntry::new(
                    "homeworld",
                    FieldValue::ResolvedSingle(ResolvedValue::Record(
                        RawRecord::new().with("name", "Tatooine")
                    )),
                ),
                FieldEntry::new(
                    "films",
                    FieldValue::ResolvedList(vec![
                        ResolvedValue::Record(RawRecord::new().with("title", "A New Hope")),
                        ResolvedValue::Record(RawRecord::new().with("title", "Empire")),
                    ]),
                ),
            ])
        );
    }

    #[tokio::test]
    async fn missing_link_still_succeeds() {
        let record = RawRecord::new()
            .with("name", "Luke")
            .with("homeworld", "https://swapi.dev/api/planets/999/");
        let resolver = resolver(StubSource::serving(record), StubFetcher::default());

        let view = resolver.resolve_details(&request(Category::People)).await.unwrap();
        assert_eq!(
            view.get("homeworld"),
            Some(&FieldValue::ResolvedSingle(ResolvedValue::Missing))
        );
        assert_eq!(view.get("homeworld").unwrap().display_lines(), vec!["none"]);
    }

    #[tokio::test]
    async fn failed_record_fetch_fails_the_view() {
        let fetcher = Arc::new(luke_fetcher());
        let resolver = DetailResolver::new(
            Arc::new(StubSource::failing(500)),
            ReferenceResolver::new(fetcher.clone(), Duration::from_secs(1)),
        );

        let err = resolver
            .resolve_details(&request(Category::People))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::UpstreamStatus { status: 500, .. }));
        assert!(err.is_retryable());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let resolver = resolver(StubSource::serving(luke()), luke_fetcher());
        let first = resolver.resolve_details(&request(Category::People)).await.unwrap();
        let second = resolver.resolve_details(&request(Category::People)).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn non_text_values_pass_through() {
        let record = RawRecord::new()
            .with("episode_id", 4)
            .with("characters", RecordValue::List(vec![]))
            .with("producer", "Gary Kurtz, Rick McCallum");
        let resolver = resolver(StubSource::serving(record.clone()), StubFetcher::default());

        let view = resolver
            .resolve_record(&record, ResolveOptions::default())
            .await;
        assert_eq!(view.names(), vec!["episode_id", "characters", "producer"]);
        assert_eq!(view.get("episode_id"), Some(&FieldValue::Scalar("4".into())));
        assert_eq!(view.get("characters"), Some(&FieldValue::Scalar(String::new())));
        assert_eq!(
            view.get("producer"),
            Some(&FieldValue::Scalar("Gary Kurtz, Rick McCallum".into()))
        );
    }

    #[tokio::test]
    async fn alternate_language_splits_scalars_only() {
        let record = RawRecord::new()
            .with("rhaahrcaoac_roworarc", "hurooo, rhohurwo")
            .with("akooaoaoakc", "https://api/films/1,https://api/films/2");
        let fetcher = StubFetcher::default()
            .with("films/1", StubResponse::Text("Ahwhwo Nwoohw Hooakwo"))
            .with("films/2", StubResponse::Text("Wowhawrawhrc"));
        let source = StubSource::serving(record);
        let resolver = resolver(source, fetcher);

        let request = DetailRequest::new(Category::People, "1", ResolveOptions::alternate_language());
        let view = resolver.resolve_details(&request).await.unwrap();

        assert_eq!(
            view.get("rhaahrcaoac_roworarc"),
            Some(&FieldValue::Segments(vec!["hurooo".into(), "rhohurwo".into()]))
        );
        assert_eq!(
            view.get("akooaoaoakc"),
            Some(&FieldValue::ResolvedList(vec![
                ResolvedValue::Text("Ahwhwo Nwoohw Hooakwo".into()),
                ResolvedValue::Text("Wowhawrawhrc".into()),
            ]))
        );
    }

    #[tokio::test]
    async fn films_ignore_alternate_language() {
        let source = Arc::new(StubSource::serving(
            RawRecord::new().with("producer", "Gary Kurtz, Rick McCallum"),
        ));
        let resolver = DetailResolver::new(
            source.clone(),
            ReferenceResolver::new(Arc::new(StubFetcher::default()), Duration::from_secs(1)),
        );

        let request = DetailRequest::new(Category::Films, "1", ResolveOptions::alternate_language());
        let view = resolver.resolve_details(&request).await.unwrap();

        assert_eq!(
            view.get("producer"),
            Some(&FieldValue::Scalar("Gary Kurtz, Rick McCallum".into()))
        );
        let seen = source.seen.lock().unwrap();
        assert_eq!(seen[0].2, ResolveOptions::default());
    }

    #[tokio::test(start_paused = true)]
    async fn fields_are_resolved_concurrently() {
        let record = RawRecord::new()
            .with("homeworld", "https://swapi.dev/api/planets/1/")
            .with("species", "https://swapi.dev/api/species/1/")
            .with("vehicles", "https://swapi.dev/api/vehicles/14/,https://swapi.dev/api/vehicles/30/")
            .with("starships", "https://swapi.dev/api/starships/12/");
        let fetcher = StubFetcher::default()
            .with("planets/1/", StubResponse::Slow("Tatooine"))
            .with("species/1/", StubResponse::Slow("Human"))
            .with("vehicles/14/", StubResponse::Slow("Snowspeeder"))
            .with("vehicles/30/", StubResponse::Slow("Imperial Speeder Bike"))
            .with("starships/12/", StubResponse::Slow("X-wing"));
        // Field-by-field resolution would need four seconds
        let resolver = DetailResolver::new(
            Arc::new(StubSource::serving(record.clone())),
            ReferenceResolver::new(Arc::new(fetcher), Duration::from_secs(3)),
        );
        let started = tokio::time::Instant::now();

        let view = resolver
            .resolve_record(&record, ResolveOptions::default())
            .await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(
            view.get("homeworld"),
            Some(&FieldValue::ResolvedSingle(ResolvedValue::Text("Tatooine".into())))
        );
        assert_eq!(
            view.get("vehicles").unwrap().display_lines(),
            vec!["Snowspeeder", "Imperial Speeder Bike"]
        );
        assert_eq!(
            view.get("starships"),
            Some(&FieldValue::ResolvedSingle(ResolvedValue::Text("X-wing".into())))
        );
    }
}
