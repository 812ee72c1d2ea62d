//! Detail view state holder
//!
//! Every navigation gets a fresh request token. In-flight resolutions for an
//! older token are not cancelled; their results are dropped on settlement.
//! State changes are published on a `watch` channel, once when a request is
//! issued and once when it settles.

use std::sync::atomic::{AtomicU64, Ordering};

use holocron_types::DetailView;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{CatalogError, Result};

use super::pipeline::{DetailRequest, DetailResolver};

/// Shown for any failed record fetch
pub const RETRY_MESSAGE: &str = "Could not load this record. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading(DetailRequest),
    Ready {
        request: DetailRequest,
        view: DetailView,
    },
    Failed {
        request: DetailRequest,
        message: String,
    },
    /// The consumer should send the user back to login
    SessionExpired,
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }
}

pub struct DetailViewer {
    resolver: DetailResolver,
    latest: AtomicU64,
    state: watch::Sender<ViewState>,
}

impl DetailViewer {
    pub fn new(resolver: DetailResolver) -> Self {
        let (state, _) = watch::channel(ViewState::Idle);
        Self {
            resolver,
            latest: AtomicU64::new(0),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Resolve `request` and publish the outcome. Returns whether the outcome
    /// was applied (false when a newer request superseded it).
    pub async fn show(&self, request: DetailRequest) -> bool {
        let token = self.issue(&request);
        let result = self.resolver.resolve_details(&request).await;
        self.settle(token, request, result)
    }

    /// Start a request: take the next token and publish `Loading`.
    pub fn issue(&self, request: &DetailRequest) -> u64 {
        let mut token = 0;
        self.state.send_modify(|state| {
            token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = ViewState::Loading(request.clone());
        });
        debug!(token, category = %request.category, id = %request.id, "detail request issued");
        token
    }

    /// Publish the outcome of request `token` unless it has been superseded.
    pub fn settle(&self, token: u64, request: DetailRequest, result: Result<DetailView>) -> bool {
        let next = match result {
            Ok(view) => ViewState::Ready { request, view },
            Err(CatalogError::AuthExpired) => ViewState::SessionExpired,
            Err(_) => ViewState::Failed {
                request,
                message: RETRY_MESSAGE.to_string(),
            },
        };

        let applied = self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != token {
                return false;
            }
            *state = next;
            true
        });
        if !applied {
            debug!(token, "discarding stale detail result");
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use crate::detail::fetcher::tests::StubFetcher;
    use crate::detail::fetcher::ReferenceResolver;
    use crate::detail::normalize::ResolveOptions;
    use crate::detail::pipeline::RecordSource;
    use async_trait::async_trait;
    use holocron_types::{FieldEntry, FieldValue, RawRecord};
    use std::sync::Arc;
    use std::time::Duration;

    /// Answers `name = "record {id}"`, or fails with the configured status.
    struct StubSource {
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl RecordSource for StubSource {
        async fn fetch_record(
            &self,
            _category: Category,
            id: &str,
            _options: ResolveOptions,
        ) -> Result<RawRecord> {
            match self.fail_with {
                Some(401) => Err(CatalogError::AuthExpired),
                Some(status) => Err(CatalogError::upstream_status(status)),
                None => Ok(RawRecord::new().with("name", format!("record {id}"))),
            }
        }
    }

    fn viewer(fail_with: Option<u16>) -> DetailViewer {
        DetailViewer::new(DetailResolver::new(
            Arc::new(StubSource { fail_with }),
            ReferenceResolver::new(Arc::new(StubFetcher::default()), Duration::from_secs(1)),
        ))
    }

    fn request(id: &str) -> DetailRequest {
        DetailRequest::new(Category::People, id, ResolveOptions::default())
    }

    fn view(id: &str) -> DetailView {
        DetailView::new(vec![FieldEntry::new(
            "name",
            FieldValue::Scalar(format!("record {id}")),
        )])
    }

    #[tokio::test]
    async fn show_publishes_ready() {
        let viewer = viewer(None);
        let mut rx = viewer.subscribe();
        assert_eq!(*rx.borrow_and_update(), ViewState::Idle);

        assert!(viewer.show(request("1")).await);
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            viewer.state(),
            ViewState::Ready {
                request: request("1"),
                view: view("1"),
            }
        );
    }

    #[test]
    fn stale_result_is_discarded() {
        let viewer = viewer(None);
        let first = viewer.issue(&request("1"));
        let second = viewer.issue(&request("2"));
        assert!(second > first);

        assert!(!viewer.settle(first, request("1"), Ok(view("1"))));
        assert_eq!(viewer.state(), ViewState::Loading(request("2")));

        assert!(viewer.settle(second, request("2"), Ok(view("2"))));
        assert_eq!(
            viewer.state(),
            ViewState::Ready {
                request: request("2"),
                view: view("2"),
            }
        );
    }

    #[test]
    fn late_failure_does_not_clobber_newer_view() {
        let viewer = viewer(None);
        let first = viewer.issue(&request("1"));
        let second = viewer.issue(&request("2"));
        assert!(viewer.settle(second, request("2"), Ok(view("2"))));

        assert!(!viewer.settle(
            first,
            request("1"),
            Err(CatalogError::upstream_status(500))
        ));
        assert!(matches!(viewer.state(), ViewState::Ready { .. }));
    }

    #[tokio::test]
    async fn failure_is_generic_and_retryable() {
        let viewer = viewer(Some(500));
        viewer.show(request("1")).await;
        assert_eq!(
            viewer.state(),
            ViewState::Failed {
                request: request("1"),
                message: RETRY_MESSAGE.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn expired_session_is_reported() {
        let viewer = viewer(Some(401));
        viewer.show(request("1")).await;
        assert_eq!(viewer.state(), ViewState::SessionExpired);
    }
}
