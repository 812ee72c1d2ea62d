//! Reference fetching
//!
//! [`ReferenceFetcher`] is the seam to whatever serves linked records (the
//! proxy in production, stubs in tests). [`ReferenceResolver`] wraps it with
//! the per-fetch timeout and turns every failure into
//! [`ResolvedValue::Missing`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use holocron_types::{RawRecord, ResolvedValue};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::{validate_path, UpstreamResponse};
use crate::error::{CatalogError, Result};

use super::classify::link_path;

/// Fetches the record behind one resource path
#[async_trait]
pub trait ReferenceFetcher: Send + Sync {
    /// `path` is relative to the catalog root, e.g. `planets/1/`.
    ///
    /// Transport failures are `Err`; any HTTP response, whatever its status,
    /// is `Ok`.
    async fn fetch_reference(&self, path: &str) -> Result<UpstreamResponse>;
}

/// Resolves links one at a time, never failing
#[derive(Clone)]
pub struct ReferenceResolver {
    fetcher: Arc<dyn ReferenceFetcher>,
    timeout: Duration,
}

impl ReferenceResolver {
    pub fn new(fetcher: Arc<dyn ReferenceFetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve one link. Failures are logged and degrade to `Missing`.
    pub async fn resolve(&self, link: &str) -> ResolvedValue {
        match self.try_resolve(link).await {
            Ok(value) => {
                debug!(link = %link, "reference resolved");
                value
            }
            Err(CatalogError::MalformedLink(_)) => {
                debug!(link = %link, "link has no usable resource path, skipping");
                ResolvedValue::Missing
            }
            Err(e) => {
                warn!(link = %link, error = %e, "reference could not be resolved");
                ResolvedValue::Missing
            }
        }
    }

    async fn try_resolve(&self, link: &str) -> Result<ResolvedValue> {
        let path = link_path(link)
            .and_then(|path| validate_path(path).ok())
            .ok_or_else(|| CatalogError::MalformedLink(link.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.fetcher.fetch_reference(path))
            .await
            .map_err(|_| {
                CatalogError::Transport(format!("timed out after {:?}", self.timeout))
            })??;

        if !response.is_success() {
            return Err(CatalogError::upstream_status(response.status));
        }

        if response.is_json() {
            return parse_json_reference(&response.body);
        }
        Ok(ResolvedValue::Text(response.body))
    }
}

fn parse_json_reference(body: &str) -> Result<ResolvedValue> {
    Ok(match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => ResolvedValue::Record(RawRecord::from(map)),
        Value::String(text) => ResolvedValue::Text(text),
        Value::Null => ResolvedValue::Missing,
        other => ResolvedValue::Text(other.to_string()),
    })
}
