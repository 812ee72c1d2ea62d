//! Upstream catalog client
//!
//! Thin HTTP client for the public catalog API. Responses are returned as
//! status + content type + body text; the caller decides what to make of
//! non-2xx statuses and plain-text bodies.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{CatalogError, Result};

use super::category::Category;

/// A raw upstream response
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
    }

    /// Parse the body as JSON; non-2xx statuses become `UpstreamStatus`.
    pub fn into_json(self) -> Result<Value> {
        if !self.is_success() {
            return Err(CatalogError::UpstreamStatus {
                status: self.status,
                message: Some(self.body),
            });
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: Url,
}

impl UpstreamClient {
    /// `base_url` must end with `/`; `ServerConfig` guarantees it.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// One page of a category listing, optionally filtered by a search term.
    pub async fn list(
        &self,
        category: Category,
        page: Option<&str>,
        search: Option<&str>,
    ) -> Result<UpstreamResponse> {
        let path = format!("{category}/");
        let query: Vec<(&str, &str)> = [("page", page), ("search", search)]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();
        self.get(&path, &query).await
    }

    /// GET a resource path relative to the base URL.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<UpstreamResponse> {
        let url = self.resolve(path)?;
        debug!(url = %url, "upstream request");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(CatalogError::from)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(CatalogError::from)?;

        debug!(status, "upstream response");
        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        let path = validate_path(path)?;
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidPath(format!("{path}: {e}")))
    }
}

/// Accept only relative resource paths that stay under the base URL.
pub fn validate_path(path: &str) -> Result<&str> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.starts_with('\\')
        || path.contains("://")
        || path.split(['/', '\\']).any(|segment| segment == "..");

    if invalid {
        return Err(CatalogError::InvalidPath(path.to_string()));
    }
    Ok(path)
}
