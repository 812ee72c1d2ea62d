//! Proxy client
//!
//! HTTP client for the backend-for-frontend. It logs in, carries the session
//! cookie explicitly on every request and serves as both the
//! [`RecordSource`] and the [`ReferenceFetcher`] of the detail resolver.

use async_trait::async_trait;
use chrono::Utc;
use holocron_types::{CatalogPage, LoginRequest, RawRecord};
use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{redirect, Client, Response};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::catalog::{validate_path, Category, UpstreamResponse};
use crate::config::ClientConfig;
use crate::detail::{RecordSource, ReferenceFetcher, ResolveOptions};
use crate::error::{CatalogError, Result};
use crate::session::SessionContext;

/// Query value selecting the alternate display language
pub const ALTERNATE_FORMAT: &str = "wookiee";

#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    base_url: Url,
    session: Option<SessionContext>,
}

impl ProxyClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| CatalogError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.proxy_url.clone(),
            session: None,
        })
    }

    /// A copy of this client that sends `session` on every request.
    pub fn with_session(mut self, session: SessionContext) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    /// Exchange credentials for a session.
    ///
    /// Rejected credentials come back as `UpstreamStatus { status: 401 }`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionContext> {
        let response = self
            .client
            .post(self.url("login")?)
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let status = response.status().as_u16();
        let now = Utc::now();
        let session = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| SessionContext::from_set_cookie(value, now));

        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::UpstreamStatus {
                status,
                message: error_message(&body),
            });
        }

        let session = session
            .ok_or_else(|| CatalogError::Decode("login response set no session cookie".into()))?;
        debug!(expires_at = %session.expires_at(), "logged in");
        Ok(session)
    }

    /// End the session on the proxy.
    pub async fn logout(&self) -> Result<()> {
        let response = self.send("logout", &[]).await?;
        if response.status >= 400 {
            return Err(CatalogError::upstream_status(response.status));
        }
        Ok(())
    }

    /// One page of a category listing.
    pub async fn search(
        &self,
        category: Category,
        page: u32,
        search: Option<&str>,
    ) -> Result<CatalogPage> {
        let page = page.to_string();
        let mut query = vec![("category", category.as_str()), ("page", page.as_str())];
        if let Some(search) = search {
            query.push(("search", search));
        }

        let value = self.send("search", &query).await?.into_json()?;
        Ok(serde_json::from_value(value)?)
    }

    /// GET a proxy path with the session cookie attached.
    ///
    /// Fails with `AuthExpired`, without sending anything, when there is no
    /// live session; a 401 answer maps to `AuthExpired` too.
    async fn send(&self, path: &str, query: &[(&str, &str)]) -> Result<UpstreamResponse> {
        let session = self
            .session
            .as_ref()
            .filter(|session| !session.is_expired())
            .ok_or(CatalogError::AuthExpired)?;

        let response = self
            .client
            .get(self.url(path)?)
            .query(query)
            .header(COOKIE, session.cookie_header())
            .send()
            .await?;

        if response.status().as_u16() == 401 {
            return Err(CatalogError::AuthExpired);
        }
        read_response(response).await
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidPath(format!("{path}: {e}")))
    }
}

async fn read_response(response: Response) -> Result<UpstreamResponse> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.text().await?;
    Ok(UpstreamResponse {
        status,
        content_type,
        body,
    })
}

/// The `error` field of an error envelope, else the raw body.
fn error_message(body: &str) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(Value::as_str).map(str::to_string))
        .or_else(|| Some(body.to_string()))
}

#[async_trait]
impl RecordSource for ProxyClient {
    async fn fetch_record(
        &self,
        category: Category,
        id: &str,
        options: ResolveOptions,
    ) -> Result<RawRecord> {
        let record_path = format!("{category}/{id}/");
        let path = format!("search/{}", validate_path(&record_path)?);
        let query: &[(&str, &str)] = if options.alternate_language {
            &[("format", ALTERNATE_FORMAT)]
        } else {
            &[]
        };

        match self.send(&path, query).await?.into_json()? {
            Value::Object(map) => Ok(RawRecord::from(map)),
            other => Err(CatalogError::Decode(format!(
                "expected a record, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl ReferenceFetcher for ProxyClient {
    async fn fetch_reference(&self, path: &str) -> Result<UpstreamResponse> {
        let path = validate_path(path)?;
        self.send(&format!("search/detail/{path}"), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn client() -> ProxyClient {
        ProxyClient::new(&ClientConfig::new("http://127.0.0.1:9/").unwrap()).unwrap()
    }

    #[tokio::test]
    async fn no_session_fails_without_a_request() {
        let err = client().search(Category::People, 1, None).await.unwrap_err();
        assert!(matches!(err, CatalogError::AuthExpired));
    }

    #[tokio::test]
    async fn expired_session_fails_without_a_request() {
        let client =
            client().with_session(SessionContext::new("abc", Utc::now() - Duration::seconds(1)));
        let err = client
            .fetch_reference("planets/1/")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::AuthExpired));
    }

    fn live_client() -> ProxyClient {
        client().with_session(SessionContext::new("abc", Utc::now() + Duration::hours(1)))
    }

    #[tokio::test]
    async fn escaping_reference_path_is_not_sent() {
        // A sent request would fail with a transport error instead
        let err = live_client()
            .fetch_reference("../../logout")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPath(ref path) if path == "../../logout"));
    }

    #[tokio::test]
    async fn escaping_record_id_is_not_sent() {
        let err = live_client()
            .fetch_record(Category::People, "../../logout", ResolveOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPath(_)));
    }

    #[test]
    fn error_message_prefers_envelope() {
        assert_eq!(
            error_message(r#"{"error":"Invalid username or password"}"#).as_deref(),
            Some("Invalid username or password")
        );
        assert_eq!(error_message("nope").as_deref(), Some("nope"));
        assert_eq!(error_message(""), None);
    }
}
