//! Backend-for-frontend HTTP API
//!
//! ```text
//! public     POST /login
//! protected  GET  /logout
//!            GET  /search?category&page&search
//!            GET  /search/detail/*path
//!            GET  /search/*path?format
//! fallback   404  "You must be lost"
//! ```
//!
//! Protected routes sit behind [`auth::require_session`]. CORS and request
//! tracing are layered on by the server binary.

pub mod auth;
pub mod error;
pub mod search_routes;
pub mod session_routes;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;

use crate::catalog::UpstreamClient;
use crate::config::{Credentials, ServerConfig};
use crate::error::Result;

pub use auth::{SessionClaims, SessionSigner};
pub use error::ApiError;

/// Body of the fallback response
pub const LOST_MESSAGE: &str = "You must be lost";

// =============================================================================
// STATE
// =============================================================================

#[derive(Clone)]
pub struct ApiState {
    pub upstream: UpstreamClient,
    pub signer: Arc<SessionSigner>,
    pub credentials: Credentials,
    pub login_redirect: String,
}

impl ApiState {
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        Ok(Self {
            upstream: UpstreamClient::new(config.upstream_url.clone(), config.upstream_timeout)?,
            signer: Arc::new(SessionSigner::new(
                config.session_secret.as_bytes(),
                config.session_ttl,
            )),
            credentials: config.credentials.clone(),
            login_redirect: config.login_redirect.clone(),
        })
    }
}

// =============================================================================
// ROUTER
// =============================================================================

pub fn create_router(state: ApiState) -> Router {
    // Routes that require a session cookie
    let protected = Router::new()
        .route("/logout", get(session_routes::logout))
        .route("/search", get(search_routes::search))
        .route("/search/*path", get(search_routes::resource))
        .route_layer(axum_mw::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    // Public routes
    let public = Router::new().route("/login", post(session_routes::login));

    public
        .merge(protected)
        .fallback(|| async { (StatusCode::NOT_FOUND, LOST_MESSAGE) })
        .with_state(state)
}
