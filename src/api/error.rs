//! API error responses
//!
//! Every error the proxy produces itself is an [`ErrorEnvelope`] JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use holocron_types::ErrorEnvelope;
use thiserror::Error;
use tracing::{debug, error};

use crate::error::CatalogError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Missing or expired session")]
    Unauthenticated,

    #[error("No results found for the specified search term")]
    NotFound,

    #[error("A category is required")]
    MissingCategory,

    #[error("could not issue session: {0}")]
    SessionIssue(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MissingCategory => StatusCode::BAD_REQUEST,
            Self::SessionIssue(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Catalog(e) => StatusCode::from_u16(e.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        match self {
            Self::Catalog(CatalogError::UpstreamStatus { status, message }) => {
                let envelope = ErrorEnvelope::new(format!("Upstream error: {status}"));
                match message {
                    Some(message) => envelope.with_message(message.clone()),
                    None => envelope,
                }
            }
            Self::Catalog(e @ (CatalogError::Transport(_) | CatalogError::Decode(_))) => {
                ErrorEnvelope::new("Error during upstream request").with_details(e.to_string())
            }
            Self::Catalog(CatalogError::AuthExpired) => {
                ErrorEnvelope::new(Self::Unauthenticated.to_string())
            }
            Self::SessionIssue(_) => ErrorEnvelope::new("Could not issue session"),
            other => ErrorEnvelope::new(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(self.envelope())).into_response()
    }
}
