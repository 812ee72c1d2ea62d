//! Error types for catalog access
//!
//! One taxonomy covers both the upstream catalog (seen from the proxy) and
//! the proxy (seen from the resolver). Whether an error aborts a detail view
//! or degrades a single field to `none` is decided by the caller, not here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network or connectivity failure, including timeouts
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response
    #[error("upstream returned status {status}")]
    UpstreamStatus {
        status: u16,
        message: Option<String>,
    },

    /// A link without the `api/` path marker
    #[error("malformed link: {0}")]
    MalformedLink(String),

    /// No session credential, or the credential has expired
    #[error("session missing or expired")]
    AuthExpired,

    /// A 2xx response whose body could not be decoded
    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("invalid resource path: {0}")]
    InvalidPath(String),
}

impl CatalogError {
    pub fn upstream_status(status: u16) -> Self {
        Self::UpstreamStatus {
            status,
            message: None,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::Transport(_) | Self::Decode(_) => 500,
            Self::UpstreamStatus { status, .. } => *status,
            Self::MalformedLink(_) | Self::UnknownCategory(_) | Self::InvalidPath(_) => 400,
            Self::AuthExpired => 401,
        }
    }

    /// Whether asking again could succeed without the caller changing anything.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Decode(_) => true,
            Self::UpstreamStatus { status, .. } => *status >= 500,
            Self::MalformedLink(_)
            | Self::AuthExpired
            | Self::UnknownCategory(_)
            | Self::InvalidPath(_) => false,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::Decode(e.to_string());
        }
        if let Some(status) = e.status() {
            return Self::upstream_status(status.as_u16());
        }
        if e.is_timeout() {
            return Self::Transport(format!("request timed out: {e}"));
        }
        Self::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    // ── http_status ──────────────────────────────────────────────

    #[test]
    fn http_status_transport() {
        assert_eq!(CatalogError::Transport("x".into()).http_status(), 500);
    }

    #[test]
    fn http_status_upstream_passthrough() {
        assert_eq!(CatalogError::upstream_status(404).http_status(), 404);
        assert_eq!(CatalogError::upstream_status(503).http_status(), 503);
    }

    #[test]
    fn http_status_client_side() {
        assert_eq!(CatalogError::MalformedLink("x".into()).http_status(), 400);
        assert_eq!(CatalogError::UnknownCategory("x".into()).http_status(), 400);
        assert_eq!(CatalogError::InvalidPath("x".into()).http_status(), 400);
        assert_eq!(CatalogError::AuthExpired.http_status(), 401);
    }

    // ── retryability ─────────────────────────────────────────────

    #[test]
    fn server_side_failures_are_retryable() {
        assert!(CatalogError::Transport("reset".into()).is_retryable());
        assert!(CatalogError::Decode("eof".into()).is_retryable());
        assert!(CatalogError::upstream_status(500).is_retryable());
    }

    #[test]
    fn client_side_failures_are_not_retryable() {
        assert!(!CatalogError::upstream_status(404).is_retryable());
        assert!(!CatalogError::AuthExpired.is_retryable());
        assert!(!CatalogError::MalformedLink("x".into()).is_retryable());
    }

    #[test]
    fn display_upstream_status() {
        assert_eq!(
            CatalogError::upstream_status(404).to_string(),
            "upstream returned status 404"
        );
    }
}
