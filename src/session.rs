//! Session context
//!
//! The session credential is the opaque value of the `session` cookie issued
//! by `POST /login`. It is threaded explicitly through every outbound call
//! together with its expiry, so a caller can tell an expired session apart
//! from a failed fetch without asking the server.

use chrono::{DateTime, Duration, Utc};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    credential: String,
    expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(credential: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            credential: credential.into(),
            expires_at,
        }
    }

    /// Parse a `Set-Cookie` header value.
    ///
    /// Returns `None` unless the header sets the session cookie to a
    /// non-empty value with a positive `Max-Age`.
    pub fn from_set_cookie(header: &str, now: DateTime<Utc>) -> Option<Self> {
        let mut parts = header.split(';').map(str::trim);

        let (name, value) = parts.next()?.split_once('=')?;
        if name.trim() != SESSION_COOKIE || value.trim().is_empty() {
            return None;
        }

        let max_age = parts.find_map(|attr| {
            let (key, val) = attr.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("max-age")
                .then(|| val.trim().parse::<i64>().ok())
                .flatten()
        })?;
        if max_age <= 0 {
            return None;
        }

        Some(Self::new(value.trim(), now + Duration::seconds(max_age)))
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Value for an outbound `Cookie` header
    pub fn cookie_header(&self) -> String {
        format!("{SESSION_COOKIE}={}", self.credential)
    }
}
