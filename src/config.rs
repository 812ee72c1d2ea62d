//! Environment configuration
//!
//! Server side:
//!   HOLOCRON_BIND_ADDR              listen address (default: 127.0.0.1:1234)
//!   HOLOCRON_UPSTREAM_URL           catalog API base (default: https://swapi.dev/api/)
//!   HOLOCRON_UPSTREAM_TIMEOUT_SECS  upstream request timeout (default: 30)
//!   HOLOCRON_ALLOWED_ORIGIN         CORS origin of the front end (default: http://localhost:3000)
//!   HOLOCRON_LOGIN_REDIRECT         where /logout sends the browser (default: http://localhost:3000/login)
//!   HOLOCRON_SESSION_SECRET         HMAC secret for session cookies (required, >= 32 bytes)
//!   HOLOCRON_SESSION_TTL_SECS       session lifetime (default: 3600)
//!   HOLOCRON_USERNAME               the accepted username (default: Luke)
//!   HOLOCRON_PASSWORD               the accepted password (required)
//!
//! Client side:
//!   HOLOCRON_PROXY_URL              proxy base (default: http://localhost:1234/)
//!   HOLOCRON_FETCH_TIMEOUT_SECS     per-fetch timeout (default: 10)
//!
//! A `.env` file is honoured when the binary calls `dotenvy::dotenv()`.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:1234";
pub const DEFAULT_UPSTREAM_URL: &str = "https://swapi.dev/api/";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_LOGIN_REDIRECT: &str = "http://localhost:3000/login";
pub const DEFAULT_PROXY_URL: &str = "http://localhost:1234/";
pub const DEFAULT_USERNAME: &str = "Luke";
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// The single accepted credential pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Backend-for-frontend settings
#[derive(Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub upstream_url: Url,
    pub upstream_timeout: Duration,
    pub allowed_origin: String,
    pub login_redirect: String,
    pub session_secret: String,
    pub session_ttl: Duration,
    pub credentials: Credentials,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("upstream_url", &self.upstream_url.as_str())
            .field("upstream_timeout", &self.upstream_timeout)
            .field("allowed_origin", &self.allowed_origin)
            .field("login_redirect", &self.login_redirect)
            .field("session_secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let session_secret = required(&lookup, "HOLOCRON_SESSION_SECRET")?;
        if session_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "HOLOCRON_SESSION_SECRET",
                reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
            });
        }

        Ok(Self {
            bind_addr: parsed(&lookup, "HOLOCRON_BIND_ADDR", DEFAULT_BIND_ADDR)?,
            upstream_url: base_url(&lookup, "HOLOCRON_UPSTREAM_URL", DEFAULT_UPSTREAM_URL)?,
            upstream_timeout: seconds(&lookup, "HOLOCRON_UPSTREAM_TIMEOUT_SECS", 30)?,
            allowed_origin: optional(&lookup, "HOLOCRON_ALLOWED_ORIGIN", DEFAULT_ALLOWED_ORIGIN),
            login_redirect: optional(&lookup, "HOLOCRON_LOGIN_REDIRECT", DEFAULT_LOGIN_REDIRECT),
            session_secret,
            session_ttl: seconds(&lookup, "HOLOCRON_SESSION_TTL_SECS", 3600)?,
            credentials: Credentials::new(
                optional(&lookup, "HOLOCRON_USERNAME", DEFAULT_USERNAME),
                required(&lookup, "HOLOCRON_PASSWORD")?,
            ),
        })
    }
}

/// Proxy client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub proxy_url: Url,
    pub fetch_timeout: Duration,
}

impl ClientConfig {
    pub fn new(proxy_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            proxy_url: parse_base_url("HOLOCRON_PROXY_URL", proxy_url)?,
            fetch_timeout: Duration::from_secs(10),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            proxy_url: base_url(&lookup, "HOLOCRON_PROXY_URL", DEFAULT_PROXY_URL)?,
            fetch_timeout: seconds(&lookup, "HOLOCRON_FETCH_TIMEOUT_SECS", 10)?,
        })
    }

    pub fn with_proxy_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.proxy_url = parse_base_url("HOLOCRON_PROXY_URL", raw)?;
        Ok(self)
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| {
        debug!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    optional(lookup, key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            var: key,
            reason: e.to_string(),
        })
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let secs: u64 = parsed(lookup, key, &default.to_string())?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            var: key,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn base_url(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<Url, ConfigError> {
    parse_base_url(key, &optional(lookup, key, default))
}

/// Parse a base URL, forcing a trailing `/` so relative joins append.
fn parse_base_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        var: key,
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            var: key,
            reason: "not a base URL".to_string(),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
