//! Holocron
//!
//! Authenticated browser for a public read-only catalog API.
//!
//! - [`detail`]: turns one catalog record into a display-ready view, resolving
//!   cross-reference links one level deep
//! - [`catalog`]: categories, the upstream client and listing helpers
//! - [`client`]: client of the backend-for-frontend, feeding the resolver
//! - [`api`]: the backend-for-frontend routers (feature `server`)

pub mod catalog;
pub mod client;
pub mod config;
pub mod detail;
pub mod error;
pub mod session;

#[cfg(feature = "server")]
pub mod api;

pub use holocron_types as types;

pub use client::ProxyClient;
pub use config::{ClientConfig, ConfigError, Credentials, ServerConfig};
pub use error::{CatalogError, Result};
pub use session::SessionContext;
