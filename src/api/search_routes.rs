//! Search Routes
//!
//! Authenticated passthrough to the upstream catalog:
//! - `GET /search?category&page&search`  one page of a category listing
//! - `GET /search/detail/*path`          display name of one record, as text
//! - `GET /search/*path?format`          one record, verbatim

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use holocron_types::RawRecord;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::catalog::Category;

use super::error::ApiError;
use super::ApiState;

/// Prefix of the display-name variant
pub const DETAIL_PREFIX: &str = "detail/";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Optional here so a missing category still gets an error envelope
    pub category: Option<String>,
    pub page: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    pub format: Option<String>,
}

// =============================================================================
// HANDLERS
// =============================================================================

pub async fn search(
    State(state): State<ApiState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, ApiError> {
    let category: Category = query
        .category
        .as_deref()
        .ok_or(ApiError::MissingCategory)?
        .parse()?;
    debug!(category = %category, page = ?query.page, search = ?query.search, "listing");

    let response = state
        .upstream
        .list(category, query.page.as_deref(), query.search.as_deref())
        .await?;
    Ok(Json(response.into_json()?))
}

/// Both `/search/*path` variants: axum cannot route `detail/*` and `*` as
/// siblings, so the prefix is dispatched here.
pub async fn resource(
    State(state): State<ApiState>,
    Path(path): Path<String>,
    Query(query): Query<FormatQuery>,
) -> Result<Response, ApiError> {
    if let Some(path) = path.strip_prefix(DETAIL_PREFIX) {
        return Ok(display_name(&state, path).await?.into_response());
    }

    let format: Vec<(&str, &str)> = query
        .format
        .as_deref()
        .map(|format| ("format", format))
        .into_iter()
        .collect();
    let response = state.upstream.get(&path, &format).await?;
    Ok(Json(response.into_json()?).into_response())
}

async fn display_name(state: &ApiState, path: &str) -> Result<String, ApiError> {
    let response = state.upstream.get(path, &[]).await?;
    let record = match response.into_json()? {
        Value::Object(map) => RawRecord::from(map),
        _ => return Err(ApiError::NotFound),
    };
    record
        .title()
        .map(str::to_string)
        .ok_or(ApiError::NotFound)
}
