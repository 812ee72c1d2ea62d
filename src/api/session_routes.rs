//! Session Routes
//!
//! - `POST /login`  exchange the fixed credential pair for a session cookie
//! - `GET /logout`  drop the cookie and go back to the login page

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use holocron_types::{LoginRequest, LoginResponse};
use tracing::{info, warn};

use super::auth::cleared_cookie;
use super::error::ApiError;
use super::ApiState;

// =============================================================================
// HANDLERS
// =============================================================================

pub async fn login(
    State(state): State<ApiState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .credentials
        .matches(&request.username, &request.password)
    {
        warn!(username = %request.username, "login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.signer.issue(&request.username)?;
    info!(username = %request.username, "login accepted");

    Ok((
        [(SET_COOKIE, state.signer.cookie(&token))],
        Json(LoginResponse {
            message: "Login successful".to_string(),
        }),
    ))
}

pub async fn logout(State(state): State<ApiState>) -> impl IntoResponse {
    (
        [(SET_COOKIE, cleared_cookie())],
        Redirect::to(&state.login_redirect),
    )
}
