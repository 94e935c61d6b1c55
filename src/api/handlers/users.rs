//! Account registration endpoint.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    api::{AppState, response::ApiJson},
    core::user,
    errors::Result,
};

/// Body of `POST /api/user/register`
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name
    pub name: Option<String>,
    /// Login email
    pub email: Option<String>,
}

/// Response carrying the new session token
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Always true
    pub success: bool,
    /// Session token to send in the `token` header
    pub token: String,
}

/// Creates an account and returns its session token.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let account = user::create_user(
        &state.database,
        payload.name.as_deref().unwrap_or_default(),
        payload.email.as_deref().unwrap_or_default(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            token: account.token,
        }),
    ))
}
