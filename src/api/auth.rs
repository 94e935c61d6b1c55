//! Request authentication boundary.
//!
//! Customers present the session token issued at registration in the `token`
//! header; administrators present the configured admin secret in `aToken`.
//! Handlers take [`AuthUser`] or [`AdminAuth`] as an argument and never see
//! unauthenticated requests.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::AppState;
use crate::{
    core::user,
    entities::user::Model as UserModel,
    errors::Error,
};

/// Header carrying a customer session token
pub const USER_TOKEN_HEADER: &str = "token";
/// Header carrying the admin secret (sent as `aToken`; header names are case-insensitive)
pub const ADMIN_TOKEN_HEADER: &str = "atoken";

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn unauthorized() -> Error {
    Error::Unauthorized {
        message: "Not Authorized Login Again".to_string(),
    }
}

/// The customer a request was made by.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserModel);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = header_value(parts, USER_TOKEN_HEADER) else {
            warn!("Rejected {} without a session token", parts.uri.path());
            return Err(unauthorized());
        };

        let account = user::get_user_by_token(&state.database, token)
            .await?
            .ok_or_else(|| {
                warn!("Rejected {} with an unknown session token", parts.uri.path());
                unauthorized()
            })?;

        Ok(Self(account))
    }
}

/// Marker proving the request carried the admin secret.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = header_value(parts, ADMIN_TOKEN_HEADER);

        match (state.config.admin_token.as_deref(), presented) {
            (Some(expected), Some(presented)) if expected == presented => Ok(Self),
            _ => {
                warn!("Rejected admin request to {}", parts.uri.path());
                Err(unauthorized())
            }
        }
    }
}
