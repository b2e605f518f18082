use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// The signed-in user, resolved from a `Bearer` session token.
///
/// Expects tokens in the `Authorization` header as `Bearer <token>`.
/// Tokens must be at least 32 characters and contain only alphanumeric
/// characters, hyphens, and underscores.
pub struct AuthUser(pub User);

fn unauthorized(message: &str) -> AppError {
    AppError::Authentication(message.to_string())
}

/// Extract and format-check the bearer token of a request
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers.get(AUTHORIZATION).ok_or_else(|| {
        unauthorized("Missing Authorization header. Please provide a Bearer token.")
    })?;
    let value = header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header format."))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            unauthorized(
                "Authorization header must use Bearer scheme (e.g., 'Authorization: Bearer <token>').",
            )
        })?
        .trim();

    if token.len() < 32
        || !token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(unauthorized("Invalid token format."));
    }
    Ok(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let user = state
            .store
            .find_user_by_session(token)
            .await?
            .ok_or_else(|| unauthorized("Invalid or expired token."))?;
        Ok(AuthUser(user))
    }
}
