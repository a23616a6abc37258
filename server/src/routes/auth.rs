//! Bearer-token extractor for REST mutations.

use axum::extract::FromRef;
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use frames::UserId;
use tracing::error;

use crate::state::AppState;

/// Authenticated caller resolved from `Authorization: Bearer <token>`.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user_id: UserId,
}

/// Extract the credential from a `Bearer` authorization header value.
pub(crate) fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let app_state = AppState::from_ref(state);
        let user_id = app_state
            .verifier
            .verify(token)
            .await
            .map_err(|e| {
                error!(error = %e, "auth: token verification failed");
                StatusCode::INTERNAL_SERVER_ERROR
            })?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user_id })
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
