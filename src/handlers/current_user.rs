use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::handlers::run_blocking;
use crate::models::user::User;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

pub const API_TOKEN_HEADER: &str = "x-api-token";

/// The user owning the session named by the `X-API-TOKEN` header.
///
/// Rejects with 401 when the header is missing, names no session, or names
/// an expired one.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Non UTF-8 bytes cannot match a stored token, lossy decoding keeps
        // them on the "invalid token" path instead of "not provided"
        let token = parts
            .headers
            .get(API_TOKEN_HEADER)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        // Clearing an expired session writes to the WAL
        let authenticator = state.authenticator.clone();
        match run_blocking(move || authenticator.authenticate(token.as_deref())).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(err) => {
                if matches!(err, ApiError::Unauthorized(_)) {
                    state.metrics.increment_auth_failures();
                }
                Err(err)
            }
        }
    }
}
