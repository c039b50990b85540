use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::handlers::current_user::CurrentUser;
use crate::handlers::run_blocking;
use crate::models::auth::{LoginUserRequest, TokenResponse};
use crate::models::web::WebResponse;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Exchange username and password for a session token
///
/// POST /api/auth/login
#[instrument(skip_all)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginUserRequest>, JsonRejection>,
) -> Result<Json<WebResponse<TokenResponse>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let request = request.validate()?;

    let service = state.auth_service.clone();
    match run_blocking(move || service.login(request)).await {
        Ok(token) => {
            state.metrics.increment_logins();
            Ok(Json(WebResponse::data(token)))
        }
        Err(err) => {
            if matches!(err, ApiError::Unauthorized(_)) {
                state.metrics.increment_failed_logins();
            }
            Err(err)
        }
    }
}

/// DELETE /api/auth/logout
#[instrument(skip_all)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<WebResponse<&'static str>>, ApiError> {
    let service = state.auth_service.clone();
    run_blocking(move || service.logout(user)).await?;
    state.metrics.increment_logouts();

    Ok(Json(WebResponse::data("OK")))
}
