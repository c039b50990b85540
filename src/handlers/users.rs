use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::handlers::current_user::CurrentUser;
use crate::handlers::run_blocking;
use crate::models::user::{RegisterUserRequest, UpdateUserRequest, UserResponse};
use crate::models::web::WebResponse;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Register a new user
///
/// POST /api/users
#[instrument(skip_all)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<Json<WebResponse<&'static str>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let request = request.validate()?;

    let service = state.user_service.clone();
    run_blocking(move || service.register(request)).await?;
    state.metrics.increment_registrations();

    Ok(Json(WebResponse::data("OK")))
}

/// GET /api/users/current
pub async fn get_current_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Json<WebResponse<UserResponse>> {
    Json(WebResponse::data(state.user_service.get(&user)))
}

/// Update name and/or password of the current user
///
/// PATCH /api/users/current
#[instrument(skip_all)]
pub async fn update_current_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<WebResponse<UserResponse>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let request = request.validate()?;

    let service = state.user_service.clone();
    let response = run_blocking(move || service.update(user, request)).await?;

    Ok(Json(WebResponse::data(response)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::User;
    use crate::stores::repository::UserRepository;
    use crate::test_support::test_state;
    use crate::utils::time::current_timestamp_millis;

    fn register_request(username: &str, password: &str, name: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        }
    }

    fn seeded_user(state: &AppState) -> User {
        let mut user = User::new("test".into(), "Test".into(), "hash".into());
        user.open_session("test".into(), current_timestamp_millis() + 10_000_000_000);
        state.user_store.save(&user).unwrap();
        user
    }

    #[tokio::test]
    async fn test_register_success() {
        let (_dir, state) = test_state();

        let Json(response) = register_handler(
            State(state.clone()),
            Ok(Json(register_request("test", "rahasia", "Test"))),
        )
        .await
        .unwrap();

        assert_eq!(response.data, Some("OK"));
        assert!(response.errors.is_none());
        assert!(state.user_store.find_by_username("test").is_some());
        assert_eq!(
            state.metrics.registrations.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_register_blank_fields() {
        let (_dir, state) = test_state();

        let err = register_handler(State(state.clone()), Ok(Json(register_request("", "", ""))))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
        assert!(state.user_store.is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let (_dir, state) = test_state();
        seeded_user(&state);

        let err = register_handler(
            State(state.clone()),
            Ok(Json(register_request("test", "rahasia", "Test"))),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::Validation(ref m) if m == "username already registered"));
    }

    #[tokio::test]
    async fn test_get_current() {
        let (_dir, state) = test_state();
        let user = seeded_user(&state);

        let Json(response) = get_current_handler(State(state), CurrentUser(user)).await;

        assert_eq!(
            response.data,
            Some(UserResponse {
                username: "test".to_string(),
                name: "Test".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_update_current() {
        let (_dir, state) = test_state();
        let user = seeded_user(&state);

        let Json(response) = update_current_handler(
            State(state.clone()),
            CurrentUser(user),
            Ok(Json(UpdateUserRequest {
                name: Some("Rafi".to_string()),
                password: Some("rafi12345".to_string()),
            })),
        )
        .await
        .unwrap();

        let data = response.data.unwrap();
        assert_eq!(data.username, "test");
        assert_eq!(data.name, "Rafi");

        let stored = state.user_store.find_by_username("test").unwrap();
        assert_eq!(stored.name, "Rafi");
        assert_ne!(stored.password_hash, "hash");
        // Session survives a profile update
        assert_eq!(stored.token.as_deref(), Some("test"));
    }

    #[tokio::test]
    async fn test_update_current_too_long() {
        let (_dir, state) = test_state();
        let user = seeded_user(&state);

        let err = update_current_handler(
            State(state.clone()),
            CurrentUser(user),
            Ok(Json(UpdateUserRequest {
                name: Some("n".repeat(101)),
                password: None,
            })),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(state.user_store.find_by_username("test").unwrap().name, "Test");
    }
}
