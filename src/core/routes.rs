// HTTP routes configuration

use crate::core::state::AppState;
use crate::handlers::{auth, fallback, health, metrics, users};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Account endpoints
        .route("/api/users", post(users::register_handler))
        .route(
            "/api/users/current",
            get(users::get_current_handler).patch(users::update_current_handler),
        )
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", delete(auth::logout_handler))

        // Operational endpoints
        .route("/health", get(health::health_handler))
        .route("/metrics", get(metrics::metrics_handler))

        .fallback(fallback::fallback_handler)
        .method_not_allowed_fallback(fallback::method_not_allowed_handler)

        .with_state(state)
}
