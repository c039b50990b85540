// Metrics endpoint

use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::metrics::collector::MetricsSnapshot;
use crate::utils::auth::verify_admin_key;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    #[serde(default)]
    pub api_key: String,
}

/// Account and session counters plus uptime.
///
/// GET /metrics?api_key=<key>
pub async fn metrics_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MetricsQuery>,
) -> Result<Json<MetricsSnapshot>, ApiError> {
    if !verify_admin_key(&params.api_key, &state.config.admin.api_key) {
        warn!("Unauthorized metrics access attempt");
        return Err(ApiError::unauthorized("Invalid API key"));
    }

    Ok(Json(state.metrics.get_snapshot(&state.user_store)))
}
