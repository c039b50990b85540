pub mod auth;
pub mod current_user;
pub mod fallback;
pub mod health;
pub mod metrics;
pub mod users;

use crate::core::error::ApiError;
use anyhow::anyhow;

/// Run password hashing, session checks and store writes off the async
/// worker threads.
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError::Internal(anyhow!("Blocking task failed: {}", e)))?
}
