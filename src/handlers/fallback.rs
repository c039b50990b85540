use crate::core::error::ApiError;
use axum::http::{Method, Uri};
use tracing::debug;

pub async fn fallback_handler(uri: Uri) -> ApiError {
    debug!(path = %uri.path(), "No route matched");
    ApiError::NotFound
}

/// Known path, unsupported method
pub async fn method_not_allowed_handler(method: Method, uri: Uri) -> ApiError {
    debug!(%method, path = %uri.path(), "Method not allowed");
    ApiError::MethodNotAllowed
}
