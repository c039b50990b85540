use crate::core::error::ApiError;
use crate::models::user::User;
use crate::stores::repository::UserRepository;
use crate::utils::time::{current_timestamp_millis, is_deadline_reached};
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves an `X-API-TOKEN` value to the user holding that session.
///
/// Expiry is enforced lazily: an expired session is only noticed, and
/// cleared from the store, when someone presents its token.
#[derive(Clone)]
pub struct SessionAuthenticator {
    users: Arc<dyn UserRepository>,
}

impl SessionAuthenticator {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub fn authenticate(&self, token: Option<&str>) -> Result<User, ApiError> {
        self.authenticate_at(token, current_timestamp_millis())
    }

    pub fn authenticate_at(&self, token: Option<&str>, now_millis: i64) -> Result<User, ApiError> {
        let token = match token {
            Some(token) if !token.is_empty() => token,
            _ => {
                debug!("Request without session token");
                return Err(ApiError::unauthorized("token not provided"));
            }
        };

        let user = self.users.find_by_token(token).ok_or_else(|| {
            debug!("Session token matched no user");
            ApiError::unauthorized("invalid token")
        })?;

        match user.token_expired_at {
            Some(expired_at) if !is_deadline_reached(expired_at, now_millis) => Ok(user),
            expired_at => {
                // Only this token's session is cleared, a fresh login may have replaced it
                self.users.modify(&user.username, &mut |stored: &mut User| {
                    if stored.token.as_deref() == Some(token) {
                        stored.clear_session();
                    }
                })?;

                info!(
                    username = %user.username,
                    expired_at = ?expired_at,
                    now = now_millis,
                    "Expired session cleared"
                );
                Err(ApiError::unauthorized("token expired"))
            }
        }
    }
}
