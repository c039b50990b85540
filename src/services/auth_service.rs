use crate::core::error::ApiError;
use crate::models::auth::TokenResponse;
use crate::models::user::User;
use crate::security::hasher::CredentialHasher;
use crate::security::token::generate_token;
use crate::stores::repository::UserRepository;
use crate::utils::time::current_timestamp_millis;
use crate::validation::requests::ValidatedLogin;
use std::sync::Arc;
use tracing::{info, warn};

const BAD_CREDENTIALS: &str = "username or password wrong";

/// Opens and closes sessions.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
    token_ttl_ms: i64,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn CredentialHasher>,
        token_ttl_ms: i64,
    ) -> Self {
        Self {
            users,
            hasher,
            token_ttl_ms,
        }
    }

    pub fn login(&self, request: ValidatedLogin) -> Result<TokenResponse, ApiError> {
        self.login_at(request, current_timestamp_millis())
    }

    /// Unknown usernames and wrong passwords get the same answer.
    pub fn login_at(&self, request: ValidatedLogin, now_millis: i64) -> Result<TokenResponse, ApiError> {
        let user = match self.users.find_by_username(&request.username) {
            Some(user) => user,
            None => {
                warn!(username = %request.username, "Login failed: unknown username");
                return Err(ApiError::unauthorized(BAD_CREDENTIALS));
            }
        };

        if !self.hasher.verify(&request.password, &user.password_hash) {
            warn!(username = %request.username, "Login failed: wrong password");
            return Err(ApiError::unauthorized(BAD_CREDENTIALS));
        }

        let token = generate_token();
        let expired_at = now_millis.saturating_add(self.token_ttl_ms);
        self.users
            .modify(&user.username, &mut |stored: &mut User| {
                stored.open_session(token.clone(), expired_at)
            })?
            .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

        info!(username = %user.username, expired_at, "Session opened");

        Ok(TokenResponse { token, expired_at })
    }

    /// Closes the session `user` was authenticated with. A newer session
    /// opened in the meantime stays open.
    pub fn logout(&self, user: User) -> Result<(), ApiError> {
        self.users.modify(&user.username, &mut |stored: &mut User| {
            if stored.token == user.token {
                stored.clear_session();
            }
        })?;

        info!(username = %user.username, "Session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::hasher::Argon2Hasher;
    use crate::services::authenticator::SessionAuthenticator;
    use crate::stores::user_store::UserStore;

    const NOW: i64 = 1_700_000_000_000;
    const TTL: i64 = 30 * 24 * 60 * 60 * 1000;

    fn setup() -> (Arc<UserStore>, AuthService) {
        let store = Arc::new(UserStore::new());
        let hasher = Arc::new(Argon2Hasher::new(8, 1, 1).unwrap());
        let hash = hasher.hash("rahasia").unwrap();
        store
            .save(&User::new("test".into(), "Test".into(), hash))
            .unwrap();

        let service = AuthService::new(store.clone(), hasher, TTL);
        (store, service)
    }

    fn login(username: &str, password: &str) -> ValidatedLogin {
        ValidatedLogin {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_login_opens_session() {
        let (store, service) = setup();

        let response = service.login_at(login("test", "rahasia"), NOW).unwrap();
        assert_eq!(response.expired_at, NOW + TTL);

        let stored = store.find_by_username("test").unwrap();
        assert_eq!(stored.token.as_deref(), Some(response.token.as_str()));
        assert_eq!(stored.token_expired_at, Some(NOW + TTL));
    }

    #[test]
    fn test_login_token_authenticates() {
        let (store, service) = setup();
        let response = service.login(login("test", "rahasia")).unwrap();

        let authenticator = SessionAuthenticator::new(store);
        let user = authenticator.authenticate(Some(&response.token)).unwrap();
        assert_eq!(user.username, "test");
    }

    #[test]
    fn test_login_wrong_password() {
        let (store, service) = setup();

        let err = service.login_at(login("test", "salah"), NOW).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == BAD_CREDENTIALS));
        assert!(!store.find_by_username("test").unwrap().has_session());
    }

    #[test]
    fn test_login_unknown_user() {
        let (_, service) = setup();

        let err = service.login_at(login("nobody", "rahasia"), NOW).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == BAD_CREDENTIALS));
    }

    #[test]
    fn test_logout_clears_session() {
        let (store, service) = setup();
        let response = service.login(login("test", "rahasia")).unwrap();

        let authenticator = SessionAuthenticator::new(store.clone());
        let user = authenticator.authenticate(Some(&response.token)).unwrap();
        service.logout(user).unwrap();

        assert!(!store.find_by_username("test").unwrap().has_session());
        assert!(authenticator.authenticate(Some(&response.token)).is_err());
    }

    #[test]
    fn test_stale_logout_keeps_newer_session() {
        let (store, service) = setup();
        let authenticator = SessionAuthenticator::new(store.clone());

        let first = service.login_at(login("test", "rahasia"), NOW).unwrap();
        let stale = authenticator.authenticate_at(Some(&first.token), NOW).unwrap();
        let second = service.login_at(login("test", "rahasia"), NOW + 1).unwrap();

        service.logout(stale).unwrap();

        let user = authenticator.authenticate_at(Some(&second.token), NOW + 2).unwrap();
        assert_eq!(user.token.as_deref(), Some(second.token.as_str()));
    }

}
