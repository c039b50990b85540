use crate::core::error::ApiError;
use crate::models::user::{User, UserResponse};
use crate::security::hasher::CredentialHasher;
use crate::stores::repository::UserRepository;
use crate::validation::requests::{ValidatedRegistration, ValidatedUpdate};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }

    pub fn register(&self, request: ValidatedRegistration) -> Result<(), ApiError> {
        // Skips the hash for known names, insert_new decides
        if self.users.find_by_username(&request.username).is_some() {
            return Err(username_taken(&request.username));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = User::new(request.username, request.name, password_hash);
        if !self.users.insert_new(&user)? {
            return Err(username_taken(&user.username));
        }

        info!(username = %user.username, "User registered");
        Ok(())
    }

    pub fn get(&self, user: &User) -> UserResponse {
        UserResponse::from(user)
    }

    /// Changes only the profile fields, a session opened or closed since
    /// `user` was read is left alone.
    pub fn update(&self, user: User, request: ValidatedUpdate) -> Result<UserResponse, ApiError> {
        if request.is_empty() {
            debug!(username = %user.username, "Empty update, nothing changed");
            return Ok(UserResponse::from(&user));
        }

        let password_hash = match &request.password {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };

        let updated = self
            .users
            .modify(&user.username, &mut |stored: &mut User| {
                if let Some(name) = &request.name {
                    stored.name = name.clone();
                }
                if let Some(hash) = &password_hash {
                    stored.password_hash = hash.clone();
                }
            })?
            .ok_or_else(|| ApiError::unauthorized("invalid token"))?;

        info!(
            username = %updated.username,
            name_changed = request.name.is_some(),
            password_changed = password_hash.is_some(),
            "User updated"
        );

        Ok(UserResponse::from(&updated))
    }
}

fn username_taken(username: &str) -> ApiError {
    warn!(username = %username, "Registration rejected: username taken");
    ApiError::validation("username already registered")
}
