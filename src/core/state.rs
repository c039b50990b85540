// Application state (AppState)

use crate::core::config::Config;
use crate::metrics::collector::Metrics;
use crate::security::hasher::{Argon2Hasher, CredentialHasher};
use crate::services::{
    auth_service::AuthService, authenticator::SessionAuthenticator, user_service::UserService,
};
use crate::stores::user_store::UserStore;
use crate::wal::wal::Wal;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Shared application state
///
/// Services hold the store as `Arc<dyn UserRepository>`; the concrete
/// `UserStore` is kept here as well for startup replay and metrics.
#[derive(Clone)]
pub struct AppState {
    pub user_store: Arc<UserStore>,

    pub authenticator: SessionAuthenticator,

    pub user_service: UserService,

    pub auth_service: AuthService,

    pub metrics: Arc<Metrics>,

    pub wal: Arc<Wal>,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, wal: Wal) -> Result<Self> {
        let hasher = Argon2Hasher::new(
            config.security.argon2_memory_kib,
            config.security.argon2_iterations,
            config.security.argon2_parallelism,
        )
        .context("Failed to configure password hasher")?;

        Ok(Self::with_hasher(config, wal, Arc::new(hasher)))
    }

    pub fn with_hasher(config: Config, wal: Wal, hasher: Arc<dyn CredentialHasher>) -> Self {
        let config = Arc::new(config);
        let wal = Arc::new(wal);

        let user_store = Arc::new(
            UserStore::with_capacity(config.storage.user_capacity).with_wal(Arc::clone(&wal)),
        );

        Self {
            authenticator: SessionAuthenticator::new(user_store.clone()),
            user_service: UserService::new(user_store.clone(), Arc::clone(&hasher)),
            auth_service: AuthService::new(
                user_store.clone(),
                hasher,
                config.session.token_ttl_ms,
            ),
            user_store,
            metrics: Arc::new(Metrics::new()),
            wal,
            config,
        }
    }
}
