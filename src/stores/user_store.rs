use crate::core::error::StoreError;
use crate::models::user::User;
use crate::stores::repository::UserRepository;
use crate::wal::wal::{Wal, WalOperation};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::warn;

/// In-memory user store keyed by username, with a token index.
///
/// When a WAL is attached every save is appended to it before the map is
/// touched. A failed append leaves the store unchanged.
pub struct UserStore {
    users: DashMap<String, User>,
    /// token -> username
    tokens: DashMap<String, String>,
    wal: Option<Arc<Wal>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            tokens: DashMap::new(),
            wal: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            users: DashMap::with_capacity(capacity),
            tokens: DashMap::with_capacity(capacity),
            wal: None,
        }
    }

    pub fn with_wal(mut self, wal: Arc<Wal>) -> Self {
        self.wal = Some(wal);
        self
    }

    /// Load replayed operations without writing them back to the WAL
    pub fn restore(&self, operations: Vec<WalOperation>) {
        for op in operations {
            self.apply(op.into_user());
        }
    }

    /// One SAVE_USER operation per stored user
    pub fn snapshot(&self) -> Vec<WalOperation> {
        self.users
            .iter()
            .map(|entry| WalOperation::from(entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn active_sessions(&self) -> usize {
        self.tokens.len()
    }

    fn apply(&self, user: User) {
        let username = user.username.clone();
        // Restored operations are already in the log, no WAL is passed
        if let Err(e) = self.write(user, None) {
            warn!(username = %username, error = %e, "Failed to restore user");
        }
    }

    /// Append to the WAL (if any) and update the map under the record's
    /// shard lock, so the log order matches the in-memory order per username.
    fn write(&self, user: User, wal: Option<&Wal>) -> Result<(), StoreError> {
        let username = user.username.clone();
        let new_token = user.token.clone();

        match self.users.entry(username.clone()) {
            Entry::Occupied(mut entry) => {
                log_to(wal, &user)?;
                let previous = entry.insert(user);
                self.reindex(&username, previous.token, new_token);
            }
            Entry::Vacant(entry) => {
                log_to(wal, &user)?;
                let _guard = entry.insert(user);
                self.reindex(&username, None, new_token);
            }
        }
        Ok(())
    }

    fn reindex(&self, username: &str, previous: Option<String>, current: Option<String>) {
        if previous == current {
            return;
        }
        if let Some(old) = previous {
            self.tokens.remove_if(&old, |_, owner| owner == username);
        }
        if let Some(new) = current {
            self.tokens.insert(new, username.to_string());
        }
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository for UserStore {
    fn find_by_username(&self, username: &str) -> Option<User> {
        self.users.get(username).map(|entry| entry.value().clone())
    }

    fn find_by_token(&self, token: &str) -> Option<User> {
        let username = self.tokens.get(token).map(|entry| entry.value().clone())?;
        self.users
            .get(&username)
            .filter(|entry| entry.value().token.as_deref() == Some(token))
            .map(|entry| entry.value().clone())
    }

    fn save(&self, user: &User) -> Result<(), StoreError> {
        self.write(user.clone(), self.wal.as_deref())
    }

    fn insert_new(&self, user: &User) -> Result<bool, StoreError> {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                log_to(self.wal.as_deref(), user)?;
                let _guard = entry.insert(user.clone());
                self.reindex(&user.username, None, user.token.clone());
                Ok(true)
            }
        }
    }

    fn modify(
        &self,
        username: &str,
        change: &mut dyn FnMut(&mut User),
    ) -> Result<Option<User>, StoreError> {
        let Some(mut entry) = self.users.get_mut(username) else {
            return Ok(None);
        };

        let mut updated = entry.value().clone();
        change(&mut updated);
        if updated == *entry.value() {
            return Ok(Some(updated));
        }

        log_to(self.wal.as_deref(), &updated)?;
        let previous_token = std::mem::replace(entry.value_mut(), updated.clone()).token;
        self.reindex(username, previous_token, updated.token.clone());
        Ok(Some(updated))
    }
}

fn log_to(wal: Option<&Wal>, user: &User) -> Result<(), StoreError> {
    match wal {
        Some(wal) => wal
            .log_operation(&WalOperation::from(user))
            .map_err(|e| StoreError::Wal(format!("{:#}", e))),
        None => Ok(()),
    }
}
