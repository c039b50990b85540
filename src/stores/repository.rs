use crate::core::error::StoreError;
use crate::models::user::User;

/// Point lookups and upserts over user records.
///
/// Every write is atomic per record. `save` is a blind upsert, concurrent
/// saves of the same username resolve last-writer-wins. Request paths use
/// `insert_new` and `modify` so they never overwrite fields they did not read.
pub trait UserRepository: Send + Sync {
    fn find_by_username(&self, username: &str) -> Option<User>;

    /// Exact, case-sensitive match on the session token.
    fn find_by_token(&self, token: &str) -> Option<User>;

    fn save(&self, user: &User) -> Result<(), StoreError>;

    /// Store `user` only if its username is free. Returns `false` when taken.
    fn insert_new(&self, user: &User) -> Result<bool, StoreError>;

    /// Apply `change` to the stored record while holding its lock.
    ///
    /// Returns the record as stored afterwards, or `None` for an unknown
    /// username. Nothing is written when `change` leaves the record as it was.
    fn modify(
        &self,
        username: &str,
        change: &mut dyn FnMut(&mut User),
    ) -> Result<Option<User>, StoreError>;
}
