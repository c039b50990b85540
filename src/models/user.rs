use serde::{Deserialize, Serialize};

/// Stored account record.
///
/// `token` and `token_expired_at` travel together: both are `Some` while a
/// session is open and both are `None` otherwise. Use [`User::open_session`]
/// and [`User::clear_session`] rather than touching them one at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub name: String,
    /// PHC-formatted hash, never the plaintext
    pub password_hash: String,
    pub token: Option<String>,
    /// Epoch milliseconds
    pub token_expired_at: Option<i64>,
}

impl User {
    pub fn new(username: String, name: String, password_hash: String) -> Self {
        Self {
            username,
            name,
            password_hash,
            token: None,
            token_expired_at: None,
        }
    }

    pub fn open_session(&mut self, token: String, expired_at: i64) {
        self.token = Some(token);
        self.token_expired_at = Some(expired_at);
    }

    pub fn clear_session(&mut self) {
        self.token = None;
        self.token_expired_at = None;
    }

    pub fn has_session(&self) -> bool {
        self.token.is_some() && self.token_expired_at.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegisterUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Outward view of a user. Hash and session fields are not representable here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            name: user.name.clone(),
        }
    }
}
