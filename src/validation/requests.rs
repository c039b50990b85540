use crate::core::error::ApiError;
use crate::models::auth::LoginUserRequest;
use crate::models::user::{RegisterUserRequest, UpdateUserRequest};

/// Upper bound, in characters, for every user-supplied text field
pub const MAX_FIELD_LENGTH: usize = 100;

#[derive(Debug)]
pub struct ValidatedRegistration {
    pub username: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug)]
pub struct ValidatedLogin {
    pub username: String,
    pub password: String,
}

/// Fields left `None` are not to be changed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ValidatedUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl ValidatedUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password.is_none()
    }
}

/// Accumulates every violation so the client sees them all at once.
#[derive(Default)]
struct Violations(Vec<String>);

impl Violations {
    fn required(&mut self, field: &str, value: &str) {
        if is_blank(value) {
            self.0.push(format!("{} must not be blank", field));
        }
        self.max_length(field, value);
    }

    fn max_length(&mut self, field: &str, value: &str) {
        if value.chars().count() > MAX_FIELD_LENGTH {
            self.0.push(format!(
                "{} size must be between 0 and {}",
                field, MAX_FIELD_LENGTH
            ));
        }
    }

    fn finish(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self.0.join(", ")))
        }
    }
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl RegisterUserRequest {
    pub fn validate(self) -> Result<ValidatedRegistration, ApiError> {
        let mut violations = Violations::default();
        violations.required("username", &self.username);
        violations.required("password", &self.password);
        violations.required("name", &self.name);
        violations.finish()?;

        Ok(ValidatedRegistration {
            username: self.username,
            password: self.password,
            name: self.name,
        })
    }
}

impl LoginUserRequest {
    pub fn validate(self) -> Result<ValidatedLogin, ApiError> {
        let mut violations = Violations::default();
        violations.required("username", &self.username);
        violations.required("password", &self.password);
        violations.finish()?;

        Ok(ValidatedLogin {
            username: self.username,
            password: self.password,
        })
    }
}

impl UpdateUserRequest {
    /// Blank values are accepted and treated the same as absent ones.
    pub fn validate(self) -> Result<ValidatedUpdate, ApiError> {
        let mut violations = Violations::default();
        if let Some(name) = &self.name {
            violations.max_length("name", name);
        }
        if let Some(password) = &self.password {
            violations.max_length("password", password);
        }
        violations.finish()?;

        Ok(ValidatedUpdate {
            name: self.name.filter(|v| !is_blank(v)),
            password: self.password.filter(|v| !is_blank(v)),
        })
    }
}
