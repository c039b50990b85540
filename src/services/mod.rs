pub mod auth_service;
pub mod authenticator;
pub mod user_service;
