pub mod repository;
pub mod user_store;
