pub mod core;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod security;
pub mod services;
pub mod stores;
pub mod utils;
pub mod validation;
pub mod wal;

#[cfg(test)]
pub(crate) mod test_support;
