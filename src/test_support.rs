// Shared fixtures for unit tests

use crate::core::config::Config;
use crate::core::state::AppState;
use crate::security::hasher::Argon2Hasher;
use crate::wal::wal::Wal;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_ADMIN_KEY: &str = "test-admin-key";

pub fn test_config() -> Config {
    Config::from_toml_str(&format!(
        r#"
        [server]
        port = 8080
        num_threads = 2

        [security]
        argon2_memory_kib = 8
        argon2_iterations = 1
        argon2_parallelism = 1

        [admin]
        api_key = "{}"
        "#,
        TEST_ADMIN_KEY
    ))
    .expect("test config must be valid")
}

pub fn test_hasher() -> Arc<Argon2Hasher> {
    Arc::new(Argon2Hasher::new(8, 1, 1).expect("minimum argon2 params"))
}

pub fn test_state_at(config: Config, wal_path: &Path) -> AppState {
    let wal = Wal::new(wal_path.to_path_buf()).expect("failed to open test WAL");
    AppState::with_hasher(config, wal, test_hasher())
}

/// The `TempDir` must outlive the state, it owns the WAL file.
pub fn test_state() -> (TempDir, Arc<AppState>) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let state = test_state_at(test_config(), &temp_dir.path().join("users.wal"));
    (temp_dir, Arc::new(state))
}
