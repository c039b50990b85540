use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub unix_socket: Option<PathBuf>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_wal_path")]
    pub wal_path: PathBuf,
    #[serde(default = "default_user_capacity")]
    pub user_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a login token in milliseconds
    #[serde(default = "default_token_ttl_ms")]
    pub token_ttl_ms: i64,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    /// Key for `/metrics`. Empty disables the endpoint.
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Log file; stdout when unset
    pub path: Option<PathBuf>,
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            wal_path: default_wal_path(),
            user_capacity: default_user_capacity(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_ttl_ms: default_token_ttl_ms(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            path: None,
            console: default_console(),
        }
    }
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_wal_path() -> PathBuf {
    PathBuf::from("users.wal")
}

fn default_user_capacity() -> usize {
    10_000
}

fn default_token_ttl_ms() -> i64 {
    crate::utils::time::days_to_millis(30)
}

fn default_argon2_memory_kib() -> u32 {
    19_456 // 19 MiB
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port.is_none() && self.server.unix_socket.is_none() {
            bail!("Either port or unix_socket must be specified in server config");
        }

        if let Some(port) = self.server.port {
            if port == 0 {
                bail!("Server port must be greater than 0");
            }
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.storage.wal_path.as_os_str().is_empty() {
            bail!("wal_path must not be empty");
        }

        if self.storage.user_capacity == 0 {
            bail!("user_capacity must be greater than 0");
        }

        if self.session.token_ttl_ms <= 0 {
            bail!("token_ttl_ms must be greater than 0");
        }

        if self.security.argon2_parallelism == 0 {
            bail!("argon2_parallelism must be greater than 0");
        }

        if self.security.argon2_iterations == 0 {
            bail!("argon2_iterations must be greater than 0");
        }

        // Argon2 needs at least 8 KiB per lane
        if self.security.argon2_memory_kib < 8 * self.security.argon2_parallelism {
            bail!(
                "argon2_memory_kib ({}) must be at least 8 * argon2_parallelism ({})",
                self.security.argon2_memory_kib,
                8 * self.security.argon2_parallelism
            );
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml_str("[server]\nport = 8080\n").unwrap();

        assert_eq!(config.server.port, Some(8080));
        assert!(config.server.num_threads > 0);
        assert_eq!(config.storage.wal_path, PathBuf::from("users.wal"));
        assert_eq!(config.session.token_ttl_ms, 2_592_000_000);
        assert_eq!(config.security.argon2_memory_kib, 19_456);
        assert!(config.admin.api_key.is_empty());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 9000
            num_threads = 2

            [storage]
            wal_path = "/tmp/users.wal"
            user_capacity = 100

            [session]
            token_ttl_ms = 60000

            [security]
            argon2_memory_kib = 64
            argon2_iterations = 3
            argon2_parallelism = 2

            [admin]
            api_key = "admin-key"

            [logging]
            level = "debug"
            format = "console"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.num_threads, 2);
        assert_eq!(config.storage.user_capacity, 100);
        assert_eq!(config.session.token_ttl_ms, 60_000);
        assert_eq!(config.security.argon2_parallelism, 2);
        assert_eq!(config.admin.api_key, "admin-key");
        assert_eq!(config.logging.format, "console");
    }

    #[test]
    fn test_requires_a_listener() {
        let err = Config::from_toml_str("[server]\n").unwrap_err();
        assert!(err.to_string().contains("port or unix_socket"));
    }

    #[test]
    fn test_rejects_non_positive_ttl() {
        let err = Config::from_toml_str("[server]\nport = 8080\n[session]\ntoken_ttl_ms = 0\n")
            .unwrap_err();
        assert!(err.to_string().contains("token_ttl_ms"));
    }

    #[test]
    fn test_rejects_too_little_argon2_memory() {
        let err = Config::from_toml_str(
            "[server]\nport = 8080\n[security]\nargon2_memory_kib = 8\nargon2_parallelism = 2\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("argon2_memory_kib"));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let err = Config::from_toml_str("[server]\nport = 8080\n[logging]\nlevel = \"loud\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_example_config_is_valid() {
        let content = include_str!("../../config.example.toml");
        assert!(Config::from_toml_str(content).is_ok());
    }
}
