//! TOML configuration parsing and validation.
//!
//! The configuration file selects the storage backend, the JSON data and
//! seed files, the connection pool bounds, and the server bind address.
//! The database connection URL is a secret and is never read from the file:
//! it comes from the `DATABASE_URL` environment variable and is resolved in
//! [`load_config`], so a missing credential stops the process before any
//! listener is bound.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the database connection URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub db: DbConfig,
    pub server: ServerConfig,
    /// Resolved from [`DATABASE_URL_ENV`], never from the file.
    #[serde(skip)]
    pub database_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    File,
    Database,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: Backend,
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_seed_file")]
    pub seed_file: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_file: default_data_file(),
            seed_file: default_seed_file(),
        }
    }
}

fn default_backend() -> Backend {
    Backend::Database
}
fn default_data_file() -> PathBuf {
    PathBuf::from("./data/articles.json")
}
fn default_seed_file() -> PathBuf {
    PathBuf::from("./data/articles_5.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    /// Prepared statement cache size per connection. `0` disables caching.
    #[serde(default)]
    pub statement_cache_capacity: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            statement_cache_capacity: 0,
        }
    }
}

fn default_min_connections() -> u32 {
    1
}
fn default_max_connections() -> u32 {
    10
}
fn default_acquire_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl Config {
    /// The database URL, or an error naming the variable that must be set.
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url.as_deref().with_context(|| {
            format!(
                "{} must be set when [store].backend = \"database\"",
                DATABASE_URL_ENV
            )
        })
    }
}

/// Read, parse, and validate the config file, taking the database URL from
/// the process environment.
pub fn load_config(path: &Path) -> Result<Config> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Like [`load_config`], with the environment lookup supplied by the caller.
pub fn load_config_with_env<F>(path: &Path, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content, env)
}

/// Parse and validate config text. Split out of [`load_config_with_env`] so
/// tests don't need a file on disk.
pub fn parse_config<F>(content: &str, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;

    config.database_url = env(DATABASE_URL_ENV).filter(|v| !v.trim().is_empty());

    if config.db.max_connections == 0 {
        bail!("db.max_connections must be >= 1");
    }
    if config.db.min_connections > config.db.max_connections {
        bail!(
            "db.min_connections ({}) must not exceed db.max_connections ({})",
            config.db.min_connections,
            config.db.max_connections
        );
    }

    if config.store.backend == Backend::Database {
        config.require_database_url()?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[server]
bind = "127.0.0.1:8000"
"#;

    fn with_url(key: &str) -> Option<String> {
        (key == DATABASE_URL_ENV).then(|| "sqlite::memory:".to_string())
    }

    #[test]
    fn test_defaults() {
        let cfg = parse_config(MINIMAL, with_url).unwrap();
        assert_eq!(cfg.store.backend, Backend::Database);
        assert_eq!(cfg.db.min_connections, 1);
        assert_eq!(cfg.db.max_connections, 10);
        assert_eq!(cfg.db.statement_cache_capacity, 0);
        assert_eq!(cfg.database_url.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn test_missing_database_url_is_fatal() {
        let err = parse_config(MINIMAL, |_| None).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_blank_database_url_is_fatal() {
        let err = parse_config(MINIMAL, |_| Some("  ".to_string())).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_file_backend_needs_no_database_url() {
        let text = r#"
[store]
backend = "file"
data_file = "/tmp/articles.json"

[server]
bind = "127.0.0.1:8000"
"#;
        let cfg = parse_config(text, |_| None).unwrap();
        assert_eq!(cfg.store.backend, Backend::File);
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn test_pool_bounds_validated() {
        let text = r#"
[db]
min_connections = 8
max_connections = 2

[server]
bind = "127.0.0.1:8000"
"#;
        let err = parse_config(text, with_url).unwrap_err();
        assert!(err.to_string().contains("min_connections"));

        let text = r#"
[db]
max_connections = 0

[server]
bind = "127.0.0.1:8000"
"#;
        assert!(parse_config(text, with_url).is_err());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let text = r#"
[store]
backend = "redis"

[server]
bind = "127.0.0.1:8000"
"#;
        assert!(parse_config(text, with_url).is_err());
    }
}
