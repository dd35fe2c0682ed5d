//! # Configuration
//!
//! Settings are read once from the process environment at startup and passed
//! explicitly to the components that need them.
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATABASE_URL` | SQLite connection string | `sqlite:banks.db` |
//! | `DB_MAX_CONNECTIONS` | Connection pool size | `5` |
//! | `DB_ACQUIRE_TIMEOUT_SECS` | Seconds to wait for a pooled connection | `5` |
//! | `SERVER_HOST` | HTTP bind address | `0.0.0.0` |
//! | `SERVER_PORT` | HTTP bind port | `5001` |
//! | `API_SECRET` | Shared secret expected in `X-Api-Key` | unset |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

/// Connection settings for the persistence layer
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server_host: String,
    pub server_port: u16,
    /// When set, every `/api` request must present this value in `X-Api-Key`
    pub api_secret: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a local `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database: DatabaseConfig {
                url: get_env_or_default("DATABASE_URL", "sqlite:banks.db"),
                max_connections: parse_env("DB_MAX_CONNECTIONS", "5")?,
                acquire_timeout: Duration::from_secs(parse_env("DB_ACQUIRE_TIMEOUT_SECS", "5")?),
            },
            server_host: get_env_or_default("SERVER_HOST", "0.0.0.0"),
            server_port: parse_env("SERVER_PORT", "5001")?,
            api_secret: get_optional_env("API_SECRET"),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Get an environment variable with a default value.
pub fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an optional environment variable, treating blank values as unset.
pub fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::ParseError(key.to_string(), e.to_string()))
}
