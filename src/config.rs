//! Configuration management for the task scheduler.
//!
//! Configuration can be set via environment variables:
//! - `TODO_HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//! - `TODO_PORT` - Optional. Server port. Defaults to `7540`.
//! - `TODO_DBFILE` - Optional. SQLite database file. Defaults to `scheduler.db`.
//! - `TODO_STORE` - Optional. `sqlite` (default) or `memory`.
//! - `TODO_WEBDIR` - Optional. Directory with the web frontend. Defaults to `./web`.
//! - `TODO_PASSWORD` - Optional. Enables authentication when set.
//! - `TODO_JWT_SECRET` - Optional. Token signing secret. Defaults to the password.
//! - `TODO_JWT_TTL_HOURS` - Optional. Token lifetime. Defaults to `8`.
//! - `TODO_TASKS_LIMIT` - Optional. Maximum tasks per list response. Defaults to `50`.

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::api::task_store::TaskStoreType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Password for `/api/signin`; auth is disabled when unset
    pub password: Option<String>,

    /// HS256 signing secret
    pub jwt_secret: Option<String>,

    /// Token lifetime in hours
    pub jwt_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: None,
            jwt_secret: None,
            jwt_ttl_hours: 8,
        }
    }
}

impl AuthConfig {
    /// Auth is only enforced when a non-empty password is configured.
    pub fn auth_required(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Secret used to sign tokens.
    pub fn signing_secret(&self) -> Option<&str> {
        self.jwt_secret
            .as_deref()
            .or(self.password.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Storage backend
    pub store_type: TaskStoreType,

    /// Static frontend directory
    pub web_dir: PathBuf,

    /// Maximum number of tasks returned by a list request
    pub tasks_limit: usize,

    /// Authentication settings
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("TODO_HOST", "0.0.0.0");
        let port = parse_env("TODO_PORT", 7540u16)?;
        let db_path = PathBuf::from(env_or("TODO_DBFILE", "scheduler.db"));
        let store_type = TaskStoreType::from_str(&env_or("TODO_STORE", "sqlite"));
        let web_dir = PathBuf::from(env_or("TODO_WEBDIR", "./web"));
        let tasks_limit = parse_env("TODO_TASKS_LIMIT", 50usize)?;

        let auth = AuthConfig {
            password: non_empty_env("TODO_PASSWORD"),
            jwt_secret: non_empty_env("TODO_JWT_SECRET"),
            jwt_ttl_hours: parse_env("TODO_JWT_TTL_HOURS", 8i64)?,
        };

        Ok(Self {
            host,
            port,
            db_path,
            store_type,
            web_dir,
            tasks_limit,
            auth,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(db_path: PathBuf, store_type: TaskStoreType) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7540,
            db_path,
            store_type,
            web_dir: PathBuf::from("./web"),
            tasks_limit: 50,
            auth: AuthConfig::default(),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        _ => Ok(default),
    }
}
