//! Configuration management for the server.

use std::env;
use std::time::Duration;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// URL of the remote product snapshot
    pub source_url: String,
    /// Time between two scheduled replication cycles
    pub replication_interval: Duration,
    /// Request timeout for the remote fetch
    pub source_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?;

        let source_url = lookup("SOURCE_URL").ok_or(ConfigError::MissingSourceUrl)?;

        let replication_interval = parse_secs(
            lookup("REPLICATION_INTERVAL_SECS"),
            300,
            ConfigError::InvalidReplicationInterval,
        )?;

        let source_timeout = parse_secs(
            lookup("SOURCE_TIMEOUT_SECS"),
            30,
            ConfigError::InvalidSourceTimeout,
        )?;

        Ok(Self {
            host,
            port,
            database_url,
            source_url,
            replication_interval,
            source_timeout,
        })
    }
}

/// Parse a positive number of seconds, falling back to `default`.
fn parse_secs(value: Option<String>, default: u64, err: ConfigError) -> Result<Duration, ConfigError> {
    let secs = match value {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| err.clone())?,
        None => default,
    };
    if secs == 0 {
        return Err(err);
    }
    Ok(Duration::from_secs(secs))
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,

    #[error("SOURCE_URL environment variable is required")]
    MissingSourceUrl,

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("REPLICATION_INTERVAL_SECS must be a positive number of seconds")]
    InvalidReplicationInterval,

    #[error("SOURCE_TIMEOUT_SECS must be a positive number of seconds")]
    InvalidSourceTimeout,
}
