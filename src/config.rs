//! Database configuration read from the process environment.

use crate::task::adapters::postgres::{PostgresTaskRepository, TaskPgPool};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_VAR: &str = "TASKDESK_DATABASE_URL";
/// Environment variable holding the maximum pool size.
pub const MAX_CONNECTIONS_VAR: &str = "TASKDESK_DATABASE_MAX_CONNECTIONS";
/// Environment variable holding the connection timeout in seconds.
pub const CONNECT_TIMEOUT_VAR: &str = "TASKDESK_DATABASE_CONNECT_TIMEOUT_SECS";

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while loading configuration or opening the pool.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable holds a value that cannot be used.
    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// The connection pool could not be built.
    #[error("failed to build database pool: {0}")]
    Pool(#[from] PoolError),
}

/// Connection settings for the `PostgreSQL` task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    url: String,
    max_connections: u32,
    connect_timeout: Duration,
}

impl DatabaseConfig {
    /// Creates a configuration for `url` with default pool settings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL is missing or a numeric setting
    /// is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the URL is absent and
    /// [`ConfigError::Invalid`] when a numeric setting does not parse or the
    /// pool size is zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup(DATABASE_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;
        let mut config = Self::new(url.trim());

        if let Some(raw) = lookup(MAX_CONNECTIONS_VAR) {
            let max_connections = parse_number::<u32>(MAX_CONNECTIONS_VAR, &raw)?;
            if max_connections == 0 {
                return Err(ConfigError::Invalid {
                    name: MAX_CONNECTIONS_VAR,
                    value: raw,
                    reason: "pool size must be at least 1",
                });
            }
            config.max_connections = max_connections;
        }
        if let Some(raw) = lookup(CONNECT_TIMEOUT_VAR) {
            config.connect_timeout =
                Duration::from_secs(parse_number::<u64>(CONNECT_TIMEOUT_VAR, &raw)?);
        }
        Ok(config)
    }

    /// Sets the maximum pool size. A size of zero is raised to one.
    #[must_use]
    pub const fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = if max_connections == 0 {
            1
        } else {
            max_connections
        };
        self
    }

    /// Returns the connection URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the maximum pool size.
    #[must_use]
    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }

    /// Returns the connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Builds the r2d2 pool used by the `PostgreSQL` adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the initial connections cannot be
    /// established within the timeout.
    pub fn build_pool(&self) -> Result<TaskPgPool, ConfigError> {
        let manager = ConnectionManager::<PgConnection>::new(self.url.as_str());
        let pool = Pool::builder()
            .max_size(self.max_connections)
            .connection_timeout(self.connect_timeout)
            .build(manager)?;
        Ok(pool)
    }

    /// Opens a pool and wraps it in a task repository.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the pool cannot be built.
    pub fn connect_task_repository(&self) -> Result<PostgresTaskRepository, ConfigError> {
        Ok(PostgresTaskRepository::new(self.build_pool()?))
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_owned(),
        reason: "expected a non-negative integer",
    })
}
