//! Store configuration.

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgConnectOptions, sqlite::SqliteConnectOptions};

use crate::{TodoStoreError, TodoStoreResult};

/// Storage backend variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Embedded file-backed SQLite store.
    #[default]
    Sqlite,
    /// Networked PostgreSQL store.
    Postgres,
}

impl Backend {
    /// Returns the lowercase backend name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "embedded" => Ok(Backend::Sqlite),
            "postgres" | "postgresql" | "relational" => Ok(Backend::Postgres),
            other => Err(format!("Unknown storage backend: {}", other)),
        }
    }
}

/// Configuration selecting and parameterizing exactly one backend.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// Use the SQLite driver.
    Sqlite(SqliteConfig),
    /// Use the PostgreSQL driver.
    Postgres(PostgresConfig),
}

impl StoreConfig {
    /// Returns the backend this configuration selects.
    pub fn backend(&self) -> Backend {
        match self {
            StoreConfig::Sqlite(_) => Backend::Sqlite,
            StoreConfig::Postgres(_) => Backend::Postgres,
        }
    }
}

/// SQLite driver configuration.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path of the database file. Created on init if missing.
    pub path: PathBuf,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// How long a connection waits on a locked database.
    pub busy_timeout: Duration,
}

impl SqliteConfig {
    /// Creates a configuration for the given database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub(crate) fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .busy_timeout(self.busy_timeout)
    }
}

/// PostgreSQL driver configuration.
///
/// Either `url` or the discrete connection parameters are used; `url` wins
/// when both are present. Unset discrete parameters fall back to the
/// libpq-style `PG*` environment defaults.
#[derive(Clone, Default)]
pub struct PostgresConfig {
    /// Full connection URL.
    pub url: Option<String>,
    /// Server host.
    pub host: Option<String>,
    /// Server port.
    pub port: Option<u16>,
    /// Login user.
    pub user: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Database name.
    pub database: Option<String>,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// How long to wait for a pooled connection before giving up.
    pub acquire_timeout: Duration,
}

impl PostgresConfig {
    /// Creates a configuration from a connection URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::with_defaults()
        }
    }

    /// Creates an empty configuration with default pool settings.
    pub fn with_defaults() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
            ..Self::default()
        }
    }

    /// Returns true if enough parameters are present to attempt a connection.
    pub fn is_complete(&self) -> bool {
        self.url.is_some()
            || (self.host.is_some() && self.user.is_some() && self.database.is_some())
    }

    pub(crate) fn connect_options(&self) -> TodoStoreResult<PgConnectOptions> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).map_err(TodoStoreError::from);
        }

        if !self.is_complete() {
            return Err(TodoStoreError::StorageSetup(
                "PostgreSQL host, user, and database are required".to_string(),
            ));
        }

        let mut options = PgConnectOptions::new();
        if let Some(host) = &self.host {
            options = options.host(host);
        }
        if let Some(port) = self.port {
            options = options.port(port);
        }
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        Ok(options)
    }
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}
