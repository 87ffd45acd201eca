//! Server configuration

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;
use todo_store::{Backend, PostgresConfig, SqliteConfig, StoreConfig};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0:3000")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Which storage backend to use
    #[serde(default)]
    pub backend: Backend,

    /// SQLite database path (used with the sqlite backend)
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,

    /// PostgreSQL connection settings (used with the postgres backend)
    #[serde(default)]
    pub postgres: PostgresSettings,

    /// Maximum pooled database connections
    #[serde(default)]
    pub db_max_connections: Option<u32>,

    /// Whether to enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

/// PostgreSQL connection settings
#[derive(Clone, Deserialize)]
pub struct PostgresSettings {
    /// Full connection URL; takes precedence over the discrete fields
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    /// Seconds to wait for a pooled connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl fmt::Debug for PostgresSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresSettings")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: None,
            user: None,
            password: None,
            database: None,
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_sqlite_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("todos")
        .join("todo.db")
}

fn default_enable_cors() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            backend: Backend::default(),
            sqlite_path: default_sqlite_path(),
            postgres: PostgresSettings::default(),
            db_max_connections: None,
            enable_cors: default_enable_cors(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional config file and the environment.
    ///
    /// Precedence: environment, then config file, then defaults.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let mut config = match Self::find_config_file() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Override fields from environment variables, read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("TODO_BIND_ADDRESS") {
            self.bind_address = addr;
        }

        if let Some(val) = lookup("TODO_BACKEND") {
            self.backend = val.parse().map_err(|_| ConfigError::invalid("TODO_BACKEND", &val))?;
        }

        if let Some(path) = lookup("TODO_SQLITE_PATH") {
            self.sqlite_path = PathBuf::from(path);
        }

        if let Some(url) = secret_var(&lookup, "DATABASE_URL")? {
            self.postgres.url = Some(url);
        }

        if let Some(host) = secret_var(&lookup, "TODO_PG_HOST")? {
            self.postgres.host = Some(host);
        }

        if let Some(port) = lookup("TODO_PG_PORT") {
            self.postgres.port =
                Some(port.parse().map_err(|_| ConfigError::invalid("TODO_PG_PORT", &port))?);
        }

        if let Some(user) = secret_var(&lookup, "TODO_PG_USER")? {
            self.postgres.user = Some(user);
        }

        if let Some(password) = secret_var(&lookup, "TODO_PG_PASSWORD")? {
            self.postgres.password = Some(password);
        }

        if let Some(database) = secret_var(&lookup, "TODO_PG_DATABASE")? {
            self.postgres.database = Some(database);
        }

        if let Some(max) = lookup("TODO_DB_MAX_CONNECTIONS") {
            self.db_max_connections = Some(
                max.parse()
                    .map_err(|_| ConfigError::invalid("TODO_DB_MAX_CONNECTIONS", &max))?,
            );
        }

        if let Some(val) = lookup("TODO_ENABLE_CORS") {
            self.enable_cors = val
                .parse()
                .map_err(|_| ConfigError::invalid("TODO_ENABLE_CORS", &val))?;
        }

        if let Some(level) = lookup("TODO_LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(format) = lookup("TODO_LOG_FORMAT") {
            self.log_format = format
                .parse()
                .map_err(|_| ConfigError::invalid("TODO_LOG_FORMAT", &format))?;
        }

        Ok(())
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let locations = [
            PathBuf::from("todo-server.toml"),
            PathBuf::from("/etc/todos/server.toml"),
            dirs::config_dir()
                .map(|p| p.join("todos").join("server.toml"))
                .unwrap_or_default(),
        ];

        locations.into_iter().find(|p| p.is_file())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == Backend::Postgres && !self.postgres_config().is_complete() {
            return Err(ConfigError::MissingPostgresSettings);
        }

        Ok(())
    }

    /// Builds the store configuration for the selected backend
    pub fn store_config(&self) -> StoreConfig {
        match self.backend {
            Backend::Sqlite => {
                let mut sqlite = SqliteConfig::new(&self.sqlite_path);
                if let Some(max) = self.db_max_connections {
                    sqlite.max_connections = max;
                }
                StoreConfig::Sqlite(sqlite)
            }
            Backend::Postgres => StoreConfig::Postgres(self.postgres_config()),
        }
    }

    fn postgres_config(&self) -> PostgresConfig {
        let mut postgres = PostgresConfig {
            url: self.postgres.url.clone(),
            host: self.postgres.host.clone(),
            port: self.postgres.port,
            user: self.postgres.user.clone(),
            password: self.postgres.password.clone(),
            database: self.postgres.database.clone(),
            acquire_timeout: Duration::from_secs(self.postgres.acquire_timeout_secs),
            ..PostgresConfig::with_defaults()
        };
        if let Some(max) = self.db_max_connections {
            postgres.max_connections = max;
        }
        postgres
    }
}

/// Reads `key`, or the contents of the file named by `{key}_FILE`.
///
/// The `_FILE` form wins so that mounted secrets override plain values.
fn secret_var<F>(lookup: &F, key: &str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(&format!("{}_FILE", key)) {
        let value = std::fs::read_to_string(&path).map_err(|source| ConfigError::SecretFile {
            key: key.to_string(),
            path: PathBuf::from(&path),
            source,
        })?;
        return Ok(Some(value.trim().to_string()));
    }

    Ok(lookup(key))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PostgreSQL backend requires DATABASE_URL or TODO_PG_HOST, TODO_PG_USER and TODO_PG_DATABASE")]
    MissingPostgresSettings,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Failed to read {key} from {}: {source}", .path.display())]
    SecretFile {
        key: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
        }
    }
}
