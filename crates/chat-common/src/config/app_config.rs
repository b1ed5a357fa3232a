//! Application configuration structs
//!
//! Loads configuration from environment variables (and `.env` when present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub messages: MessageConfig,
    pub storage: StorageConfig,
    pub cors: CorsConfig,
    pub gateway: GatewayConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
    /// `LOG_FORMAT`: Some(true) for json, Some(false) for pretty, None for the preset
    #[serde(default)]
    pub json_logs: Option<bool>,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(other.to_string()),
        }
    }
}

/// HTTP + socket listener
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which persistent store backs the repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(other.to_string()),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Required when `backend` is Postgres
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

/// Message history and lastMessage cache settings
#[derive(Debug, Clone, Deserialize)]
pub struct MessageConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            preview_length: default_preview_length(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// Empty means any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// File storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u32,
}

impl StorageConfig {
    #[must_use]
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb as usize * 1024 * 1024
    }
}

/// Socket settings
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Outbound queue length per connection
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "chat-server".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_run_migrations() -> bool {
    true
}

fn default_batch_size() -> u32 {
    30
}

fn default_preview_length() -> usize {
    100
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_max_file_size() -> u32 {
    5
}

fn default_buffer_size() -> usize {
    100
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is required but missing, or fails to parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL");
        let backend = match var("STORE_BACKEND") {
            Some(raw) => raw
                .parse()
                .map_err(|v| ConfigError::InvalidValue("STORE_BACKEND", v))?,
            None if database_url.is_some() => StoreBackend::Postgres,
            None => StoreBackend::Memory,
        };
        if backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL"));
        }

        let messages = MessageConfig {
            batch_size: parse_or(&var, "MESSAGE_BATCH_SIZE", default_batch_size)?,
            preview_length: parse_or(&var, "MESSAGE_PREVIEW_LENGTH", default_preview_length)?,
        };
        if messages.batch_size == 0 {
            return Err(ConfigError::InvalidValue("MESSAGE_BATCH_SIZE", "0".to_string()));
        }

        Ok(Self {
            app: AppSettings {
                name: var("APP_NAME").unwrap_or_else(default_app_name),
                env: match var("APP_ENV") {
                    Some(raw) => raw
                        .parse()
                        .map_err(|v| ConfigError::InvalidValue("APP_ENV", v))?,
                    None => Environment::default(),
                },
                json_logs: match var("LOG_FORMAT").map(|f| f.to_lowercase()).as_deref() {
                    Some("json") => Some(true),
                    Some("pretty" | "text") => Some(false),
                    Some(other) => {
                        return Err(ConfigError::InvalidValue("LOG_FORMAT", other.to_string()))
                    }
                    None => None,
                },
            },
            server: ServerConfig {
                host: var("HOST").unwrap_or_else(default_host),
                port: parse_or(&var, "PORT", default_port)?,
            },
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: parse_or(&var, "DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                run_migrations: parse_or(&var, "DATABASE_RUN_MIGRATIONS", default_run_migrations)?,
            },
            messages,
            storage: StorageConfig {
                upload_dir: var("UPLOAD_DIR").unwrap_or_else(default_upload_dir),
                max_file_size_mb: parse_or(&var, "MAX_FILE_SIZE_MB", default_max_file_size)?,
            },
            cors: CorsConfig {
                allowed_origins: var("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            gateway: GatewayConfig {
                buffer_size: parse_or(&var, "GATEWAY_BUFFER_SIZE", default_buffer_size)?,
            },
            snowflake: SnowflakeConfig {
                worker_id: parse_or(&var, "WORKER_ID", || 0)?,
            },
        })
    }
}

fn parse_or<T, V, D>(var: &V, key: &'static str, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    V: Fn(&str) -> Option<String>,
    D: FnOnce() -> T,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_defaults_use_memory_store() {
        let config = load(&[]).unwrap();
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.messages.batch_size, 30);
        assert_eq!(config.messages.preview_length, 100);
        assert_eq!(config.storage.max_file_size_bytes(), 5 * 1024 * 1024);
        assert_eq!(config.gateway.buffer_size, 100);
        assert!(config.cors.allowed_origins.is_empty());
    }

    #[test]
    fn test_database_url_selects_postgres() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/chat")]).unwrap();
        assert_eq!(config.database.backend, StoreBackend::Postgres);
    }

    #[test]
    fn test_postgres_requires_url() {
        let err = load(&[("STORE_BACKEND", "postgres")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("PORT", "not-a-port")]),
            Err(ConfigError::InvalidValue("PORT", _))
        ));
        assert!(matches!(
            load(&[("MESSAGE_BATCH_SIZE", "0")]),
            Err(ConfigError::InvalidValue("MESSAGE_BATCH_SIZE", _))
        ));
        assert!(matches!(
            load(&[("APP_ENV", "moon")]),
            Err(ConfigError::InvalidValue("APP_ENV", _))
        ));
    }

    #[test]
    fn test_cors_origins_are_split() {
        let config = load(&[("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,")]).unwrap();
        assert_eq!(config.cors.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }
}
