use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Cost range accepted by bcrypt
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub list: ListConfig,
    pub security: SecurityConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub request_timeout_secs: u64,
    pub shutdown_grace_secs: u64,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Config for commands that never bind a listener; `PORT` may be absent.
    pub fn maintenance_from_env() -> Result<Self, ConfigError> {
        Self::maintenance_from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load(lookup, true)
    }

    pub fn maintenance_from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load(lookup, false)
    }

    fn load<F>(lookup: F, require_port: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a TCP port number",
                value: raw.clone(),
            })?,
            None if require_port => return Err(ConfigError::Missing("PORT")),
            None => 0,
        };
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        // Set defaults based on environment, then override with specific env vars
        let config = Self::preset(environment, port, database_url).with_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would only fail later, per request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.list.default_page_size < 1 {
            return Err(ConfigError::Invalid {
                name: "LIST_DEFAULT_PAGE_SIZE",
                expected: "at least 1",
                value: self.list.default_page_size.to_string(),
            });
        }
        if self.list.max_page_size < self.list.default_page_size {
            return Err(ConfigError::Invalid {
                name: "LIST_MAX_PAGE_SIZE",
                expected: "at least LIST_DEFAULT_PAGE_SIZE",
                value: self.list.max_page_size.to_string(),
            });
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "SECURITY_BCRYPT_COST",
                expected: "between 4 and 31",
                value: self.security.bcrypt_cost.to_string(),
            });
        }
        Ok(())
    }

    pub fn preset(environment: Environment, port: u16, database_url: impl Into<String>) -> Self {
        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };
        config.server.port = port;
        config.database.url = database_url.into();
        config
    }

    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database overrides
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = lookup("API_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }
        if let Some(v) = lookup("API_SHUTDOWN_GRACE_SECS") {
            self.api.shutdown_grace_secs = v.parse().unwrap_or(self.api.shutdown_grace_secs);
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Listing overrides
        if let Some(v) = lookup("LIST_DEFAULT_PAGE_SIZE") {
            self.list.default_page_size = v.parse().unwrap_or(self.list.default_page_size);
        }
        if let Some(v) = lookup("LIST_MAX_PAGE_SIZE") {
            self.list.max_page_size = v.parse().unwrap_or(self.list.max_page_size);
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        if let Some(v) = lookup("LOG_FORMAT") {
            self.log_format = match v.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "text" | "pretty" => LogFormat::Text,
                _ => self.log_format,
            };
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 0 },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                request_timeout_secs: 60,
                shutdown_grace_secs: 30,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            list: ListConfig {
                default_page_size: 50,
                max_page_size: 1000,
            },
            security: SecurityConfig {
                bcrypt_cost: 10,
            },
            log_format: LogFormat::Text,
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 0 },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                request_timeout_secs: 60,
                shutdown_grace_secs: 30,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            list: ListConfig {
                default_page_size: 50,
                max_page_size: 500,
            },
            security: SecurityConfig {
                bcrypt_cost: 10,
            },
            log_format: LogFormat::Json,
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 0 },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                request_timeout_secs: 60,
                shutdown_grace_secs: 30,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            list: ListConfig {
                default_page_size: 50,
                max_page_size: 200,
            },
            security: SecurityConfig {
                bcrypt_cost: 10,
            },
            log_format: LogFormat::Json,
        }
    }
}
