//! # Configuration Settings
//!
//! Defines the configuration structure for the catalog admin service. Every
//! value comes from the process environment; see [`AppConfig::from_env`].

use crate::errors::{AdminError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Validate, Default)]
pub struct AppConfig {
    /// HTTP API server configuration
    #[validate(nested)]
    pub api: ApiServerConfig,

    /// Own-storage pool configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Credentials for the database cluster being checked (also the default
    /// home of the service's own tables)
    pub cluster: ClusterCredentials,

    /// Credentials for the hosted search service
    pub search: SearchCredentials,

    /// Logging configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Blank values are
    /// treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = Self {
            api: ApiServerConfig {
                bind_address: get("CATALOG_ADMIN_API_BIND_ADDRESS")
                    .unwrap_or_else(|| ApiServerConfig::default().bind_address),
                port: parse_or(get("CATALOG_ADMIN_API_PORT"), "CATALOG_ADMIN_API_PORT", 8080)?,
            },
            database: DatabaseConfig {
                url: get("DATABASE_URL"),
                max_connections: parse_or(
                    get("DATABASE_MAX_CONNECTIONS"),
                    "DATABASE_MAX_CONNECTIONS",
                    5,
                )?,
                connect_timeout_seconds: parse_or(
                    get("DATABASE_CONNECT_TIMEOUT_SECONDS"),
                    "DATABASE_CONNECT_TIMEOUT_SECONDS",
                    10,
                )?,
            },
            cluster: ClusterCredentials {
                host: get("TIDB_HOST"),
                port: get("TIDB_PORT")
                    .map(|raw| parse_value::<u16>(&raw, "TIDB_PORT"))
                    .transpose()?,
                user: get("TIDB_USER"),
                password: get("TIDB_PASSWORD"),
                default_database: get("TIDB_DATABASE"),
                ssl_ca_pem: get("TIDB_SSL_CA_PEM"),
            },
            search: SearchCredentials {
                app_id: get("ALGOLIA_APP_ID"),
                admin_api_key: get("ALGOLIA_ADMIN_API_KEY"),
                host: get("ALGOLIA_HOST"),
            },
            observability: ObservabilityConfig {
                log_level: get("CATALOG_ADMIN_LOG_LEVEL")
                    .unwrap_or_else(|| ObservabilityConfig::default().log_level),
                json_logging: get("CATALOG_ADMIN_JSON_LOGGING")
                    .map(|s| s.to_lowercase() == "true" || s == "1")
                    .unwrap_or(false),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(AdminError::from)
    }
}

fn parse_value<T>(raw: &str, key: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AdminError::validation_field(format!("Invalid {key} value: {e}"), key))
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(raw) => parse_value(&raw, key),
        None => Ok(default),
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Bind address cannot be empty"))]
    pub bind_address: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl ApiServerConfig {
    /// Get the server bind address
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Own-storage pool configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Explicit connection URL; when absent the cluster credentials are used
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: None, max_connections: 5, connect_timeout_seconds: 10 }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Connection credentials for the MySQL-protocol cluster under test
#[derive(Clone, Default)]
pub struct ClusterCredentials {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Database used when a check does not name one
    pub default_database: Option<String>,
    /// PEM-encoded certificate authority for TLS connections
    pub ssl_ca_pem: Option<String>,
}

impl ClusterCredentials {
    /// Default database name, or empty when none is configured.
    pub fn default_database_name(&self) -> &str {
        self.default_database.as_deref().unwrap_or("")
    }
}

impl fmt::Debug for ClusterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("default_database", &self.default_database)
            .field("ssl_ca_pem", &self.ssl_ca_pem.is_some())
            .finish()
    }
}

/// Credentials for the hosted search service
#[derive(Clone, Default)]
pub struct SearchCredentials {
    pub app_id: Option<String>,
    pub admin_api_key: Option<String>,
    /// Base URL override; defaults to the application's DSN host
    pub host: Option<String>,
}

impl SearchCredentials {
    /// Both the application id and admin key are present.
    pub fn is_configured(&self) -> bool {
        self.app_id.is_some() && self.admin_api_key.is_some()
    }
}

impl fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("app_id", &self.app_id)
            .field("admin_api_key", &self.admin_api_key.as_ref().map(|_| "***"))
            .field("host", &self.host)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_empty() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.api.socket_address(), "0.0.0.0:8080");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.connect_timeout(), Duration::from_secs(10));
        assert!(config.database.url.is_none());
        assert!(!config.search.is_configured());
        assert_eq!(config.cluster.default_database_name(), "");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_reads_cluster_and_search_credentials() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TIDB_HOST", "gateway.example.com"),
            ("TIDB_PORT", "4000"),
            ("TIDB_USER", "root"),
            ("TIDB_PASSWORD", "secret"),
            ("TIDB_DATABASE", "catalog"),
            ("ALGOLIA_APP_ID", "APP"),
            ("ALGOLIA_ADMIN_API_KEY", "key"),
        ]))
        .unwrap();

        assert_eq!(config.cluster.host.as_deref(), Some("gateway.example.com"));
        assert_eq!(config.cluster.port, Some(4000));
        assert_eq!(config.cluster.default_database_name(), "catalog");
        assert!(config.search.is_configured());
    }

    #[test]
    fn test_blank_values_are_missing() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("ALGOLIA_APP_ID", "APP"),
            ("ALGOLIA_ADMIN_API_KEY", "   "),
            ("TIDB_DATABASE", ""),
        ]))
        .unwrap();

        assert!(!config.search.is_configured());
        assert!(config.cluster.default_database.is_none());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("TIDB_PORT", "not-a-port")]));
        assert!(matches!(result, Err(AdminError::Validation { .. })));

        let result = AppConfig::from_lookup(lookup_from(&[("CATALOG_ADMIN_API_PORT", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_pool_size_range_is_validated() {
        let result = AppConfig::from_lookup(lookup_from(&[("DATABASE_MAX_CONNECTIONS", "0")]));
        assert!(result.is_err());

        let result = AppConfig::from_lookup(lookup_from(&[("DATABASE_MAX_CONNECTIONS", "500")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cluster = ClusterCredentials {
            password: Some("hunter2".to_string()),
            ..Default::default()
        };
        let search =
            SearchCredentials { admin_api_key: Some("topsecret".to_string()), ..Default::default() };

        assert!(!format!("{:?}", cluster).contains("hunter2"));
        assert!(!format!("{:?}", search).contains("topsecret"));
    }
}
