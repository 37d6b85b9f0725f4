//! # Database Connection Pool Management
//!
//! Builds MySQL connection options from configuration and creates the pool that
//! backs the service's own settings and check-history tables.

use crate::config::{ClusterCredentials, DatabaseConfig};
use crate::errors::{AdminError, Result};
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlSslMode};
use sqlx::{MySql, Pool};
use std::str::FromStr;

/// Type alias for the database connection pool
pub type DbPool = Pool<MySql>;

const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Build connection options for the cluster under test.
///
/// `database` overrides the configured default database. Host, user, password
/// and a database name are all required.
pub fn cluster_connect_options(
    credentials: &ClusterCredentials,
    database: Option<&str>,
) -> Result<MySqlConnectOptions> {
    let database =
        database.filter(|name| !name.is_empty()).or(credentials.default_database.as_deref());

    let (Some(host), Some(user), Some(password), Some(database)) = (
        credentials.host.as_deref(),
        credentials.user.as_deref(),
        credentials.password.as_deref(),
        database,
    ) else {
        return Err(AdminError::config(
            "Database cluster environment variables are not fully configured.",
        ));
    };

    let options = MySqlConnectOptions::new()
        .host(host)
        .port(credentials.port.unwrap_or(DEFAULT_MYSQL_PORT))
        .username(user)
        .password(password)
        .database(database);

    // A CA means full verification: chain and server hostname.
    Ok(match credentials.ssl_ca_pem.as_deref() {
        Some(ca) => options
            .ssl_mode(MySqlSslMode::VerifyIdentity)
            .ssl_ca_from_pem(ca.as_bytes().to_vec()),
        None => options,
    })
}

/// Create the own-storage pool.
///
/// No connection is opened here; the first repository call establishes one.
/// An explicit `url` wins over the cluster credentials.
pub fn create_pool(config: &DatabaseConfig, cluster: &ClusterCredentials) -> Result<DbPool> {
    validate_config(config)?;

    let connect_options = match config.url.as_deref() {
        Some(url) => MySqlConnectOptions::from_str(url).map_err(|e| AdminError::Database {
            source: e,
            context: format!("Invalid MySQL connection string: {}", sanitize_url(url)),
        })?,
        None => cluster_connect_options(cluster, None)?,
    };

    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout())
        .connect_lazy_with(connect_options);

    tracing::info!(
        source = if config.url.is_some() { "database_url" } else { "cluster_credentials" },
        max_connections = config.max_connections,
        connect_timeout_ms = config.connect_timeout().as_millis(),
        "Database connection pool configured"
    );

    Ok(pool)
}

/// Validate database configuration
fn validate_config(config: &DatabaseConfig) -> Result<()> {
    if config.max_connections == 0 {
        return Err(AdminError::validation("max_connections must be greater than 0"));
    }

    if let Some(url) = config.url.as_deref() {
        if !url.starts_with("mysql://") {
            return Err(AdminError::validation("database URL must start with 'mysql://'"));
        }
    }

    Ok(())
}

/// Sanitize database URL for logging (remove credentials)
pub(crate) fn sanitize_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) if parsed.password().is_some() || !parsed.username().is_empty() => format!(
            "{}://***:***@{}{}",
            parsed.scheme(),
            parsed.host_str().unwrap_or("unknown"),
            parsed.path()
        ),
        _ => url.to_string(),
    }
}
