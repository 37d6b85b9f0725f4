//! Database probe abstraction for cluster connectivity checks
//!
//! Each check opens a dedicated connection scoped to the database under test
//! instead of borrowing from the service's own pool.

use crate::config::ClusterCredentials;
use crate::domain::CheckError;
use crate::errors::AdminError;
use crate::storage::cluster_connect_options;
use async_trait::async_trait;
use sqlx::mysql::MySqlConnection;
use sqlx::Connection;
use std::time::Duration;
use tracing::{debug, instrument};

/// Opens connections to the cluster under test.
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    /// Open a fresh connection. `None` or an empty name selects the default database.
    async fn connect(
        &self,
        database: Option<&str>,
    ) -> std::result::Result<Box<dyn ProbeConnection>, CheckError>;
}

/// A single open connection used by one database check.
#[async_trait]
pub trait ProbeConnection: Send {
    /// Round-trip a trivial statement.
    async fn ping(&mut self) -> std::result::Result<(), CheckError>;

    /// Count rows in `table`. Fails when the table does not exist.
    async fn count_rows(&mut self, table: &str) -> std::result::Result<i64, CheckError>;

    /// Close the connection. Errors are swallowed; the check is already decided.
    async fn close(&mut self);
}

/// Probe backed by a direct sqlx MySQL connection.
pub struct MySqlProbe {
    credentials: ClusterCredentials,
    connect_timeout: Duration,
}

impl MySqlProbe {
    pub fn new(credentials: ClusterCredentials, connect_timeout: Duration) -> Self {
        Self { credentials, connect_timeout }
    }
}

#[async_trait]
impl DatabaseProbe for MySqlProbe {
    #[instrument(skip(self), name = "database_probe_connect")]
    async fn connect(
        &self,
        database: Option<&str>,
    ) -> std::result::Result<Box<dyn ProbeConnection>, CheckError> {
        let options = cluster_connect_options(&self.credentials, database).map_err(|e| match e {
            AdminError::Config { message, .. } => {
                CheckError::new(Some("config".to_string()), message)
            }
            other => CheckError::message_only(other.to_string()),
        })?;

        let connection =
            tokio::time::timeout(self.connect_timeout, MySqlConnection::connect_with(&options))
                .await
                .map_err(|_| {
                    CheckError::new(
                        Some("timeout".to_string()),
                        format!(
                            "Connection timed out after {}s",
                            self.connect_timeout.as_secs()
                        ),
                    )
                })?
                .map_err(|e| check_error_from_sqlx(&e))?;

        debug!("Opened probe connection");
        Ok(Box::new(MySqlProbeConnection { connection: Some(connection) }))
    }
}

struct MySqlProbeConnection {
    connection: Option<MySqlConnection>,
}

impl MySqlProbeConnection {
    fn connection(&mut self) -> std::result::Result<&mut MySqlConnection, CheckError> {
        self.connection
            .as_mut()
            .ok_or_else(|| CheckError::new(Some("closed".to_string()), "Connection is closed"))
    }
}

#[async_trait]
impl ProbeConnection for MySqlProbeConnection {
    async fn ping(&mut self) -> std::result::Result<(), CheckError> {
        let connection = self.connection()?;
        sqlx::query("SELECT 1")
            .execute(connection)
            .await
            .map(|_| ())
            .map_err(|e| check_error_from_sqlx(&e))
    }

    async fn count_rows(&mut self, table: &str) -> std::result::Result<i64, CheckError> {
        let sql = format!("SELECT COUNT(*) AS c FROM {}", quote_identifier(table));
        let connection = self.connection()?;
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(connection)
            .await
            .map_err(|e| check_error_from_sqlx(&e))
    }

    async fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            if let Err(e) = connection.close().await {
                debug!(error = %e, "Probe connection did not close cleanly");
            }
        }
    }
}

/// Quote a table name as a MySQL identifier, doubling embedded backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Map a driver error to the code/message pair reported in check results.
///
/// Server-side errors carry their SQLSTATE code; client-side failures are
/// labelled by kind.
pub fn check_error_from_sqlx(error: &sqlx::Error) -> CheckError {
    match error {
        sqlx::Error::Database(db_error) => {
            CheckError::new(db_error.code().map(|code| code.into_owned()), db_error.message())
        }
        sqlx::Error::Io(io_error) => {
            CheckError::new(Some("unreachable".to_string()), io_error.to_string())
        }
        sqlx::Error::Tls(tls_error) => {
            CheckError::new(Some("tls".to_string()), tls_error.to_string())
        }
        sqlx::Error::Protocol(message) => {
            CheckError::new(Some("protocol".to_string()), message.clone())
        }
        sqlx::Error::RowNotFound => CheckError::new(Some("no_rows".to_string()), error.to_string()),
        other => CheckError::message_only(other.to_string()),
    }
}

#[cfg(test)]
pub use mock::{MockDatabaseProbe, ProbeCalls};
