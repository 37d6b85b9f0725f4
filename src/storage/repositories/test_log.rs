//! Check history repository
//!
//! Append-only log of connectivity check outcomes. Entries are never updated
//! or deleted; reads always return the newest entries first.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tokio::sync::OnceCell;
use tracing::{instrument, Instrument};

use crate::db_span;
use crate::domain::{LogEntry, LogLevel, LogScope};
use crate::errors::{AdminError, Result};
use crate::storage::DbPool;

pub const TEST_LOG_TABLE: &str = "catalog_admin_logs";

/// Internal database row structure for log entries.
#[derive(Debug, Clone, FromRow)]
struct TestLogRow {
    pub id: i64,
    pub scope: String,
    pub level: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TestLogRow> for LogEntry {
    type Error = AdminError;

    fn try_from(row: TestLogRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            scope: row.scope.parse()?,
            level: row.level.parse()?,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

/// Repository trait for the check history
#[async_trait]
pub trait TestLogRepository: Send + Sync {
    /// Append one entry; the id and timestamp are assigned by storage
    async fn append(&self, scope: LogScope, level: LogLevel, message: &str) -> Result<()>;

    /// At most `limit` entries, newest first with id as tie-break
    async fn recent(&self, limit: u32) -> Result<Vec<LogEntry>>;
}

/// SQLx-backed check history repository
#[derive(Debug, Clone)]
pub struct SqlxTestLogRepository {
    pool: DbPool,
    table_ready: Arc<OnceCell<()>>,
}

impl SqlxTestLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool, table_ready: Arc::new(OnceCell::new()) }
    }

    async fn ensure_table(&self) -> Result<()> {
        self.table_ready
            .get_or_try_init(|| async {
                sqlx::query(
                    "CREATE TABLE IF NOT EXISTS catalog_admin_logs ( \
                     id BIGINT PRIMARY KEY AUTO_INCREMENT, \
                     scope VARCHAR(32) NOT NULL, \
                     level VARCHAR(16) NOT NULL, \
                     message TEXT NOT NULL, \
                     created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP)",
                )
                .execute(&self.pool)
                .instrument(db_span!("ensure_table", table = TEST_LOG_TABLE))
                .await
                .map_err(|e| AdminError::Database {
                    source: e,
                    context: format!("Failed to create table '{}'", TEST_LOG_TABLE),
                })?;
                Ok::<(), AdminError>(())
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TestLogRepository for SqlxTestLogRepository {
    #[instrument(
        skip(self, message),
        fields(scope = %scope, level = %level),
        name = "db_append_test_log"
    )]
    async fn append(&self, scope: LogScope, level: LogLevel, message: &str) -> Result<()> {
        self.ensure_table().await?;

        sqlx::query("INSERT INTO catalog_admin_logs (scope, level, message) VALUES (?, ?, ?)")
            .bind(scope.as_str())
            .bind(level.as_str())
            .bind(message)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, scope = %scope, "Failed to append check log entry");
                AdminError::Database {
                    source: e,
                    context: format!("Failed to record {} check outcome", scope),
                }
            })?;

        Ok(())
    }

    #[instrument(skip(self), name = "db_recent_test_logs")]
    async fn recent(&self, limit: u32) -> Result<Vec<LogEntry>> {
        self.ensure_table().await?;

        let rows = sqlx::query_as::<_, TestLogRow>(
            "SELECT id, scope, level, message, created_at FROM catalog_admin_logs \
             WHERE scope IN ('database', 'search', 'combined') \
             AND level IN ('info', 'warn', 'error') \
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list check log entries");
            AdminError::Database { source: e, context: "Failed to list check history".into() }
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                LogEntry::try_from(row)
                    .map_err(|e| tracing::warn!(id, error = %e, "Skipping unreadable log entry"))
                    .ok()
            })
            .collect())
    }
}

/// In-memory check history for tests
#[cfg(test)]
#[derive(Clone)]
pub struct MockTestLogRepository {
    entries: std::sync::Arc<std::sync::Mutex<Vec<LogEntry>>>,
    fail: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

#[cfg(test)]
impl MockTestLogRepository {
    pub fn new() -> Self {
        Self { entries: Default::default(), fail: Default::default() }
    }

    /// Make every subsequent call fail as if storage were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.fail.store(unavailable, std::sync::atomic::Ordering::SeqCst);
    }

    /// Everything appended so far, in insertion order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Insert an entry with an explicit timestamp.
    pub fn push_at(&self, scope: LogScope, level: LogLevel, message: &str, at: DateTime<Utc>) {
        let mut entries = self.entries.lock().unwrap();
        let id = entries.len() as i64 + 1;
        entries.push(LogEntry { id, scope, level, message: message.to_string(), created_at: at });
    }

    fn check_available(&self) -> Result<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AdminError::Database {
                source: sqlx::Error::PoolTimedOut,
                context: "Failed to record check outcome".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[async_trait]
impl TestLogRepository for MockTestLogRepository {
    async fn append(&self, scope: LogScope, level: LogLevel, message: &str) -> Result<()> {
        self.check_available()?;
        self.push_at(scope, level, message, Utc::now());
        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<LogEntry>> {
        self.check_available()?;
        let mut entries = self.entries();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        entries.truncate(limit as usize);
        Ok(entries)
    }
}
