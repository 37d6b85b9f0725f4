//! Settings repository
//!
//! Stores each admin setting as its own key/value row so that a partial update
//! only ever touches the keys it names.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::FromRow;
use tokio::sync::OnceCell;
use tracing::{instrument, Instrument};

use crate::db_span;
use crate::domain::{AdminSettings, SettingsPatch};
use crate::errors::{AdminError, Result};
use crate::storage::DbPool;

pub const SETTINGS_TABLE: &str = "catalog_admin_config";

#[derive(Debug, Clone, FromRow)]
struct SettingRow {
    k: String,
    v: String,
}

/// Repository trait for admin settings
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Current settings, with defaults for keys that were never stored
    async fn get(&self) -> Result<AdminSettings>;

    /// Upsert the fields present in `patch` and return the resulting settings
    async fn merge(&self, patch: &SettingsPatch) -> Result<AdminSettings>;
}

/// SQLx-backed settings repository
#[derive(Debug, Clone)]
pub struct SqlxSettingsRepository {
    pool: DbPool,
    default_database: String,
    table_ready: Arc<OnceCell<()>>,
}

impl SqlxSettingsRepository {
    /// `default_database` is reported when no database name has been stored.
    pub fn new(pool: DbPool, default_database: impl Into<String>) -> Self {
        Self {
            pool,
            default_database: default_database.into(),
            table_ready: Arc::new(OnceCell::new()),
        }
    }

    async fn ensure_table(&self) -> Result<()> {
        self.table_ready
            .get_or_try_init(|| async {
                sqlx::query(
                    "CREATE TABLE IF NOT EXISTS catalog_admin_config ( \
                     k VARCHAR(64) PRIMARY KEY, \
                     v TEXT NOT NULL, \
                     updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP)",
                )
                .execute(&self.pool)
                .instrument(db_span!("ensure_table", table = SETTINGS_TABLE))
                .await
                .map_err(|e| AdminError::Database {
                    source: e,
                    context: format!("Failed to create table '{}'", SETTINGS_TABLE),
                })?;
                Ok::<(), AdminError>(())
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for SqlxSettingsRepository {
    #[instrument(skip(self), name = "db_get_settings")]
    async fn get(&self) -> Result<AdminSettings> {
        self.ensure_table().await?;

        let rows = sqlx::query_as::<_, SettingRow>("SELECT k, v FROM catalog_admin_config")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to read admin settings");
                AdminError::Database { source: e, context: "Failed to read admin settings".into() }
            })?;

        Ok(AdminSettings::from_stored(
            &self.default_database,
            rows.into_iter().map(|row| (row.k, row.v)),
        ))
    }

    #[instrument(
        skip(self, patch),
        fields(field_count = patch.entries().len()),
        name = "db_merge_settings"
    )]
    async fn merge(&self, patch: &SettingsPatch) -> Result<AdminSettings> {
        self.ensure_table().await?;

        let mut tx = self.pool.begin().await.map_err(|e| AdminError::Database {
            source: e,
            context: "Failed to begin settings transaction".into(),
        })?;

        for (key, value) in patch.entries() {
            sqlx::query(
                "INSERT INTO catalog_admin_config (k, v) VALUES (?, ?) \
                 ON DUPLICATE KEY UPDATE v = VALUES(v)",
            )
            .bind(key.as_str())
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = key.as_str(), "Failed to upsert setting");
                AdminError::Database {
                    source: e,
                    context: format!("Failed to store setting '{}'", key.as_str()),
                }
            })?;
        }

        tx.commit().await.map_err(|e| AdminError::Database {
            source: e,
            context: "Failed to commit settings transaction".into(),
        })?;

        let keys: Vec<&str> = patch.entries().iter().map(|(key, _)| key.as_str()).collect();
        tracing::info!(keys = ?keys, "Merged admin settings");

        self.get().await
    }
}

#[cfg(test)]
type StoredRows = std::collections::HashMap<crate::domain::SettingKey, String>;

/// In-memory settings repository for tests
#[cfg(test)]
#[derive(Clone)]
pub struct MockSettingsRepository {
    default_database: String,
    rows: std::sync::Arc<std::sync::Mutex<StoredRows>>,
    fail: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

#[cfg(test)]
impl MockSettingsRepository {
    pub fn new(default_database: &str) -> Self {
        Self {
            default_database: default_database.to_string(),
            rows: Default::default(),
            fail: Default::default(),
        }
    }

    /// Make every subsequent call fail as if storage were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.fail.store(unavailable, std::sync::atomic::Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AdminError::Database {
                source: sqlx::Error::PoolTimedOut,
                context: "Failed to read admin settings".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[async_trait]
impl SettingsRepository for MockSettingsRepository {
    async fn get(&self) -> Result<AdminSettings> {
        self.check_available()?;
        let mut settings = AdminSettings::with_default_database(&self.default_database);
        for (key, value) in self.rows.lock().unwrap().iter() {
            settings.set(*key, value.clone());
        }
        Ok(settings)
    }

    async fn merge(&self, patch: &SettingsPatch) -> Result<AdminSettings> {
        self.check_available()?;
        {
            let mut rows = self.rows.lock().unwrap();
            for (key, value) in patch.entries() {
                rows.insert(key, value.to_string());
            }
        }
        self.get().await
    }
}
