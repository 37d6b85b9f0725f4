//! Connectivity checks against the database cluster and the search index
//!
//! Each check talks to the outside world through a probe and records a
//! one-line outcome in the check history. Failures of the external services
//! are returned as data; only failures of the history store itself propagate.

use crate::domain::{
    parse_table_list, AdminSettings, CheckError, CombinedCheckResult, DatabaseCheckResult,
    LogLevel, LogScope, SearchCheckResult, TableCheck,
};
use crate::errors::Result;
use crate::services::database_probe::{DatabaseProbe, ProbeConnection};
use crate::services::search_probe::SearchProbe;
use crate::storage::TestLogRepository;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Message used when the search service has no credentials configured.
pub const SEARCH_NOT_CONFIGURED: &str = "Search credentials are not configured.";

/// Whether a check appends its own entry to the check history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recording {
    Record,
    Suppress,
}

/// Runs connectivity checks and records their outcomes.
#[derive(Clone)]
pub struct ConnectivityService {
    log_repository: Arc<dyn TestLogRepository>,
    database_probe: Arc<dyn DatabaseProbe>,
    search_probe: Option<Arc<dyn SearchProbe>>,
}

impl ConnectivityService {
    /// `search_probe` is `None` when search credentials are not configured.
    pub fn new(
        log_repository: Arc<dyn TestLogRepository>,
        database_probe: Arc<dyn DatabaseProbe>,
        search_probe: Option<Arc<dyn SearchProbe>>,
    ) -> Self {
        Self { log_repository, database_probe, search_probe }
    }

    /// Check that the database is reachable and that each listed table exists.
    ///
    /// An empty `database` selects the cluster's default database. `tables` is
    /// the raw comma-separated list.
    #[instrument(skip(self), name = "database_check")]
    pub async fn run_database_check(
        &self,
        database: &str,
        tables: &str,
        recording: Recording,
    ) -> Result<DatabaseCheckResult> {
        let table_names = parse_table_list(tables);
        let started = Instant::now();

        let target = Some(database).filter(|name| !name.is_empty());
        let result = match self.database_probe.connect(target).await {
            Err(error) => DatabaseCheckResult::failed(database, error, started.elapsed()),
            Ok(mut connection) => {
                let outcome = check_tables(connection.as_mut(), &table_names).await;
                let elapsed = started.elapsed();
                connection.close().await;

                match outcome {
                    Ok(table_checks) => {
                        DatabaseCheckResult::completed(database, table_checks, elapsed)
                    }
                    Err(error) => DatabaseCheckResult::failed(database, error, elapsed),
                }
            }
        };

        info!(
            ok = result.ok,
            duration_ms = result.duration_ms,
            tables = result.tables.len(),
            "Database check finished"
        );

        if recording == Recording::Record {
            self.record(LogScope::Database, LogLevel::for_outcome(result.ok), &result.summary())
                .await?;
        }

        Ok(result)
    }

    /// Check that the search index answers a settings read and an empty query.
    #[instrument(skip(self), name = "search_check")]
    pub async fn run_search_check(
        &self,
        index: &str,
        recording: Recording,
    ) -> Result<SearchCheckResult> {
        let Some(probe) = self.search_probe.as_ref() else {
            warn!("Search check requested without configured credentials");
            let result =
                SearchCheckResult::failed(index, CheckError::message_only(SEARCH_NOT_CONFIGURED));
            if recording == Recording::Record {
                self.record(LogScope::Search, LogLevel::Error, SEARCH_NOT_CONFIGURED).await?;
            }
            return Ok(result);
        };

        let outcome = match probe.fetch_settings(index).await {
            Ok(()) => probe.probe_search(index).await,
            Err(error) => Err(error),
        };

        let result = match outcome {
            Ok(()) => SearchCheckResult::reachable(index),
            Err(error) => SearchCheckResult::failed(index, error),
        };

        info!(ok = result.ok, "Search check finished");

        if recording == Recording::Record {
            self.record(LogScope::Search, LogLevel::for_outcome(result.ok), &result.summary())
                .await?;
        }

        Ok(result)
    }

    /// Run the database check then the search check and record a single
    /// combined entry.
    #[instrument(skip_all, name = "combined_check")]
    pub async fn run_all(&self, settings: &AdminSettings) -> Result<CombinedCheckResult> {
        let database = self
            .run_database_check(
                &settings.database_name,
                &settings.database_tables,
                Recording::Suppress,
            )
            .await?;
        let search = self.run_search_check(&settings.search_index_name, Recording::Suppress).await?;

        let combined = CombinedCheckResult { database, search };
        self.record(LogScope::Combined, combined.level(), &combined.summary()).await?;

        Ok(combined)
    }

    async fn record(&self, scope: LogScope, level: LogLevel, message: &str) -> Result<()> {
        self.log_repository.append(scope, level, message).await.inspect_err(|e| {
            warn!(scope = %scope, error = %e, "Failed to record check outcome");
        })
    }
}

/// Ping the connection, then count rows in each table. A failed ping fails the
/// whole check; a failed count only marks that table missing.
async fn check_tables(
    connection: &mut dyn ProbeConnection,
    table_names: &[String],
) -> std::result::Result<Vec<TableCheck>, CheckError> {
    connection.ping().await?;

    let mut checks = Vec::with_capacity(table_names.len());
    for name in table_names {
        let check = match connection.count_rows(name).await {
            Ok(row_count) => TableCheck::present(name, row_count),
            Err(error) => TableCheck::missing(name, error.message),
        };
        checks.push(check);
    }

    Ok(checks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::database_probe::MockDatabaseProbe;
    use crate::services::search_probe::MockSearchProbe;
    use crate::storage::repositories::MockTestLogRepository;

    fn service(
        logs: &MockTestLogRepository,
        database: &MockDatabaseProbe,
        search: Option<&MockSearchProbe>,
    ) -> ConnectivityService {
        ConnectivityService::new(
            Arc::new(logs.clone()),
            Arc::new(database.clone()),
            search.map(|probe| Arc::new(probe.clone()) as Arc<dyn SearchProbe>),
        )
    }

    fn settings(database: &str, tables: &str, index: &str) -> AdminSettings {
        AdminSettings {
            database_name: database.to_string(),
            database_tables: tables.to_string(),
            search_index_name: index.to_string(),
        }
    }

    #[tokio::test]
    async fn test_database_check_with_all_tables_present() {
        let logs = MockTestLogRepository::new();
        let database = MockDatabaseProbe::with_tables(&[("users", 42), ("orders", 0)]);
        let service = service(&logs, &database, None);

        let result = service
            .run_database_check("catalog", " users , orders ", Recording::Record)
            .await
            .unwrap();

        assert!(result.ok);
        assert_eq!(result.db, "catalog");
        assert_eq!(result.tables.len(), 2);
        assert_eq!(result.tables[0].row_count, Some(42));
        assert_eq!(result.tables[1].name, "orders");
        assert!(result.error.is_none());

        let entries = logs.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].scope, LogScope::Database);
        assert_eq!(entries[0].level, LogLevel::Info);
        assert!(entries[0].message.starts_with("Database OK in "));
        assert!(entries[0].message.ends_with("(users:ok, orders:ok)"));

        let calls = database.calls();
        assert_eq!(calls.connects, vec![Some("catalog".to_string())]);
        assert_eq!(calls.pings, 1);
        assert_eq!(calls.closes, 1);
    }

    #[tokio::test]
    async fn test_database_check_reports_missing_table_and_continues() {
        let logs = MockTestLogRepository::new();
        let database = MockDatabaseProbe::with_tables(&[("users", 3), ("orders", 1)]);
        let service = service(&logs, &database, None);

        let result = service
            .run_database_check("catalog", "users,missing_tbl,orders", Recording::Record)
            .await
            .unwrap();

        assert!(!result.ok);
        assert!(result.error.is_none());
        assert!(result.tables[0].exists);
        assert!(!result.tables[1].exists);
        assert!(result.tables[1].message.as_deref().unwrap().contains("missing_tbl"));
        assert!(result.tables[2].exists);
        assert_eq!(database.calls().counted, vec!["users", "missing_tbl", "orders"]);

        let entries = logs.entries();
        assert_eq!(entries[0].level, LogLevel::Error);
        assert!(entries[0].message.starts_with("Database issues in "));
        assert!(entries[0].message.ends_with("(users:ok, missing_tbl:missing, orders:ok)"));
    }

    #[tokio::test]
    async fn test_database_check_without_tables_is_ok() {
        let logs = MockTestLogRepository::new();
        let database = MockDatabaseProbe::with_tables(&[]);
        let service = service(&logs, &database, None);

        let result = service.run_database_check("", " , ", Recording::Record).await.unwrap();

        assert!(result.ok);
        assert!(result.tables.is_empty());
        assert_eq!(result.db, "");
        assert_eq!(database.calls().connects, vec![None]);
        assert!(logs.entries()[0].message.ends_with("(no tables provided)"));
    }

    #[tokio::test]
    async fn test_database_connect_failure_skips_tables() {
        let logs = MockTestLogRepository::new();
        let database = MockDatabaseProbe::failing_connect(CheckError::new(
            Some("unreachable".to_string()),
            "Connection refused",
        ));
        let service = service(&logs, &database, None);

        let result =
            service.run_database_check("catalog", "users", Recording::Record).await.unwrap();

        assert!(!result.ok);
        assert!(result.tables.is_empty());
        assert_eq!(result.error.as_ref().unwrap().code.as_deref(), Some("unreachable"));
        assert!(database.calls().counted.is_empty());
        assert_eq!(database.calls().closes, 0);

        let entries = logs.entries();
        assert_eq!(entries[0].level, LogLevel::Error);
        assert_eq!(entries[0].message, "Database error: Connection refused");
    }

    #[tokio::test]
    async fn test_database_ping_failure_closes_connection() {
        let logs = MockTestLogRepository::new();
        let database = MockDatabaseProbe::failing_ping(CheckError::message_only("server gone"));
        let service = service(&logs, &database, None);

        let result =
            service.run_database_check("catalog", "users", Recording::Record).await.unwrap();

        assert!(!result.ok);
        assert!(result.tables.is_empty());
        assert_eq!(result.error.unwrap().message, "server gone");
        assert!(database.calls().counted.is_empty());
        assert_eq!(database.calls().closes, 1);
    }

    #[tokio::test]
    async fn test_suppressed_database_check_does_not_record() {
        let logs = MockTestLogRepository::new();
        let database = MockDatabaseProbe::with_tables(&[("users", 1)]);
        let service = service(&logs, &database, None);

        service.run_database_check("catalog", "users", Recording::Suppress).await.unwrap();

        assert!(logs.entries().is_empty());
    }

    #[tokio::test]
    async fn test_search_check_without_credentials_makes_no_call() {
        let logs = MockTestLogRepository::new();
        let database = MockDatabaseProbe::default();
        let service = service(&logs, &database, None);

        let result = service.run_search_check("products", Recording::Record).await.unwrap();

        assert!(!result.ok);
        assert_eq!(result.index_name, "products");
        assert_eq!(result.error.unwrap().message, SEARCH_NOT_CONFIGURED);

        let entries = logs.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].scope, LogScope::Search);
        assert_eq!(entries[0].level, LogLevel::Error);
        assert_eq!(entries[0].message, SEARCH_NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_search_check_reachable() {
        let logs = MockTestLogRepository::new();
        let search = MockSearchProbe::reachable();
        let service = service(&logs, &MockDatabaseProbe::default(), Some(&search));

        let result = service.run_search_check("products", Recording::Record).await.unwrap();

        assert!(result.ok);
        assert_eq!(result.has_settings, Some(true));
        assert_eq!(search.calls(), 2);
        assert_eq!(logs.entries()[0].message, "Search index `products` reachable.");
        assert_eq!(logs.entries()[0].level, LogLevel::Info);
    }

    #[tokio::test]
    async fn test_search_settings_failure_skips_query() {
        let logs = MockTestLogRepository::new();
        let search = MockSearchProbe::failing_settings(CheckError::new(
            Some("http_404".to_string()),
            "Index does not exist",
        ));
        let service = service(&logs, &MockDatabaseProbe::default(), Some(&search));

        let result = service.run_search_check("products", Recording::Record).await.unwrap();

        assert!(!result.ok);
        assert_eq!(result.has_settings, None);
        assert_eq!(result.error.unwrap().code.as_deref(), Some("http_404"));
        assert_eq!(search.calls(), 1);
        assert_eq!(
            logs.entries()[0].message,
            "Search error for `products`: Index does not exist"
        );
    }

    #[tokio::test]
    async fn test_search_query_failure_fails_check() {
        let logs = MockTestLogRepository::new();
        let search = MockSearchProbe::failing_search(CheckError::new(
            Some("http_403".to_string()),
            "Invalid Application-ID or API key",
        ));
        let service = service(&logs, &MockDatabaseProbe::default(), Some(&search));

        let result = service.run_search_check("products", Recording::Suppress).await.unwrap();

        assert!(!result.ok);
        assert_eq!(search.calls(), 2);
        assert!(logs.entries().is_empty());
    }

    #[tokio::test]
    async fn test_run_all_records_single_warn_entry() {
        let logs = MockTestLogRepository::new();
        let database = MockDatabaseProbe::with_tables(&[("users", 5)]);
        let service = service(&logs, &database, None);

        let result = service.run_all(&settings("catalog", "users", "products")).await.unwrap();

        assert!(result.database.ok);
        assert!(!result.search.ok);
        assert!(!result.ok());

        let entries = logs.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].scope, LogScope::Combined);
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(
            entries[0].message,
            format!("All checks → Database: ok | Search: {}", SEARCH_NOT_CONFIGURED)
        );
    }

    #[tokio::test]
    async fn test_run_all_levels() {
        let logs = MockTestLogRepository::new();
        let search = MockSearchProbe::reachable();
        let ok_service =
            service(&logs, &MockDatabaseProbe::with_tables(&[("users", 1)]), Some(&search));
        let both_ok = ok_service.run_all(&settings("catalog", "users", "products")).await.unwrap();
        assert!(both_ok.ok());

        let failing_database =
            MockDatabaseProbe::failing_connect(CheckError::message_only("Access denied"));
        let failing_service = service(&logs, &failing_database, None);
        failing_service.run_all(&settings("catalog", "users", "products")).await.unwrap();

        let entries = logs.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[0].message, "All checks → Database: ok | Search: ok");
        assert_eq!(entries[1].level, LogLevel::Error);
        assert_eq!(
            entries[1].message,
            format!("All checks → Database: Access denied | Search: {}", SEARCH_NOT_CONFIGURED)
        );
    }

    #[tokio::test]
    async fn test_log_store_failure_propagates() {
        let logs = MockTestLogRepository::new();
        logs.set_unavailable(true);
        let database = MockDatabaseProbe::with_tables(&[]);
        let service = service(&logs, &database, None);

        assert!(service.run_database_check("catalog", "", Recording::Record).await.is_err());
        assert!(service.run_database_check("catalog", "", Recording::Suppress).await.is_ok());
        assert!(service.run_all(&settings("catalog", "", "products")).await.is_err());
    }
}
