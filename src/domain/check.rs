//! Connectivity check results and their rendered summaries.
//!
//! Results are transient: only the one-line summaries built here are
//! persisted to the check history.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::log_entry::LogLevel;

/// Summary used when a failed check carries no usable message.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Error reported by an external service or driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

impl CheckError {
    pub fn new<S: Into<String>>(code: Option<String>, message: S) -> Self {
        Self { code, message: message.into() }
    }

    pub fn message_only<S: Into<String>>(message: S) -> Self {
        Self { code: None, message: message.into() }
    }
}

/// Outcome of counting rows in one requested table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCheck {
    pub name: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TableCheck {
    pub fn present(name: &str, row_count: i64) -> Self {
        Self { name: name.to_string(), exists: true, row_count: Some(row_count), message: None }
    }

    pub fn missing(name: &str, message: String) -> Self {
        Self { name: name.to_string(), exists: false, row_count: None, message: Some(message) }
    }
}

/// Result of a database cluster check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseCheckResult {
    pub ok: bool,
    /// Database the check targeted, as resolved from settings
    pub db: String,
    pub tables: Vec<TableCheck>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CheckError>,
}

impl DatabaseCheckResult {
    /// The connection was usable; `ok` follows from the table outcomes.
    pub fn completed(db: &str, tables: Vec<TableCheck>, elapsed: Duration) -> Self {
        let ok = tables.iter().all(|table| table.exists);
        Self { ok, db: db.to_string(), tables, duration_ms: round_millis(elapsed), error: None }
    }

    /// The connection could not be opened or was unusable.
    pub fn failed(db: &str, error: CheckError, elapsed: Duration) -> Self {
        Self {
            ok: false,
            db: db.to_string(),
            tables: Vec::new(),
            duration_ms: round_millis(elapsed),
            error: Some(error),
        }
    }

    /// One-line summary recorded in the check history.
    pub fn summary(&self) -> String {
        if let Some(error) = &self.error {
            return format!("Database error: {}", non_empty_message(&error.message));
        }

        let tables = if self.tables.is_empty() {
            "no tables provided".to_string()
        } else {
            self.tables
                .iter()
                .map(|table| {
                    format!("{}:{}", table.name, if table.exists { "ok" } else { "missing" })
                })
                .collect::<Vec<_>>()
                .join(", ")
        };
        let status = if self.ok { "Database OK" } else { "Database issues" };

        format!("{status} in {}ms ({tables})", self.duration_ms)
    }

    /// Short status used inside the combined summary.
    pub fn status_label(&self) -> &str {
        status_label(self.ok, self.error.as_ref())
    }
}

/// Result of a search index check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCheckResult {
    pub ok: bool,
    pub index_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_settings: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CheckError>,
}

impl SearchCheckResult {
    pub fn reachable(index_name: &str) -> Self {
        Self { ok: true, index_name: index_name.to_string(), has_settings: Some(true), error: None }
    }

    pub fn failed(index_name: &str, error: CheckError) -> Self {
        Self { ok: false, index_name: index_name.to_string(), has_settings: None, error: Some(error) }
    }

    /// One-line summary recorded in the check history.
    pub fn summary(&self) -> String {
        match &self.error {
            None => format!("Search index `{}` reachable.", self.index_name),
            Some(error) => format!(
                "Search error for `{}`: {}",
                self.index_name,
                non_empty_message(&error.message)
            ),
        }
    }

    /// Short status used inside the combined summary.
    pub fn status_label(&self) -> &str {
        status_label(self.ok, self.error.as_ref())
    }
}

/// Both check results from a combined run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedCheckResult {
    pub database: DatabaseCheckResult,
    pub search: SearchCheckResult,
}

impl CombinedCheckResult {
    /// `info` when both passed, `warn` when exactly one did, `error` otherwise.
    pub fn level(&self) -> LogLevel {
        match (self.database.ok, self.search.ok) {
            (true, true) => LogLevel::Info,
            (true, false) | (false, true) => LogLevel::Warn,
            (false, false) => LogLevel::Error,
        }
    }

    pub fn ok(&self) -> bool {
        self.database.ok && self.search.ok
    }

    pub fn summary(&self) -> String {
        format!(
            "All checks → Database: {} | Search: {}",
            self.database.status_label(),
            self.search.status_label()
        )
    }
}

/// Split a comma-separated table list, trimming whitespace and dropping empty
/// segments. Order and duplicates are preserved.
pub fn parse_table_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|name| !name.is_empty()).map(str::to_string).collect()
}

/// Elapsed time rounded to the nearest whole millisecond.
pub fn round_millis(elapsed: Duration) -> u64 {
    ((elapsed.as_micros() + 500) / 1000) as u64
}

fn status_label(ok: bool, error: Option<&CheckError>) -> &str {
    if ok {
        "ok"
    } else {
        error.map(|e| e.message.as_str()).filter(|m| !m.is_empty()).unwrap_or("error")
    }
}

fn non_empty_message(message: &str) -> &str {
    if message.is_empty() {
        UNKNOWN_ERROR
    } else {
        message
    }
}
