//! Admin settings: the three operator-editable values that drive the checks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage key of a single setting row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    DatabaseName,
    DatabaseTables,
    SearchIndexName,
}

impl SettingKey {
    pub const ALL: [SettingKey; 3] =
        [SettingKey::DatabaseName, SettingKey::DatabaseTables, SettingKey::SearchIndexName];

    /// Key as stored in the settings table.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::DatabaseName => "database.name",
            SettingKey::DatabaseTables => "database.tables",
            SettingKey::SearchIndexName => "search.indexName",
        }
    }

    /// Key written by older deployments sharing the same table.
    pub fn legacy_str(&self) -> &'static str {
        match self {
            SettingKey::DatabaseName => "tidb.database",
            SettingKey::DatabaseTables => "tidb.tables",
            SettingKey::SearchIndexName => "algolia.indexName",
        }
    }

    /// Parse a stored key. Unknown keys yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == raw)
    }

    /// Parse a legacy stored key.
    pub fn parse_legacy(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.legacy_str() == raw)
    }
}

/// Current admin settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSettings {
    /// Target database name; empty means the cluster default
    pub database_name: String,
    /// Raw comma-separated list of tables to verify
    pub database_tables: String,
    /// Search index to probe
    pub search_index_name: String,
}

impl AdminSettings {
    /// Settings with nothing stored yet.
    pub fn with_default_database(default_database: &str) -> Self {
        Self { database_name: default_database.to_string(), ..Default::default() }
    }

    /// Settings from stored `(key, value)` rows.
    ///
    /// Legacy keys are read as aliases; a current key always wins over its
    /// legacy alias. Unknown keys are ignored.
    pub fn from_stored<I>(default_database: &str, rows: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut settings = Self::with_default_database(default_database);
        let mut seen = Vec::new();
        let mut legacy = Vec::new();

        for (raw_key, value) in rows {
            if let Some(key) = SettingKey::parse(&raw_key) {
                settings.set(key, value);
                seen.push(key);
            } else if let Some(key) = SettingKey::parse_legacy(&raw_key) {
                legacy.push((key, value));
            } else {
                tracing::debug!(key = %raw_key, "Ignoring unrecognized settings key");
            }
        }

        for (key, value) in legacy {
            if !seen.contains(&key) {
                tracing::debug!(key = key.legacy_str(), "Reading legacy settings key");
                settings.set(key, value);
            }
        }

        settings
    }

    /// Overwrite the field addressed by `key`.
    pub fn set(&mut self, key: SettingKey, value: String) {
        match key {
            SettingKey::DatabaseName => self.database_name = value,
            SettingKey::DatabaseTables => self.database_tables = value,
            SettingKey::SearchIndexName => self.search_index_name = value,
        }
    }

    /// Apply a patch in memory, leaving absent fields untouched.
    pub fn merged(mut self, patch: &SettingsPatch) -> Self {
        for (key, value) in patch.entries() {
            self.set(key, value.to_string());
        }
        self
    }

    /// Apply request-scoped check overrides. Name overrides only count when
    /// they are non-blank; a table list override counts even when empty.
    pub fn with_overrides(mut self, overrides: &SettingsPatch) -> Self {
        if let Some(name) = non_blank(&overrides.database_name) {
            self.database_name = name.to_string();
        }
        if let Some(tables) = &overrides.database_tables {
            self.database_tables = tables.clone();
        }
        if let Some(index) = non_blank(&overrides.search_index_name) {
            self.search_index_name = index.to_string();
        }
        self
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Partial settings update. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub database_name: Option<String>,
    pub database_tables: Option<String>,
    pub search_index_name: Option<String>,
}

impl SettingsPatch {
    /// Build a patch from an arbitrary JSON payload.
    ///
    /// Only recognized string fields are taken; anything else (unknown keys,
    /// wrong types, a non-object body) is silently ignored.
    pub fn from_json(payload: &Value) -> Self {
        let field = |name: &str| payload.get(name).and_then(Value::as_str).map(str::to_string);

        Self {
            database_name: field("databaseName"),
            database_tables: field("databaseTables"),
            search_index_name: field("searchIndexName"),
        }
    }

    /// Parse raw request bytes. Invalid JSON is treated as an empty object.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(payload) => Self::from_json(&payload),
            Err(e) => {
                if !body.is_empty() {
                    tracing::debug!(error = %e, "Ignoring unparseable request body");
                }
                Self::default()
            }
        }
    }

    /// Present fields paired with their storage keys.
    pub fn entries(&self) -> Vec<(SettingKey, &str)> {
        [
            (SettingKey::DatabaseName, &self.database_name),
            (SettingKey::DatabaseTables, &self.database_tables),
            (SettingKey::SearchIndexName, &self.search_index_name),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
