//! # Catalog Admin
//!
//! Admin service for verifying connectivity to a MySQL-protocol database
//! cluster and a hosted search index, with a rolling history of check outcomes.
//!
//! ## Architecture
//!
//! ```text
//! REST API / CLI → Connectivity Service → Database & Search Probes
//!       ↓                  ↓
//! Settings Store     Check History Store   (MySQL, via sqlx)
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use catalog_admin::{
//!     api::{start_api_server, ApiState},
//!     config::AppConfig,
//!     services::{ConnectivityService, MySqlProbe},
//!     storage::{create_pool, SqlxSettingsRepository, SqlxTestLogRepository},
//!     Result,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let pool = create_pool(&config.database, &config.cluster)?;
//!     let logs = Arc::new(SqlxTestLogRepository::new(pool.clone()));
//!     let probe = MySqlProbe::new(config.cluster.clone(), config.database.connect_timeout());
//!     let connectivity = ConnectivityService::new(logs.clone(), Arc::new(probe), None);
//!     let settings = SqlxSettingsRepository::new(pool, config.cluster.default_database_name());
//!     let state = ApiState::new(Arc::new(settings), logs, connectivity);
//!     start_api_server(&config.api, state).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod services;
pub mod storage;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{AdminError, Result};
pub use observability::init_logging;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
