//! # Storage and Persistence
//!
//! MySQL-backed persistence for the admin settings and the check history.
//! Both tables live in the same database and are created on first use.

pub mod pool;
pub mod repositories;

#[cfg(all(test, feature = "mysql_tests"))]
pub mod test_helpers;

pub use pool::{cluster_connect_options, create_pool, DbPool};
pub use repositories::{
    SettingsRepository, SqlxSettingsRepository, SqlxTestLogRepository, TestLogRepository,
};
