//! HTTP handlers for the admin API

pub mod checks;
pub mod config;
pub mod health;
pub mod logs;

pub use checks::{test_all_handler, test_database_handler, test_search_handler};
pub use config::{get_config_handler, update_config_handler};
pub use health::health_handler;
pub use logs::{list_logs_handler, RECENT_LOG_LIMIT};
