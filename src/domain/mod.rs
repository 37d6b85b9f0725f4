//! # Domain Types
//!
//! Settings, check results and check-history entries shared by the storage,
//! service and API layers.

pub mod check;
pub mod log_entry;
pub mod settings;

pub use check::{
    parse_table_list, CheckError, CombinedCheckResult, DatabaseCheckResult, SearchCheckResult,
    TableCheck,
};
pub use log_entry::{LogEntry, LogLevel, LogScope};
pub use settings::{AdminSettings, SettingKey, SettingsPatch};
