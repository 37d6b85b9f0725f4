//! Repository implementations for the service's own tables.

pub mod settings;
pub mod test_log;

pub use settings::{SettingsRepository, SqlxSettingsRepository, SETTINGS_TABLE};
pub use test_log::{SqlxTestLogRepository, TestLogRepository, TEST_LOG_TABLE};

#[cfg(test)]
pub use settings::MockSettingsRepository;
#[cfg(test)]
pub use test_log::MockTestLogRepository;
