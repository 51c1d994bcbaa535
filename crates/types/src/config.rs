//! Engine configuration.

use std::time::Duration;

use serde::Deserialize;

/// Store configuration options.
///
/// Deserializable from a config file and buildable in code; every field
/// has a default so `StoreConfig::default()` is a working production
/// configuration.
#[derive(Debug, Clone, Deserialize, bon::Builder)]
pub struct StoreConfig {
    /// Upper bound on table-lock acquisition, in milliseconds.
    ///
    /// Exceeding it is treated as a detected deadlock and surfaces as a
    /// loud error, never a silent hang.
    #[serde(default = "default_lock_timeout_ms")]
    #[builder(default = default_lock_timeout_ms())]
    pub lock_timeout_ms: u64,

    /// Whether to fsync a table file before it replaces the live copy
    /// (default true for durability).
    #[serde(default = "default_sync_on_write")]
    #[builder(default = true)]
    pub sync_on_write: bool,

    /// Extension of table backing files.
    #[serde(default = "default_file_extension")]
    #[builder(default = default_file_extension())]
    pub file_extension: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
            sync_on_write: default_sync_on_write(),
            file_extension: default_file_extension(),
        }
    }
}

impl StoreConfig {
    /// The lock-acquisition timeout as a [`Duration`].
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

fn default_lock_timeout_ms() -> u64 {
    5_000
}

fn default_sync_on_write() -> bool {
    true
}

fn default_file_extension() -> String {
    "tbl".to_string()
}
