//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default SQLite URL
pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/creditline.db?mode=rwc";
/// Default audit journal directory
pub const DEFAULT_JOURNAL_DIR: &str = "data/audit";

/// Cấu hình cho ServiceContext.
///
/// `lock_wait_timeout` là thời gian chờ tối đa cho per-customer lock;
/// hết thời gian thì trả về lỗi retryable, không phải domain rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub lock_wait_timeout: Duration,
    pub permission_cache_ttl: Duration,
    pub journal_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            lock_wait_timeout: Duration::from_secs(5),
            permission_cache_ttl: Duration::from_secs(5 * 60),
            journal_dir: PathBuf::from(DEFAULT_JOURNAL_DIR),
        }
    }
}

impl EngineConfig {
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    pub fn with_journal_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.journal_dir = dir.into();
        self
    }

    pub fn with_lock_wait_timeout(mut self, timeout: Duration) -> Self {
        self.lock_wait_timeout = timeout;
        self
    }

    pub fn with_permission_cache_ttl(mut self, ttl: Duration) -> Self {
        self.permission_cache_ttl = ttl;
        self
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}
