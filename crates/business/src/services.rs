//! Service context
//!
//! Gom các resource dùng chung (pool, audit journal, permission cache) cho
//! các business service.

use crate::config::EngineConfig;
use crate::error::BusinessResult;
use crate::permission::{MemoryPermissionCache, PermissionCache};
use creditline_persistence::{AuditReader, AuditRecord, Database};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Context for business operations - contains database access
#[derive(Clone)]
pub struct ServiceContext {
    db: Arc<Database>,
    cache: Arc<dyn PermissionCache>,
}

impl ServiceContext {
    /// Mở database theo config và tạo in-memory permission cache
    pub async fn connect(config: &EngineConfig) -> BusinessResult<Self> {
        let db = Database::connect(
            &config.database_url,
            config.max_connections,
            config.lock_wait_timeout,
            &config.journal_dir,
        )
        .await?;
        Ok(Self::new(db, config.permission_cache_ttl))
    }

    /// Create new service context from database
    pub fn new(db: Database, permission_ttl: Duration) -> Self {
        Self {
            db: Arc::new(db),
            cache: Arc::new(MemoryPermissionCache::new(permission_ttl)),
        }
    }

    /// Dùng cache backend khác (ví dụ cache dùng chung giữa nhiều process)
    pub fn with_cache(mut self, cache: Arc<dyn PermissionCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Get database pool
    pub fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }

    /// Get permission cache
    pub fn cache(&self) -> &Arc<dyn PermissionCache> {
        &self.cache
    }

    /// Reader cho audit journal
    pub fn audit_reader(&self) -> AuditReader {
        self.db.audit_reader()
    }

    /// Ghi audit record sau khi commit.
    ///
    /// Ledger trong database là nguồn chính; lỗi ghi journal chỉ được log.
    /// Ghi file đồng bộ (blocking) dưới mutex của journal, ngay trên task
    /// đang chạy operation.
    pub fn record_audit(&self, record: &AuditRecord) {
        if let Err(e) = self.db.journal().append(record) {
            warn!(
                mutation_id = record.mutation_id,
                error = %e,
                "failed to append audit journal record"
            );
        }
    }
}
