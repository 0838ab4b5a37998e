//! Permission cache + permission service
//!
//! Read-through cache: customer id → tập capability, có TTL.
//!
//! Cache không phải nguồn authoritative. Nếu role đổi mà không gọi
//! `invalidate`, check quyền có thể thấy tập capability cũ tối đa một TTL;
//! `RoleService` luôn invalidate đồng bộ sau khi đổi role.

use crate::error::{BusinessError, BusinessResult};
use crate::services::ServiceContext;
use async_trait::async_trait;
use creditline_core::Capability;
use creditline_persistence::PermissionRepo;
use dashmap::DashMap;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Tập capability của một customer
pub type CapabilitySet = BTreeSet<Capability>;

/// Kết quả tra cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(CapabilitySet),
    Miss,
}

/// Lỗi của cache backend; caller fall through về nguồn authoritative
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("permission cache unavailable: {0}")]
    Unavailable(String),
}

/// Cache backend cho permission snapshots.
///
/// `set` là last-writer-wins; `invalidate` phải idempotent.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    async fn get(&self, customer_id: i64) -> Result<CacheLookup, CacheError>;

    async fn set(&self, customer_id: i64, capabilities: CapabilitySet) -> Result<(), CacheError>;

    async fn invalidate(&self, customer_id: i64) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    capabilities: CapabilitySet,
    expires_at: Instant,
}

/// In-process cache trên DashMap (sharded, không có global lock)
#[derive(Debug)]
pub struct MemoryPermissionCache {
    entries: DashMap<i64, CacheEntry>,
    ttl: Duration,
}

impl MemoryPermissionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Số entry đang giữ (kể cả entry đã hết hạn nhưng chưa bị dọn)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dọn các entry hết hạn
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }
}

#[async_trait]
impl PermissionCache for MemoryPermissionCache {
    async fn get(&self, customer_id: i64) -> Result<CacheLookup, CacheError> {
        let now = Instant::now();
        // Ref phải được drop trước khi remove, nếu không shard sẽ deadlock
        let found = self
            .entries
            .get(&customer_id)
            .map(|entry| (entry.expires_at > now, entry.capabilities.clone()));

        match found {
            Some((true, capabilities)) => Ok(CacheLookup::Hit(capabilities)),
            Some((false, _)) => {
                self.entries
                    .remove_if(&customer_id, |_, entry| entry.expires_at <= now);
                Ok(CacheLookup::Miss)
            }
            None => Ok(CacheLookup::Miss),
        }
    }

    async fn set(&self, customer_id: i64, capabilities: CapabilitySet) -> Result<(), CacheError> {
        self.entries.insert(
            customer_id,
            CacheEntry {
                capabilities,
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, customer_id: i64) -> Result<(), CacheError> {
        self.entries.remove(&customer_id);
        Ok(())
    }
}

/// Nguồn authoritative cho capability của customer
#[async_trait]
pub trait PermissionSource: Send + Sync {
    async fn load(&self, customer_id: i64) -> BusinessResult<CapabilitySet>;
}

/// Đọc capability từ role của customer trong SQLite
pub struct SqlitePermissionSource {
    pool: SqlitePool,
}

impl SqlitePermissionSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionSource for SqlitePermissionSource {
    async fn load(&self, customer_id: i64) -> BusinessResult<CapabilitySet> {
        let names = PermissionRepo::names_for_customer(&self.pool, customer_id)
            .await
            .map_err(|e| {
                BusinessError::map_not_found(e, "Customer", || {
                    BusinessError::CustomerNotFound(customer_id)
                })
            })?;
        Ok(names.into_iter().map(Capability::from).collect())
    }
}

/// Permission Service - cache-backed capability lookup
pub struct PermissionService {
    cache: Arc<dyn PermissionCache>,
    source: Arc<dyn PermissionSource>,
}

impl PermissionService {
    /// Dùng cache của context và SQLite làm nguồn
    pub fn new(ctx: &ServiceContext) -> Self {
        Self {
            cache: Arc::clone(ctx.cache()),
            source: Arc::new(SqlitePermissionSource::new(ctx.pool().clone())),
        }
    }

    pub fn from_parts(cache: Arc<dyn PermissionCache>, source: Arc<dyn PermissionSource>) -> Self {
        Self { cache, source }
    }

    /// Lấy capability của customer.
    ///
    /// Hit → trả về ngay. Miss → load từ source rồi `set`. Lỗi cache chỉ
    /// được log, sau đó đọc thẳng từ source.
    pub async fn get_permissions(&self, customer_id: i64) -> BusinessResult<CapabilitySet> {
        match self.cache.get(customer_id).await {
            Ok(CacheLookup::Hit(capabilities)) => {
                debug!(customer_id, "permission cache hit");
                return Ok(capabilities);
            }
            Ok(CacheLookup::Miss) => debug!(customer_id, "permission cache miss"),
            Err(e) => warn!(customer_id, error = %e, "permission cache get failed"),
        }

        let capabilities = self.source.load(customer_id).await?;

        if let Err(e) = self.cache.set(customer_id, capabilities.clone()).await {
            warn!(customer_id, error = %e, "permission cache set failed");
        }
        Ok(capabilities)
    }

    /// Customer có capability `name` không
    pub async fn has_permission(&self, customer_id: i64, name: &str) -> BusinessResult<bool> {
        let capabilities = self.get_permissions(customer_id).await?;
        Ok(capabilities.iter().any(|c| c.as_str() == name))
    }
}
