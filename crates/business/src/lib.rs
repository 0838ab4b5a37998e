//! # Creditline Business
//!
//! Business logic layer - limit lifecycle, admission engine, permission cache.
//!
//! ```rust,ignore
//! use creditline_business::{AdmissionEngine, EngineConfig, LimitLifecycle, ServiceContext};
//!
//! let ctx = ServiceContext::connect(&EngineConfig::default()).await?;
//! let limit = LimitLifecycle::new(&ctx).grant(customer_id, 1, dec!(100000)).await?;
//! let txn = AdmissionEngine::new(&ctx).admit(customer_id, &request).await?;
//! ```

pub mod admission;
pub mod config;
pub mod customer;
pub mod error;
pub mod lifecycle;
pub mod permission;
pub mod role;
pub mod services;

pub use admission::{AdmissionEngine, TenorUsage, TransactionPage};
pub use config::EngineConfig;
pub use customer::{CustomerService, DEFAULT_ROLE};
pub use error::{BusinessError, BusinessResult};
pub use lifecycle::LimitLifecycle;
pub use permission::{
    CacheError, CacheLookup, CapabilitySet, MemoryPermissionCache, PermissionCache,
    PermissionService, PermissionSource, SqlitePermissionSource,
};
pub use role::RoleService;
pub use services::ServiceContext;
