//! # Creditline Persistence
//!
//! Persistence layer cho Creditline - SQLite stores + JSONL audit journal.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Database                              │
//! │  ┌──────────────┐   ┌──────────────────┐   ┌──────────────┐  │
//! │  │    SQLite    │   │ limit_mutations  │   │    JSONL     │  │
//! │  │ (limits, tx) │   │ (ledger, append) │   │  (journal)   │  │
//! │  └──────────────┘   └──────────────────┘   └──────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use creditline_persistence::{Database, LimitRepo};
//!
//! let db = Database::connect("sqlite:creditline.db?mode=rwc", 5, timeout, "data/audit").await?;
//!
//! // Ambient connection
//! let limits = LimitRepo::find_by_customer(db.pool(), 1).await?;
//!
//! // Same repo, inside a unit of work
//! let mut tx = db.pool().begin().await?;
//! let limits = LimitRepo::find_by_customer(&mut *tx, 1).await?;
//! tx.commit().await?;
//! ```

pub mod error;
pub mod journal;
pub mod sqlite;

pub use error::{PersistenceError, PersistenceResult};
pub use journal::{AuditJournal, AuditReader, AuditRecord};
pub use sqlite::schema::{
    CustomerRow, LimitMutationRow, NewCustomer, TenorLimitRow, TransactionRow,
};
pub use sqlite::{
    create_pool, init_database, run_migrations, CustomerRepo, LimitRepo, MutationRepo,
    PermissionRepo, TransactionRepo,
};

use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

/// Database facade - pool + audit journal
pub struct Database {
    pool: SqlitePool,
    journal: AuditJournal,
}

impl Database {
    /// Mở pool, chạy migrations và mở audit journal
    ///
    /// # Arguments
    /// * `database_url` - SQLite URL (e.g., "sqlite:creditline.db?mode=rwc")
    /// * `max_connections` - kích thước pool
    /// * `lock_wait` - thời gian chờ tối đa cho per-customer lock
    /// * `journal_dir` - thư mục chứa audit JSONL files
    pub async fn connect<P: AsRef<Path>>(
        database_url: &str,
        max_connections: u32,
        lock_wait: Duration,
        journal_dir: P,
    ) -> PersistenceResult<Self> {
        let pool = init_database(database_url, max_connections, lock_wait).await?;
        let journal = AuditJournal::new(journal_dir)?;
        Ok(Self { pool, journal })
    }

    /// Tạo từ pool và journal có sẵn
    pub fn from_parts(pool: SqlitePool, journal: AuditJournal) -> Self {
        Self { pool, journal }
    }

    /// Get SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get audit journal
    pub fn journal(&self) -> &AuditJournal {
        &self.journal
    }

    /// Reader cho audit journal
    pub fn audit_reader(&self) -> AuditReader {
        AuditReader::new(self.journal.base_path())
    }

    /// Đóng pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
