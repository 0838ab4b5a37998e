//! # Persistence Errors
//!
//! Error types cho persistence layer, wrapping sqlx và IO errors.
//! `NotFound` tách biệt khỏi các lỗi storage khác để business layer map
//! thành domain message.

use thiserror::Error;

/// SQLite primary result codes dùng để phân loại lỗi lock.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    // === Database errors ===
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Lock wait timed out: {0}")]
    LockTimeout(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    // === Journal errors ===
    #[error("Journal IO error: {0}")]
    JournalIo(#[from] std::io::Error),

    #[error("Journal serialization error: {0}")]
    JournalSerialization(#[from] serde_json::Error),

    // === Conversion errors ===
    #[error("Invalid decimal value: {0}")]
    InvalidDecimal(String),

    #[error("Invalid enum value: {field} = {value}")]
    InvalidEnumValue { field: String, value: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias cho PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return Self::UniqueViolation(db_err.message().to_string());
                }
                if db_err.is_foreign_key_violation() {
                    return Self::ForeignKeyViolation(db_err.message().to_string());
                }
                let primary = db_err
                    .code()
                    .and_then(|code| code.parse::<i32>().ok())
                    .map(|code| code & 0xff);
                if matches!(primary, Some(SQLITE_BUSY) | Some(SQLITE_LOCKED)) {
                    return Self::LockTimeout(db_err.message().to_string());
                }
                Self::Database(err)
            }
            sqlx::Error::PoolTimedOut => Self::Unavailable("connection pool timed out".to_string()),
            sqlx::Error::PoolClosed => Self::Unavailable("connection pool closed".to_string()),
            _ => Self::Database(err),
        }
    }
}

impl PersistenceError {
    /// Tạo NotFound error
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Kiểm tra có phải lỗi not found không
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Kiểm tra NotFound cho một entity cụ thể
    pub fn is_not_found_for(&self, name: &str) -> bool {
        matches!(self, Self::NotFound { entity, .. } if entity == name)
    }

    /// Lỗi tạm thời, caller có thể retry toàn bộ unit of work
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout(_) | Self::Unavailable(_))
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }
}
