//! Business layer errors
//!
//! Một enum duy nhất cho mọi outcome của lifecycle/admission:
//! validation, domain rejection, và infrastructure failure.

use creditline_core::{CoreError, Tenor};
use creditline_persistence::PersistenceError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Business operation errors
#[derive(Debug, Error)]
pub enum BusinessError {
    // === Validation errors ===
    #[error("validation failed: {0}")]
    Validation(#[from] CoreError),

    // === Domain rejections ===
    #[error("customer not found: {0}")]
    CustomerNotFound(i64),

    #[error("limit for this tenor already exists (customer {customer_id}, tenor {tenor})")]
    DuplicateTenor { customer_id: i64, tenor: Tenor },

    #[error("limit not found: {0}")]
    LimitNotFound(i64),

    #[error("limit owner not found for limit {0}")]
    OwnerNotFound(i64),

    #[error("limit not found for the requested tenor (customer {customer_id}, tenor {tenor})")]
    TenorLimitNotFound { customer_id: i64, tenor: Tenor },

    #[error("insufficient limit for tenor {tenor}: limit {limit}, used {used}, requested {requested}")]
    InsufficientLimit {
        tenor: Tenor,
        limit: Decimal,
        used: Decimal,
        requested: Decimal,
    },

    #[error("contract number already exists: {0}")]
    DuplicateContract(String),

    #[error("role not found: {0}")]
    RoleNotFound(String),

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    // === Infrastructure ===
    #[error("storage error: {0}")]
    Storage(#[from] PersistenceError),
}

impl From<sqlx::Error> for BusinessError {
    fn from(err: sqlx::Error) -> Self {
        BusinessError::Storage(PersistenceError::from(err))
    }
}

/// Result type alias for business operations
pub type BusinessResult<T> = Result<T, BusinessError>;

impl BusinessError {
    /// Lỗi validation, xảy ra trước khi mở unit of work
    pub fn is_validation(&self) -> bool {
        matches!(self, BusinessError::Validation(_))
    }

    /// Domain rejection: client có thể sửa request rồi gửi lại
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            BusinessError::CustomerNotFound(_)
                | BusinessError::DuplicateTenor { .. }
                | BusinessError::LimitNotFound(_)
                | BusinessError::OwnerNotFound(_)
                | BusinessError::TenorLimitNotFound { .. }
                | BusinessError::InsufficientLimit { .. }
                | BusinessError::DuplicateContract(_)
                | BusinessError::RoleNotFound(_)
                | BusinessError::DuplicateEmail(_)
        )
    }

    /// Infra error có thể retry (lock timeout, pool cạn)
    pub fn is_retryable(&self) -> bool {
        match self {
            BusinessError::Storage(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Map `NotFound` của entity `entity` sang domain error, giữ nguyên lỗi khác
    pub(crate) fn map_not_found(
        err: PersistenceError,
        entity: &str,
        to: impl FnOnce() -> BusinessError,
    ) -> BusinessError {
        if err.is_not_found_for(entity) {
            to()
        } else {
            BusinessError::Storage(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_user_facing_messages() {
        let err = BusinessError::DuplicateTenor {
            customer_id: 1,
            tenor: Tenor::OneMonth,
        };
        assert!(err.to_string().starts_with("limit for this tenor already exists"));

        let err = BusinessError::InsufficientLimit {
            tenor: Tenor::OneMonth,
            limit: dec!(100000),
            used: dec!(60000),
            requested: dec!(50000),
        };
        assert!(err.to_string().starts_with("insufficient limit"));
        assert!(err.to_string().contains("used 60000"));

        let err = BusinessError::TenorLimitNotFound {
            customer_id: 3,
            tenor: Tenor::SixMonths,
        };
        assert!(err.to_string().contains("limit not found for the requested tenor"));
        assert!(BusinessError::OwnerNotFound(9).to_string().contains("limit owner not found"));
    }

    #[test]
    fn test_classification() {
        let validation: BusinessError = CoreError::InvalidTenor(4).into();
        assert!(validation.is_validation());
        assert!(!validation.is_rejection());

        assert!(BusinessError::LimitNotFound(1).is_rejection());
        assert!(!BusinessError::LimitNotFound(1).is_retryable());

        let busy = BusinessError::Storage(PersistenceError::LockTimeout("database is locked".into()));
        assert!(busy.is_retryable());
        assert!(!busy.is_rejection());

        let missing = BusinessError::Storage(PersistenceError::not_found("Transaction", 1));
        assert!(!missing.is_retryable());
    }

    #[test]
    fn test_map_not_found() {
        let err = BusinessError::map_not_found(
            PersistenceError::not_found("Customer", 7),
            "Customer",
            || BusinessError::CustomerNotFound(7),
        );
        assert!(matches!(err, BusinessError::CustomerNotFound(7)));

        let err = BusinessError::map_not_found(
            PersistenceError::not_found("Role", "root"),
            "Customer",
            || BusinessError::CustomerNotFound(7),
        );
        assert!(matches!(err, BusinessError::Storage(_)));
    }
}
