//! # Error Module
//!
//! Validation errors của domain, trả về trước khi mở bất kỳ unit of work nào.

use thiserror::Error;

/// Core domain errors.
///
/// Chỉ chứa lỗi validation thuần, không liên quan đến storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid tenor month: {0} (must be 1, 2, 3, or 6)")]
    InvalidTenor(i64),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid mutation action: {0}")]
    InvalidAction(String),

    #[error("invalid transaction status: {0}")]
    InvalidStatus(String),
}

/// Result type alias với CoreError
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidTenor(4);
        assert_eq!(
            err.to_string(),
            "invalid tenor month: 4 (must be 1, 2, 3, or 6)"
        );

        let err = CoreError::MissingField("contract_number");
        assert_eq!(err.to_string(), "missing required field: contract_number");
    }
}
