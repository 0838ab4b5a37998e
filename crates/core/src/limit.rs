//! # Limit Module
//!
//! TenorLimit: trần tín dụng của một customer cho một kỳ hạn.

use crate::error::{CoreError, CoreResult};
use crate::tenor::Tenor;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trần tín dụng (ceiling) cho một cặp (customer, tenor).
///
/// Limit không bao giờ bị thay đổi ngầm bởi usage; chỉ grant/update/revoke
/// tường minh mới thay đổi nó.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenorLimit {
    pub id: i64,
    pub tenor: Tenor,
    pub limit_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenorLimit {
    /// Số tiền còn lại sau khi trừ `used`; có thể âm nếu ceiling bị hạ
    /// xuống dưới mức đã dùng.
    pub fn remaining(&self, used: Decimal) -> Decimal {
        self.limit_amount - used
    }

    /// Kiểm tra `used + requested` có vượt ceiling không.
    ///
    /// Bằng đúng ceiling vẫn được chấp nhận.
    pub fn admits(&self, used: Decimal, requested: Decimal) -> bool {
        used + requested <= self.limit_amount
    }
}

/// Validate limit amount: phải >= 0
pub fn validate_limit_amount(amount: Decimal) -> CoreResult<()> {
    if amount < Decimal::ZERO {
        return Err(CoreError::InvalidAmount(format!(
            "limit amount must not be negative: {}",
            amount
        )));
    }
    Ok(())
}
