//! # Transaction Module
//!
//! Loan disbursement records và request để admission engine xử lý.

use crate::error::{CoreError, CoreResult};
use crate::tenor::Tenor;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trạng thái của một disbursement.
///
/// Admission luôn tạo ở trạng thái `Pending`; các chuyển trạng thái khác
/// nằm ngoài engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
}

impl TransactionStatus {
    /// Trả về code string cho DB
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Approved => "approved",
            TransactionStatus::Rejected => "rejected",
        }
    }

    /// Parse từ string
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "approved" => Ok(TransactionStatus::Approved),
            "rejected" => Ok(TransactionStatus::Rejected),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Một khoản giải ngân đã được admit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTransaction {
    pub id: i64,
    pub customer_id: i64,
    /// Unique trên toàn hệ thống
    pub contract_number: String,
    /// On-the-road price (principal)
    pub otr: Decimal,
    pub admin_fee: Decimal,
    pub installment_amount: Decimal,
    pub interest_amount: Decimal,
    pub asset_name: String,
    pub tenor: Tenor,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request giải ngân gửi vào admission engine.
///
/// `tenor` giữ dạng số tháng thô; `validate` chuyển thành [`Tenor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub contract_number: String,
    pub otr: Decimal,
    pub admin_fee: Decimal,
    pub installment_amount: Decimal,
    pub interest_amount: Decimal,
    pub asset_name: String,
    pub tenor: i64,
}

impl TransactionRequest {
    /// Validate payload, trả về tenor đã parse.
    pub fn validate(&self) -> CoreResult<Tenor> {
        let tenor = Tenor::from_months(self.tenor)?;

        if self.contract_number.trim().is_empty() {
            return Err(CoreError::MissingField("contract_number"));
        }
        if self.asset_name.trim().is_empty() {
            return Err(CoreError::MissingField("asset_name"));
        }
        if self.otr <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount(format!(
                "otr must be positive: {}",
                self.otr
            )));
        }

        let fees = [
            ("admin_fee", self.admin_fee),
            ("installment_amount", self.installment_amount),
            ("interest_amount", self.interest_amount),
        ];
        for (field, value) in fees {
            if value < Decimal::ZERO {
                return Err(CoreError::InvalidAmount(format!(
                    "{} must not be negative: {}",
                    field, value
                )));
            }
        }

        Ok(tenor)
    }
}
