//! Database schema definitions
//!
//! Row types cho sqlx mapping từ SQLite tables.
//! Schema được định nghĩa trong migrations/20260301000000_init.sql

use crate::error::{PersistenceError, PersistenceResult};
use chrono::{DateTime, Utc};
use creditline_core::{
    LimitMutation, LoanTransaction, MutationAction, Tenor, TenorLimit, TransactionStatus,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Row type cho bảng `customers` (join với `roles`)
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CustomerRow {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input cho việc tạo customer mới
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub full_name: String,
    pub role: String,
}

/// Row type cho bảng `tenor_limits`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TenorLimitRow {
    pub id: i64,
    pub tenor_month: i64,
    pub limit_amount: String, // Decimal stored as TEXT
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row type cho bảng `transactions`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: i64,
    pub customer_id: i64,
    pub contract_number: String,
    pub otr: String,
    pub admin_fee: String,
    pub installment_amount: String,
    pub interest_amount: String,
    pub asset_name: String,
    pub status: String,
    pub tenor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row type cho bảng `limit_mutations`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LimitMutationRow {
    pub id: i64,
    pub customer_id: i64,
    pub tenor_limit_id: i64,
    pub old_amount: String,
    pub new_amount: String,
    pub reason: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

// === Conversion helpers ===

pub(crate) fn parse_decimal(field: &str, value: &str) -> PersistenceResult<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| PersistenceError::InvalidDecimal(format!("{} = {:?}: {}", field, value, e)))
}

fn parse_tenor(field: &str, months: i64) -> PersistenceResult<Tenor> {
    Tenor::from_months(months).map_err(|_| PersistenceError::InvalidEnumValue {
        field: field.to_string(),
        value: months.to_string(),
    })
}

// === Conversion implementations ===

impl TryFrom<TenorLimitRow> for TenorLimit {
    type Error = PersistenceError;

    fn try_from(row: TenorLimitRow) -> Result<Self, Self::Error> {
        Ok(TenorLimit {
            id: row.id,
            tenor: parse_tenor("tenor_month", row.tenor_month)?,
            limit_amount: parse_decimal("limit_amount", &row.limit_amount)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<TransactionRow> for LoanTransaction {
    type Error = PersistenceError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let status =
            TransactionStatus::parse(&row.status).map_err(|_| PersistenceError::InvalidEnumValue {
                field: "status".to_string(),
                value: row.status.clone(),
            })?;

        Ok(LoanTransaction {
            id: row.id,
            customer_id: row.customer_id,
            otr: parse_decimal("otr", &row.otr)?,
            admin_fee: parse_decimal("admin_fee", &row.admin_fee)?,
            installment_amount: parse_decimal("installment_amount", &row.installment_amount)?,
            interest_amount: parse_decimal("interest_amount", &row.interest_amount)?,
            tenor: parse_tenor("tenor", row.tenor)?,
            contract_number: row.contract_number,
            asset_name: row.asset_name,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<LimitMutationRow> for LimitMutation {
    type Error = PersistenceError;

    fn try_from(row: LimitMutationRow) -> Result<Self, Self::Error> {
        let action =
            MutationAction::parse(&row.action).map_err(|_| PersistenceError::InvalidEnumValue {
                field: "action".to_string(),
                value: row.action.clone(),
            })?;

        Ok(LimitMutation {
            id: row.id,
            customer_id: row.customer_id,
            tenor_limit_id: row.tenor_limit_id,
            old_amount: parse_decimal("old_amount", &row.old_amount)?,
            new_amount: parse_decimal("new_amount", &row.new_amount)?,
            reason: row.reason,
            action,
            created_at: row.created_at,
        })
    }
}

/// Convert một batch rows, dừng ở row lỗi đầu tiên
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> PersistenceResult<Vec<T>>
where
    T: TryFrom<R, Error = PersistenceError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit_row(tenor_month: i64, amount: &str) -> TenorLimitRow {
        TenorLimitRow {
            id: 1,
            tenor_month,
            limit_amount: amount.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_limit_row_conversion() {
        let limit = TenorLimit::try_from(limit_row(3, "1500.25")).unwrap();
        assert_eq!(limit.tenor, Tenor::ThreeMonths);
        assert_eq!(limit.limit_amount.to_string(), "1500.25");
    }

    #[test]
    fn test_limit_row_bad_values() {
        assert!(matches!(
            TenorLimit::try_from(limit_row(4, "10")),
            Err(PersistenceError::InvalidEnumValue { .. })
        ));
        assert!(matches!(
            TenorLimit::try_from(limit_row(1, "ten")),
            Err(PersistenceError::InvalidDecimal(_))
        ));
    }
}
