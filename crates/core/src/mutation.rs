//! # Mutation Module
//!
//! LimitMutation: bản ghi audit bất biến cho mọi thay đổi limit và mọi
//! lần sử dụng limit.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Loại hành động được ghi vào ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MutationAction {
    Create,
    Update,
    Delete,
    Usage,
}

impl MutationAction {
    /// Trả về code string cho DB
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationAction::Create => "CREATE",
            MutationAction::Update => "UPDATE",
            MutationAction::Delete => "DELETE",
            MutationAction::Usage => "USAGE",
        }
    }

    /// Parse từ string
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.to_uppercase().as_str() {
            "CREATE" => Ok(MutationAction::Create),
            "UPDATE" => Ok(MutationAction::Update),
            "DELETE" => Ok(MutationAction::Delete),
            "USAGE" => Ok(MutationAction::Usage),
            other => Err(CoreError::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Một dòng ledger đã được ghi. Không có update/delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitMutation {
    pub id: i64,
    pub customer_id: i64,
    pub tenor_limit_id: i64,
    pub old_amount: Decimal,
    pub new_amount: Decimal,
    pub reason: String,
    pub action: MutationAction,
    pub created_at: DateTime<Utc>,
}

/// Entry chuẩn bị append vào ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMutation {
    pub customer_id: i64,
    pub tenor_limit_id: i64,
    pub old_amount: Decimal,
    pub new_amount: Decimal,
    pub reason: String,
    pub action: MutationAction,
}

impl NewMutation {
    /// CREATE: before = 0, after = amount
    pub fn created(customer_id: i64, tenor_limit_id: i64, amount: Decimal) -> Self {
        Self {
            customer_id,
            tenor_limit_id,
            old_amount: Decimal::ZERO,
            new_amount: amount,
            reason: "Initial Limit".to_string(),
            action: MutationAction::Create,
        }
    }

    /// UPDATE: before = prior amount, after = new amount
    pub fn updated(customer_id: i64, tenor_limit_id: i64, old: Decimal, new: Decimal) -> Self {
        Self {
            customer_id,
            tenor_limit_id,
            old_amount: old,
            new_amount: new,
            reason: "Update Limit".to_string(),
            action: MutationAction::Update,
        }
    }

    /// DELETE: before = prior amount, after = 0
    pub fn deleted(customer_id: i64, tenor_limit_id: i64, old: Decimal) -> Self {
        Self {
            customer_id,
            tenor_limit_id,
            old_amount: old,
            new_amount: Decimal::ZERO,
            reason: "Delete Limit".to_string(),
            action: MutationAction::Delete,
        }
    }

    /// USAGE: before = after = current ceiling.
    ///
    /// Ledger chỉ ghi nhận usage xảy ra trên ceiling nào, không phải
    /// running balance; muốn tái tạo utilization phải replay transactions.
    pub fn usage(
        customer_id: i64,
        tenor_limit_id: i64,
        ceiling: Decimal,
        contract_number: &str,
    ) -> Self {
        Self {
            customer_id,
            tenor_limit_id,
            old_amount: ceiling,
            new_amount: ceiling,
            reason: format!("Transaction Usage: {}", contract_number),
            action: MutationAction::Usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_constructors_amounts() {
        let m = NewMutation::created(7, 1, dec!(500));
        assert_eq!((m.old_amount, m.new_amount), (dec!(0), dec!(500)));
        assert_eq!(m.action, MutationAction::Create);

        let m = NewMutation::updated(7, 1, dec!(100000), dec!(200000));
        assert_eq!((m.old_amount, m.new_amount), (dec!(100000), dec!(200000)));

        let m = NewMutation::deleted(7, 1, dec!(50000));
        assert_eq!((m.old_amount, m.new_amount), (dec!(50000), dec!(0)));
        assert_eq!(m.action, MutationAction::Delete);
    }

    #[test]
    fn test_usage_keeps_ceiling() {
        let m = NewMutation::usage(7, 123, dec!(20000), "CTR-001");
        assert_eq!(m.old_amount, dec!(20000));
        assert_eq!(m.new_amount, dec!(20000));
        assert_eq!(m.reason, "Transaction Usage: CTR-001");
        assert_eq!(m.action, MutationAction::Usage);
    }

    #[test]
    fn test_action_roundtrip_strings() {
        for action in [
            MutationAction::Create,
            MutationAction::Update,
            MutationAction::Delete,
            MutationAction::Usage,
        ] {
            assert_eq!(MutationAction::parse(action.as_str()), Ok(action));
        }
        assert!(MutationAction::parse("RESET").is_err());
    }
}
