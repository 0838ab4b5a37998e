//! # Tenor Module
//!
//! Kỳ hạn khoản vay tính theo tháng. Tập giá trị đóng: {1, 2, 3, 6}.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kỳ hạn (tenor) của khoản vay.
///
/// Serialize thành số tháng (`1`, `2`, `3`, `6`) trong JSON và DB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Tenor {
    OneMonth,
    TwoMonths,
    ThreeMonths,
    SixMonths,
}

impl Tenor {
    /// Số tháng của kỳ hạn
    pub fn months(&self) -> i64 {
        match self {
            Tenor::OneMonth => 1,
            Tenor::TwoMonths => 2,
            Tenor::ThreeMonths => 3,
            Tenor::SixMonths => 6,
        }
    }

    /// Parse từ số tháng
    pub fn from_months(months: i64) -> CoreResult<Self> {
        match months {
            1 => Ok(Tenor::OneMonth),
            2 => Ok(Tenor::TwoMonths),
            3 => Ok(Tenor::ThreeMonths),
            6 => Ok(Tenor::SixMonths),
            other => Err(CoreError::InvalidTenor(other)),
        }
    }

    /// Tất cả tenors, theo thứ tự tăng dần
    pub fn all() -> [Tenor; 4] {
        [
            Tenor::OneMonth,
            Tenor::TwoMonths,
            Tenor::ThreeMonths,
            Tenor::SixMonths,
        ]
    }
}

impl TryFrom<i64> for Tenor {
    type Error = CoreError;

    fn try_from(months: i64) -> Result<Self, Self::Error> {
        Tenor::from_months(months)
    }
}

impl From<Tenor> for i64 {
    fn from(tenor: Tenor) -> Self {
        tenor.months()
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.months())
    }
}
