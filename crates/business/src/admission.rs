//! Admission engine
//!
//! Admit một loan transaction vào ceiling của (customer, tenor):
//!
//! ```text
//! BEGIN
//!   lock customer row
//!   load limit for tenor          -> TenorLimitNotFound
//!   used = sum(otr) for tenor     (recomputed, không có running counter)
//!   used + otr > limit            -> InsufficientLimit
//!   insert transaction (pending)  -> DuplicateContract
//!   append USAGE ledger entry
//! COMMIT
//! ```

use crate::error::{BusinessError, BusinessResult};
use crate::services::ServiceContext;
use creditline_core::{
    LoanTransaction, NewMutation, Tenor, TenorLimit, TransactionRequest, TransactionStatus,
};
use creditline_persistence::{AuditRecord, CustomerRepo, LimitRepo, MutationRepo, TransactionRepo};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

/// Một trang transactions của customer
#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    pub items: Vec<LoanTransaction>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl TransactionPage {
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        let per_page = i64::from(self.per_page);
        let pages = (self.total.max(0) + per_page - 1) / per_page;
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// Usage của một tenor tại thời điểm đọc
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenorUsage {
    pub tenor: Tenor,
    pub limit_id: i64,
    pub ceiling: Decimal,
    pub used: Decimal,
    pub remaining: Decimal,
}

/// Admission Engine
pub struct AdmissionEngine<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdmissionEngine<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Admit transaction cho customer.
    ///
    /// Chỉ thành công khi `used + otr <= ceiling`. Mọi lỗi sau khi mở unit
    /// of work đều rollback toàn bộ, kể cả lock.
    pub async fn admit(
        &self,
        customer_id: i64,
        request: &TransactionRequest,
    ) -> BusinessResult<LoanTransaction> {
        let tenor = request.validate()?;

        let mut tx = self.ctx.pool().begin().await?;

        CustomerRepo::lock(&mut *tx, customer_id)
            .await
            .map_err(|e| {
                BusinessError::map_not_found(e, "Customer", || {
                    BusinessError::CustomerNotFound(customer_id)
                })
            })?;
        debug!(customer_id, "customer lock acquired");

        let limit = LimitRepo::find_for_tenor(&mut *tx, customer_id, tenor)
            .await?
            .ok_or(BusinessError::TenorLimitNotFound { customer_id, tenor })?;

        let used = used_amount(&mut tx, customer_id, tenor).await?;
        if !limit.admits(used, request.otr) {
            warn!(
                customer_id,
                %tenor,
                limit = %limit.limit_amount,
                %used,
                requested = %request.otr,
                "admission rejected: insufficient limit"
            );
            return Err(BusinessError::InsufficientLimit {
                tenor,
                limit: limit.limit_amount,
                used,
                requested: request.otr,
            });
        }

        let transaction = TransactionRepo::insert(
            &mut *tx,
            customer_id,
            tenor,
            request,
            TransactionStatus::Pending,
        )
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                BusinessError::DuplicateContract(request.contract_number.clone())
            } else {
                BusinessError::Storage(e)
            }
        })?;

        let entry = MutationRepo::append(
            &mut *tx,
            &NewMutation::usage(
                customer_id,
                limit.id,
                limit.limit_amount,
                &request.contract_number,
            ),
        )
        .await?;

        tx.commit().await?;

        let used_after = used + transaction.otr;
        info!(
            customer_id,
            transaction_id = transaction.id,
            contract_number = %transaction.contract_number,
            %tenor,
            otr = %transaction.otr,
            %used_after,
            "transaction admitted"
        );
        let record = AuditRecord::from_mutation(&entry)
            .with_usage(&transaction.contract_number, transaction.otr);
        self.ctx.record_audit(&record);

        Ok(transaction)
    }

    /// Transactions của customer theo trang (page bắt đầu từ 1), mới nhất trước
    pub async fn transactions_for_customer(
        &self,
        customer_id: i64,
        page: u32,
        per_page: u32,
    ) -> BusinessResult<TransactionPage> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let offset = i64::from(page - 1) * i64::from(per_page);

        let mut conn = self.ctx.pool().acquire().await?;
        let (items, total) = TransactionRepo::find_by_customer_paginated(
            &mut conn,
            customer_id,
            offset,
            i64::from(per_page),
        )
        .await?;

        Ok(TransactionPage {
            items,
            total,
            page,
            per_page,
        })
    }

    /// Ceiling / used / remaining cho từng tenor mà customer có limit.
    ///
    /// Đọc trong một read transaction để limits và transactions cùng snapshot.
    pub async fn usage_summary(&self, customer_id: i64) -> BusinessResult<Vec<TenorUsage>> {
        let mut tx = self.ctx.pool().begin().await?;

        if !CustomerRepo::exists(&mut *tx, customer_id).await? {
            return Err(BusinessError::CustomerNotFound(customer_id));
        }

        let limits = LimitRepo::find_by_customer(&mut *tx, customer_id).await?;
        let transactions = TransactionRepo::find_by_customer(&mut *tx, customer_id).await?;
        tx.commit().await?;

        Ok(limits
            .iter()
            .map(|limit| summarize(limit, &transactions))
            .collect())
    }
}

/// Tổng OTR của các transaction cùng tenor
async fn used_amount(
    conn: &mut SqliteConnection,
    customer_id: i64,
    tenor: Tenor,
) -> BusinessResult<Decimal> {
    let transactions = TransactionRepo::find_by_customer(&mut *conn, customer_id).await?;
    Ok(sum_otr(&transactions, tenor))
}

fn sum_otr(transactions: &[LoanTransaction], tenor: Tenor) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.tenor == tenor)
        .map(|t| t.otr)
        .sum()
}

fn summarize(limit: &TenorLimit, transactions: &[LoanTransaction]) -> TenorUsage {
    let used = sum_otr(transactions, limit.tenor);
    TenorUsage {
        tenor: limit.tenor,
        limit_id: limit.id,
        ceiling: limit.limit_amount,
        used,
        remaining: limit.remaining(used),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn txn(id: i64, tenor: Tenor, otr: Decimal) -> LoanTransaction {
        LoanTransaction {
            id,
            customer_id: 1,
            contract_number: format!("CTR-{}", id),
            otr,
            admin_fee: dec!(0),
            installment_amount: dec!(0),
            interest_amount: dec!(0),
            asset_name: "Car".to_string(),
            tenor,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sum_otr_filters_by_tenor() {
        let transactions = vec![
            txn(1, Tenor::OneMonth, dec!(60000)),
            txn(2, Tenor::TwoMonths, dec!(5000)),
            txn(3, Tenor::OneMonth, dec!(1500.50)),
        ];
        assert_eq!(sum_otr(&transactions, Tenor::OneMonth), dec!(61500.50));
        assert_eq!(sum_otr(&transactions, Tenor::SixMonths), dec!(0));
    }

    #[test]
    fn test_summarize() {
        let limit = TenorLimit {
            id: 9,
            tenor: Tenor::TwoMonths,
            limit_amount: dec!(10000),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let usage = summarize(&limit, &[txn(1, Tenor::TwoMonths, dec!(2500))]);
        assert_eq!(usage.limit_id, 9);
        assert_eq!(usage.used, dec!(2500));
        assert_eq!(usage.remaining, dec!(7500));
    }

    #[test]
    fn test_total_pages() {
        let page = TransactionPage {
            items: vec![],
            total: 21,
            page: 1,
            per_page: 10,
        };
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_total_pages_saturates() {
        let page = TransactionPage {
            items: vec![],
            total: i64::MAX - 1,
            page: 1,
            per_page: 1,
        };
        assert_eq!(page.total_pages(), u32::MAX);
    }
}
