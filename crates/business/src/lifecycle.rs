//! Limit lifecycle - grant, update, revoke
//!
//! Mỗi operation là một unit of work: limit row và ledger entry cùng commit
//! hoặc cùng rollback. Statement đầu tiên luôn là write trên customer row,
//! nên các operation của cùng một customer được serialize.

use crate::error::{BusinessError, BusinessResult};
use crate::services::ServiceContext;
use creditline_core::{validate_limit_amount, LimitMutation, NewMutation, Tenor, TenorLimit};
use creditline_persistence::{AuditRecord, CustomerRepo, LimitRepo, MutationRepo};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

/// Limit Lifecycle Manager
pub struct LimitLifecycle<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LimitLifecycle<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Cấp limit mới cho (customer, tenor).
    ///
    /// # Errors
    /// - `Validation` nếu tenor không thuộc {1, 2, 3, 6} hoặc amount âm
    /// - `CustomerNotFound`
    /// - `DuplicateTenor` nếu customer đã có limit cho tenor này
    pub async fn grant(
        &self,
        customer_id: i64,
        tenor_month: i64,
        amount: Decimal,
    ) -> BusinessResult<TenorLimit> {
        let tenor = Tenor::from_months(tenor_month)?;
        validate_limit_amount(amount)?;

        let mut tx = self.ctx.pool().begin().await?;

        CustomerRepo::lock(&mut *tx, customer_id)
            .await
            .map_err(|e| {
                BusinessError::map_not_found(e, "Customer", || {
                    BusinessError::CustomerNotFound(customer_id)
                })
            })?;
        debug!(customer_id, "customer lock acquired");

        let existing = LimitRepo::find_by_customer(&mut *tx, customer_id).await?;
        if existing.iter().any(|limit| limit.tenor == tenor) {
            warn!(customer_id, %tenor, "grant rejected: tenor already has a limit");
            return Err(BusinessError::DuplicateTenor { customer_id, tenor });
        }

        let limit = LimitRepo::create(&mut tx, customer_id, tenor, amount).await?;
        let entry =
            MutationRepo::append(&mut *tx, &NewMutation::created(customer_id, limit.id, amount))
                .await?;

        tx.commit().await?;

        info!(
            customer_id,
            limit_id = limit.id,
            %tenor,
            %amount,
            "limit granted"
        );
        self.ctx.record_audit(&AuditRecord::from_mutation(&entry));

        Ok(limit)
    }

    /// Đổi tenor/amount của limit.
    ///
    /// Đổi sang tenor mà customer đã có limit khác sẽ bị từ chối với
    /// `DuplicateTenor`.
    pub async fn update(
        &self,
        limit_id: i64,
        tenor_month: i64,
        amount: Decimal,
    ) -> BusinessResult<()> {
        let tenor = Tenor::from_months(tenor_month)?;
        validate_limit_amount(amount)?;

        let mut tx = self.ctx.pool().begin().await?;
        let (current, customer_id) = Self::lock_limit(&mut tx, limit_id).await?;

        if tenor != current.tenor {
            if let Some(other) = LimitRepo::find_for_tenor(&mut *tx, customer_id, tenor).await? {
                if other.id != limit_id {
                    warn!(customer_id, limit_id, %tenor, "update rejected: tenor already has a limit");
                    return Err(BusinessError::DuplicateTenor { customer_id, tenor });
                }
            }
        }

        LimitRepo::update(&mut *tx, limit_id, tenor, amount).await?;
        let entry = MutationRepo::append(
            &mut *tx,
            &NewMutation::updated(customer_id, limit_id, current.limit_amount, amount),
        )
        .await?;

        tx.commit().await?;

        info!(
            customer_id,
            limit_id,
            %tenor,
            old_amount = %current.limit_amount,
            new_amount = %amount,
            "limit updated"
        );
        self.ctx.record_audit(&AuditRecord::from_mutation(&entry));

        Ok(())
    }

    /// Xoá limit; ledger giữ lại DELETE entry với after = 0
    pub async fn revoke(&self, limit_id: i64) -> BusinessResult<()> {
        let mut tx = self.ctx.pool().begin().await?;
        let (current, customer_id) = Self::lock_limit(&mut tx, limit_id).await?;

        LimitRepo::delete(&mut tx, limit_id).await?;
        let entry = MutationRepo::append(
            &mut *tx,
            &NewMutation::deleted(customer_id, limit_id, current.limit_amount),
        )
        .await?;

        tx.commit().await?;

        info!(
            customer_id,
            limit_id,
            tenor = %current.tenor,
            old_amount = %current.limit_amount,
            "limit revoked"
        );
        self.ctx.record_audit(&AuditRecord::from_mutation(&entry));

        Ok(())
    }

    /// Limits của customer, tenor tăng dần
    pub async fn limits_for_customer(&self, customer_id: i64) -> BusinessResult<Vec<TenorLimit>> {
        if !CustomerRepo::exists(self.ctx.pool(), customer_id).await? {
            return Err(BusinessError::CustomerNotFound(customer_id));
        }
        Ok(LimitRepo::find_by_customer(self.ctx.pool(), customer_id).await?)
    }

    /// Ledger entries của customer, mới nhất trước
    pub async fn mutations_for_customer(
        &self,
        customer_id: i64,
    ) -> BusinessResult<Vec<LimitMutation>> {
        Ok(MutationRepo::find_by_customer(self.ctx.pool(), customer_id).await?)
    }

    /// Ledger entries của một limit (kể cả limit đã bị revoke)
    pub async fn mutations_for_limit(&self, limit_id: i64) -> BusinessResult<Vec<LimitMutation>> {
        Ok(MutationRepo::find_by_limit(self.ctx.pool(), limit_id).await?)
    }

    /// Lock owner của limit rồi load limit.
    ///
    /// Limit không tồn tại → `LimitNotFound`; limit tồn tại nhưng không có
    /// owner → `OwnerNotFound`.
    async fn lock_limit(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        limit_id: i64,
    ) -> BusinessResult<(TenorLimit, i64)> {
        let owner = CustomerRepo::lock_owner_of_limit(&mut **tx, limit_id).await?;

        let limit = LimitRepo::find_by_id(&mut **tx, limit_id)
            .await
            .map_err(|e| {
                BusinessError::map_not_found(e, "TenorLimit", || {
                    BusinessError::LimitNotFound(limit_id)
                })
            })?;

        let customer_id = owner.ok_or(BusinessError::OwnerNotFound(limit_id))?;
        debug!(customer_id, limit_id, "customer lock acquired");
        Ok((limit, customer_id))
    }
}
