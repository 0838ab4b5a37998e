//! Role management
//!
//! Đổi role của customer và invalidate permission cache ngay sau đó.

use crate::error::{BusinessError, BusinessResult};
use crate::services::ServiceContext;
use creditline_persistence::{CustomerRepo, PermissionRepo};
use tracing::{info, warn};

/// Role Service
pub struct RoleService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoleService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Gán role cho customer rồi invalidate cache entry của customer đó
    pub async fn assign_role(&self, customer_id: i64, role: &str) -> BusinessResult<()> {
        let mut conn = self.ctx.pool().acquire().await?;
        CustomerRepo::assign_role(&mut conn, customer_id, role)
            .await
            .map_err(|e| {
                if e.is_not_found_for("Role") {
                    BusinessError::RoleNotFound(role.to_string())
                } else {
                    BusinessError::map_not_found(e, "Customer", || {
                        BusinessError::CustomerNotFound(customer_id)
                    })
                }
            })?;

        if let Err(e) = self.ctx.cache().invalidate(customer_id).await {
            // Entry cũ sẽ tự hết hạn sau một TTL
            warn!(customer_id, error = %e, "permission cache invalidation failed");
        }

        info!(customer_id, role, "role assigned");
        Ok(())
    }

    /// Danh sách role có sẵn
    pub async fn roles(&self) -> BusinessResult<Vec<String>> {
        Ok(PermissionRepo::role_names(self.ctx.pool()).await?)
    }
}
