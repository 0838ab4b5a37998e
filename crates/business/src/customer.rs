//! Customer directory - register và lookup
//!
//! Customer row cũng là lock target của lifecycle/admission.

use crate::error::{BusinessError, BusinessResult};
use crate::services::ServiceContext;
use creditline_core::CoreError;
use creditline_persistence::{CustomerRepo, CustomerRow, NewCustomer};
use tracing::info;

/// Role mặc định cho customer mới
pub const DEFAULT_ROLE: &str = "user";

/// Customer Service
pub struct CustomerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CustomerService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Đăng ký customer mới với role cho trước
    pub async fn register(
        &self,
        email: &str,
        full_name: &str,
        role: &str,
    ) -> BusinessResult<CustomerRow> {
        let email = email.trim();
        let full_name = full_name.trim();
        if email.is_empty() {
            return Err(CoreError::MissingField("email").into());
        }
        if full_name.is_empty() {
            return Err(CoreError::MissingField("full_name").into());
        }

        let new = NewCustomer {
            email: email.to_string(),
            full_name: full_name.to_string(),
            role: role.to_string(),
        };

        let id = CustomerRepo::insert(self.ctx.pool(), &new)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    BusinessError::DuplicateEmail(new.email.clone())
                } else if e.is_not_found_for("Role") {
                    BusinessError::RoleNotFound(new.role.clone())
                } else {
                    BusinessError::Storage(e)
                }
            })?;

        info!(customer_id = id, email, role, "customer registered");
        self.find(id).await
    }

    /// Lấy customer theo ID
    pub async fn find(&self, customer_id: i64) -> BusinessResult<CustomerRow> {
        CustomerRepo::find_by_id(self.ctx.pool(), customer_id)
            .await
            .map_err(|e| {
                BusinessError::map_not_found(e, "Customer", || {
                    BusinessError::CustomerNotFound(customer_id)
                })
            })
    }
}
