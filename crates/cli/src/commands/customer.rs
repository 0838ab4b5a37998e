//! Customer commands

use anyhow::Result;
use creditline_business::{CustomerService, RoleService, ServiceContext};

use crate::CustomerAction;

/// Handle customer subcommands
pub async fn handle(ctx: &ServiceContext, action: CustomerAction) -> Result<()> {
    let customers = CustomerService::new(ctx);

    match action {
        CustomerAction::Add { email, name, role } => {
            let row = customers.register(&email, &name, &role).await?;
            println!("✅ Customer registered");
            println!("   ID:    {}", row.id);
            println!("   Email: {}", row.email);
            println!("   Role:  {}", row.role);
        }
        CustomerAction::Show { customer_id } => {
            let row = customers.find(customer_id).await?;
            println!("👤 Customer {}", row.id);
            println!("   Name:    {}", row.full_name);
            println!("   Email:   {}", row.email);
            println!("   Role:    {}", row.role);
            println!("   Created: {}", row.created_at.format("%Y-%m-%d %H:%M:%S"));
        }
        CustomerAction::Role { customer_id, role } => {
            RoleService::new(ctx).assign_role(customer_id, &role).await?;
            println!("✅ Customer {} now has role '{}'", customer_id, role);
        }
    }

    ctx.pool().close().await;
    Ok(())
}
