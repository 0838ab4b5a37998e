//! Limit lifecycle commands

use anyhow::Result;
use creditline_business::{LimitLifecycle, ServiceContext};

use crate::LimitAction;

/// Handle limit subcommands
pub async fn handle(ctx: &ServiceContext, action: LimitAction) -> Result<()> {
    let lifecycle = LimitLifecycle::new(ctx);

    match action {
        LimitAction::Grant {
            customer_id,
            tenor,
            amount,
        } => {
            let limit = lifecycle.grant(customer_id, tenor, amount).await?;
            println!("✅ Limit granted");
            println!("   Limit ID: {}", limit.id);
            println!("   Tenor:    {} month(s)", limit.tenor);
            println!("   Amount:   {}", limit.limit_amount);
        }
        LimitAction::Update {
            limit_id,
            tenor,
            amount,
        } => {
            lifecycle.update(limit_id, tenor, amount).await?;
            println!("✅ Limit {} updated: tenor {} / amount {}", limit_id, tenor, amount);
        }
        LimitAction::Revoke { limit_id } => {
            lifecycle.revoke(limit_id).await?;
            println!("🗑️  Limit {} revoked", limit_id);
        }
        LimitAction::List { customer_id } => {
            let limits = lifecycle.limits_for_customer(customer_id).await?;
            println!("📋 Limits for customer {}", customer_id);
            if limits.is_empty() {
                println!("   (none)");
            }
            for limit in limits {
                println!(
                    "   #{:<6} tenor {:>1}m  {:>18}",
                    limit.id, limit.tenor, limit.limit_amount
                );
            }
        }
    }

    ctx.pool().close().await;
    Ok(())
}
