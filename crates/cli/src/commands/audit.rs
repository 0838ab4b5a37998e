//! Ledger, usage, permission and journal commands

use anyhow::Result;
use creditline_business::{AdmissionEngine, LimitLifecycle, PermissionService, ServiceContext};
use creditline_core::LimitMutation;

/// Show mutation ledger for a customer, optionally for one limit
pub async fn show_ledger(
    ctx: &ServiceContext,
    customer_id: i64,
    limit_id: Option<i64>,
) -> Result<()> {
    let lifecycle = LimitLifecycle::new(ctx);
    let entries = match limit_id {
        Some(id) => lifecycle
            .mutations_for_limit(id)
            .await?
            .into_iter()
            .filter(|m| m.customer_id == customer_id)
            .collect(),
        None => lifecycle.mutations_for_customer(customer_id).await?,
    };

    println!("📒 Ledger for customer {}", customer_id);
    if let Some(id) = limit_id {
        println!("   Limit: {}", id);
    }
    println!("   Entries: {}", entries.len());
    println!();
    for entry in &entries {
        print_entry(entry);
    }

    ctx.pool().close().await;
    Ok(())
}

fn print_entry(entry: &LimitMutation) {
    println!(
        "   #{:<6} {} {:<6} limit {:<6} {:>16} -> {:<16} {}",
        entry.id,
        entry.created_at.format("%Y-%m-%d %H:%M:%S"),
        entry.action.as_str(),
        entry.tenor_limit_id,
        entry.old_amount,
        entry.new_amount,
        entry.reason
    );
}

/// Show usage summary per tenor
pub async fn show_usage(ctx: &ServiceContext, customer_id: i64) -> Result<()> {
    let usage = AdmissionEngine::new(ctx).usage_summary(customer_id).await?;

    println!("📊 Usage for customer {}", customer_id);
    if usage.is_empty() {
        println!("   (no limits)");
    }
    for row in usage {
        println!(
            "   {}m  ceiling {:>16}  used {:>16}  remaining {:>16}",
            row.tenor, row.ceiling, row.used, row.remaining
        );
    }

    ctx.pool().close().await;
    Ok(())
}

/// Show capabilities of a customer
pub async fn show_permissions(ctx: &ServiceContext, customer_id: i64) -> Result<()> {
    let capabilities = PermissionService::new(ctx)
        .get_permissions(customer_id)
        .await?;

    println!("🔐 Permissions for customer {}", customer_id);
    for capability in capabilities {
        println!("   - {}", capability);
    }

    ctx.pool().close().await;
    Ok(())
}

/// Show most recent audit journal records
pub fn show_journal(ctx: &ServiceContext, count: usize) -> Result<()> {
    let records = ctx.audit_reader().recent(Some(count))?;

    println!("🧾 Audit journal ({} records)", records.len());
    for record in records {
        println!("   {}", serde_json::to_string(&record)?);
    }
    Ok(())
}
