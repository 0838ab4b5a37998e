//! # Example 02: Limit lifecycle and the mutation ledger
//!
//! 1. Grant tenor 1 = 500, then try tenor 1 = 700 (duplicate)
//! 2. Update the limit to tenor 2 = 200000
//! 3. Revoke it
//! 4. Print the ledger and the audit journal
//!
//! Run with: `cargo run -p creditline-demos --example 02_limit_lifecycle`

use creditline_business::{BusinessError, LimitLifecycle};
use creditline_demos::{register, temp_context};
use rust_decimal_macros::dec;

#[tokio::main]
async fn main() -> Result<(), BusinessError> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    println!("=== Example 02: Limit Lifecycle ===\n");

    let (_dir, ctx) = temp_context().await?;
    let customer = register(&ctx, "citra@example.com", "Citra").await?;
    let lifecycle = LimitLifecycle::new(&ctx);

    let limit = lifecycle.grant(customer, 1, dec!(500)).await?;
    println!("💳 Granted limit #{}: {}", limit.id, limit.limit_amount);

    if let Err(e) = lifecycle.grant(customer, 1, dec!(700)).await {
        println!("❌ Second grant rejected: {}", e);
    }

    lifecycle.update(limit.id, 2, dec!(200000)).await?;
    println!("✏️  Limit #{} moved to tenor 2, amount 200000", limit.id);

    lifecycle.revoke(limit.id).await?;
    println!("🗑️  Limit #{} revoked\n", limit.id);

    println!("📒 Ledger (newest first):");
    for entry in lifecycle.mutations_for_limit(limit.id).await? {
        println!(
            "   {:<6} {:>10} -> {:<10} {}",
            entry.action.as_str(),
            entry.old_amount,
            entry.new_amount,
            entry.reason
        );
    }

    println!("\n🧾 Audit journal records: {}", ctx.audit_reader().recent(None)?.len());
    Ok(())
}
