//! # Example 01: Admission against a ceiling
//!
//! 1. Register a customer and grant a 1-month limit of 100000
//! 2. Admit 60000 (fits)
//! 3. Admit 50000 (60000 + 50000 > 100000, rejected)
//!
//! Run with: `cargo run -p creditline-demos --example 01_admission`

use creditline_business::{AdmissionEngine, BusinessError, LimitLifecycle};
use creditline_demos::{motor_loan, register, temp_context};
use rust_decimal_macros::dec;

#[tokio::main]
async fn main() -> Result<(), BusinessError> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    println!("=== Example 01: Admission ===\n");

    let (_dir, ctx) = temp_context().await?;
    let customer = register(&ctx, "budi@example.com", "Budi").await?;

    let limit = LimitLifecycle::new(&ctx).grant(customer, 1, dec!(100000)).await?;
    println!("💳 Limit #{} granted: {} for {} month(s)\n", limit.id, limit.limit_amount, limit.tenor);

    let engine = AdmissionEngine::new(&ctx);

    let txn = engine.admit(customer, &motor_loan("CTR-0001", 1, dec!(60000))).await?;
    println!("✅ Admitted {} (OTR {})", txn.contract_number, txn.otr);

    match engine.admit(customer, &motor_loan("CTR-0002", 1, dec!(50000))).await {
        Ok(txn) => println!("⚠️  Unexpectedly admitted {}", txn.contract_number),
        Err(e) if e.is_rejection() => println!("❌ Rejected: {}", e),
        Err(e) => return Err(e),
    }

    println!("\n📊 Usage:");
    for row in engine.usage_summary(customer).await? {
        println!(
            "   {}m  ceiling {}  used {}  remaining {}",
            row.tenor, row.ceiling, row.used, row.remaining
        );
    }

    Ok(())
}
