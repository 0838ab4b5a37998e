//! # Example 03: Racing admissions
//!
//! Ten requests of 30000 race against a 100000 ceiling. The customer lock
//! serializes them, so exactly three are admitted.
//!
//! Run with: `cargo run -p creditline-demos --example 03_concurrent_admission`

use creditline_business::{AdmissionEngine, BusinessError, LimitLifecycle};
use creditline_demos::{motor_loan, register, temp_context};
use rust_decimal_macros::dec;

#[tokio::main]
async fn main() -> Result<(), BusinessError> {
    tracing_subscriber::fmt().with_env_filter("warn").init();
    println!("=== Example 03: Concurrent Admission ===\n");

    let (_dir, ctx) = temp_context().await?;
    let customer = register(&ctx, "dewi@example.com", "Dewi").await?;
    LimitLifecycle::new(&ctx).grant(customer, 1, dec!(100000)).await?;

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                AdmissionEngine::new(&ctx)
                    .admit(customer, &motor_loan(&format!("CTR-{:04}", i), 1, dec!(30000)))
                    .await
            })
        })
        .collect();

    let mut admitted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await {
            Ok(Ok(_)) => admitted += 1,
            Ok(Err(e)) if e.is_rejection() => rejected += 1,
            Ok(Err(e)) => return Err(e),
            Err(join) => println!("⚠️  task failed: {}", join),
        }
    }

    println!("✅ Admitted: {}", admitted);
    println!("❌ Rejected: {}", rejected);

    for row in AdmissionEngine::new(&ctx).usage_summary(customer).await? {
        println!("📊 Used {} of {}", row.used, row.ceiling);
    }
    Ok(())
}
