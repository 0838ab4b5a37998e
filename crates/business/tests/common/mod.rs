#![allow(dead_code)]

use creditline_business::{CustomerService, EngineConfig, ServiceContext};
use creditline_core::TransactionRequest;
use rust_decimal::Decimal;
use std::time::Duration;
use tempfile::TempDir;

/// Một database file riêng cho mỗi test
pub struct TestEnv {
    pub dir: TempDir,
    pub ctx: ServiceContext,
}

pub async fn setup() -> TestEnv {
    setup_with_connections(4).await
}

pub async fn setup_with_connections(max_connections: u32) -> TestEnv {
    setup_with(max_connections, Duration::from_secs(10)).await
}

pub async fn setup_with(max_connections: u32, lock_wait: Duration) -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::default()
        .with_database_url(format!(
            "sqlite:{}",
            dir.path().join("creditline.db").display()
        ))
        .with_journal_dir(dir.path().join("audit"))
        .with_max_connections(max_connections)
        .with_lock_wait_timeout(lock_wait);
    let ctx = ServiceContext::connect(&config).await.unwrap();
    TestEnv { dir, ctx }
}

pub async fn customer(ctx: &ServiceContext, email: &str) -> i64 {
    CustomerService::new(ctx)
        .register(email, "Test Customer", "user")
        .await
        .unwrap()
        .id
}

pub fn request(contract: &str, tenor: i64, otr: Decimal) -> TransactionRequest {
    TransactionRequest {
        contract_number: contract.to_string(),
        otr,
        admin_fee: Decimal::new(50000, 2),
        installment_amount: Decimal::new(110000, 2),
        interest_amount: Decimal::new(10000, 2),
        asset_name: "Honda Beat".to_string(),
        tenor,
    }
}
