//! # Creditline Demos
//!
//! Example scenarios chạy trên một SQLite file tạm.
//!
//! ## Available Examples
//!
//! 1. **01_admission** - grant a limit, admit until the ceiling rejects
//! 2. **02_limit_lifecycle** - duplicate grant, update, revoke, ledger
//! 3. **03_concurrent_admission** - racing admissions for one customer
//!
//! ## Running Examples
//!
//! ```bash
//! cargo run -p creditline-demos --example 01_admission
//! cargo run -p creditline-demos --example 02_limit_lifecycle
//! cargo run -p creditline-demos --example 03_concurrent_admission
//! ```

use creditline_business::{BusinessResult, CustomerService, EngineConfig, ServiceContext};
use creditline_core::TransactionRequest;
use rust_decimal::Decimal;
use tempfile::TempDir;

/// ServiceContext trên thư mục tạm; giữ `TempDir` sống tới khi demo kết thúc
pub async fn temp_context() -> BusinessResult<(TempDir, ServiceContext)> {
    let dir = tempfile::tempdir().map_err(io_error)?;
    let config = EngineConfig::default()
        .with_database_url(format!("sqlite:{}", dir.path().join("demo.db").display()))
        .with_journal_dir(dir.path().join("audit"));
    let ctx = ServiceContext::connect(&config).await?;
    Ok((dir, ctx))
}

fn io_error(err: std::io::Error) -> creditline_business::BusinessError {
    creditline_business::BusinessError::Storage(err.into())
}

/// Đăng ký customer với role `user`
pub async fn register(ctx: &ServiceContext, email: &str, name: &str) -> BusinessResult<i64> {
    Ok(CustomerService::new(ctx).register(email, name, "user").await?.id)
}

/// Request mẫu với phí cố định
pub fn motor_loan(contract: &str, tenor: i64, otr: Decimal) -> TransactionRequest {
    TransactionRequest {
        contract_number: contract.to_string(),
        otr,
        admin_fee: Decimal::new(250000, 2),
        installment_amount: otr / Decimal::from(tenor.max(1)),
        interest_amount: Decimal::ZERO,
        asset_name: "Honda Vario".to_string(),
        tenor,
    }
}
