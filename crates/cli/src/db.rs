//! Database initialization and status

use anyhow::{Context, Result};
use creditline_business::{EngineConfig, ServiceContext};
use creditline_persistence::TransactionRepo;
use std::path::Path;
use std::time::Duration;

use crate::Cli;

/// Build engine config from CLI flags / environment
pub fn config_from(cli: &Cli) -> EngineConfig {
    EngineConfig::default()
        .with_database_url(cli.database_url.clone())
        .with_lock_wait_timeout(Duration::from_millis(cli.lock_timeout_ms))
        .with_permission_cache_ttl(Duration::from_secs(cli.permission_ttl_secs))
        .with_journal_dir(cli.journal_dir.clone())
}

/// Open the service context, creating the data directory for file URLs
pub async fn connect(config: &EngineConfig) -> Result<ServiceContext> {
    if let Some(parent) = sqlite_file(&config.database_url).and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
    }

    ServiceContext::connect(config)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))
}

/// Run migrations (including role/permission seed)
pub async fn init(config: &EngineConfig) -> Result<()> {
    println!("📦 Running migrations...");
    let ctx = connect(config).await?;
    ctx.pool().close().await;
    println!("✅ Database initialized at {}", config.database_url);
    Ok(())
}

/// Show database status
pub async fn show_status(config: &EngineConfig) -> Result<()> {
    if let Some(path) = sqlite_file(&config.database_url) {
        if !path.exists() {
            println!("❌ Database not found at {:?}", path);
            println!("   Run 'creditline init' to create the database");
            return Ok(());
        }
    }

    let ctx = connect(config).await?;
    let pool = ctx.pool();

    let customers: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
        .fetch_one(pool)
        .await?;
    let limits: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenor_limits")
        .fetch_one(pool)
        .await?;
    let mutations: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM limit_mutations")
        .fetch_one(pool)
        .await?;
    let transactions = TransactionRepo::count(pool).await?;

    println!("📊 Database Status");
    println!("   URL: {}", config.database_url);
    println!("   Journal: {:?}", config.journal_dir);
    println!();
    println!("   Customers:    {}", customers.0);
    println!("   Limits:       {}", limits.0);
    println!("   Transactions: {}", transactions);
    println!("   Ledger rows:  {}", mutations.0);

    pool.close().await;
    Ok(())
}

/// File path behind a `sqlite:` URL, if any
fn sqlite_file(url: &str) -> Option<&Path> {
    let rest = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(Path::new(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_file() {
        assert_eq!(
            sqlite_file("sqlite:data/creditline.db?mode=rwc"),
            Some(Path::new("data/creditline.db"))
        );
        assert_eq!(sqlite_file("sqlite://tmp/x.db"), Some(Path::new("tmp/x.db")));
        assert_eq!(sqlite_file("sqlite::memory:"), None);
        assert_eq!(sqlite_file("postgres://localhost"), None);
    }
}
