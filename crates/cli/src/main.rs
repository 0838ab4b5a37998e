//! Creditline CLI - limit and admission operations from the command line
//!
//! Usage:
//! ```bash
//! creditline init
//! creditline customer add --email budi@example.com --name "Budi"
//! creditline limit grant 1 --tenor 1 --amount 100000
//! creditline tx admit 1 --tenor 1 --otr 60000 --asset "Honda Beat"
//! creditline usage 1
//! creditline ledger 1 --limit-id 3
//! creditline journal --count 20
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod db;

use commands::{audit, customer, limit, tx};

/// Creditline - credit limit admission & mutation ledger
#[derive(Parser)]
#[command(name = "creditline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// SQLite database URL
    #[arg(
        long,
        env = "CREDITLINE_DATABASE_URL",
        default_value = creditline_business::config::DEFAULT_DATABASE_URL,
        global = true
    )]
    pub database_url: String,

    /// Maximum wait for a customer lock, in milliseconds
    #[arg(long, env = "CREDITLINE_LOCK_TIMEOUT_MS", default_value_t = 5000, global = true)]
    pub lock_timeout_ms: u64,

    /// Permission cache TTL, in seconds
    #[arg(long, env = "CREDITLINE_PERMISSION_TTL_SECS", default_value_t = 300, global = true)]
    pub permission_ttl_secs: u64,

    /// Audit journal directory
    #[arg(
        long,
        env = "CREDITLINE_JOURNAL_DIR",
        default_value = creditline_business::config::DEFAULT_JOURNAL_DIR,
        global = true
    )]
    pub journal_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize database (migrations + seed roles)
    Init,

    /// Show database status
    Status,

    /// Customer directory
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },

    /// Tenor limit lifecycle
    Limit {
        #[command(subcommand)]
        action: LimitAction,
    },

    /// Loan transactions
    Tx {
        #[command(subcommand)]
        action: TxAction,
    },

    /// Show mutation ledger entries for a customer
    Ledger {
        /// Customer ID
        customer_id: i64,
        /// Only entries for this limit
        #[arg(long)]
        limit_id: Option<i64>,
    },

    /// Show ceiling / used / remaining per tenor
    Usage {
        /// Customer ID
        customer_id: i64,
    },

    /// Show a customer's capabilities
    Permissions {
        /// Customer ID
        customer_id: i64,
    },

    /// Show recent audit journal records
    Journal {
        /// Number of records
        #[arg(long, short = 'n', default_value_t = 20)]
        count: usize,
    },
}

#[derive(Subcommand)]
pub enum CustomerAction {
    /// Register a new customer
    Add {
        #[arg(long, short)]
        email: String,
        #[arg(long, short)]
        name: String,
        /// Role name (admin, user)
        #[arg(long, short, default_value = creditline_business::DEFAULT_ROLE)]
        role: String,
    },
    /// Show customer details
    Show {
        customer_id: i64,
    },
    /// Assign a role to a customer
    Role {
        customer_id: i64,
        role: String,
    },
}

#[derive(Subcommand)]
pub enum LimitAction {
    /// Grant a limit for a tenor
    Grant {
        customer_id: i64,
        /// Tenor in months (1, 2, 3, 6)
        #[arg(long, short)]
        tenor: i64,
        #[arg(long, short)]
        amount: Decimal,
    },
    /// Change a limit's tenor and amount
    Update {
        limit_id: i64,
        #[arg(long, short)]
        tenor: i64,
        #[arg(long, short)]
        amount: Decimal,
    },
    /// Delete a limit
    Revoke {
        limit_id: i64,
    },
    /// List a customer's limits
    List {
        customer_id: i64,
    },
}

#[derive(Subcommand)]
pub enum TxAction {
    /// Admit a loan transaction against the customer's limit
    Admit {
        customer_id: i64,
        /// Tenor in months (1, 2, 3, 6)
        #[arg(long, short)]
        tenor: i64,
        /// Principal (OTR)
        #[arg(long)]
        otr: Decimal,
        /// Contract number (generated when omitted)
        #[arg(long, short)]
        contract: Option<String>,
        #[arg(long, default_value = "0")]
        admin_fee: Decimal,
        #[arg(long, default_value = "0")]
        installment: Decimal,
        #[arg(long, default_value = "0")]
        interest: Decimal,
        #[arg(long, short)]
        asset: String,
    },
    /// List a customer's transactions
    List {
        customer_id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = db::config_from(&cli);

    match cli.command {
        Commands::Init => {
            db::init(&config).await?;
        }

        Commands::Status => {
            db::show_status(&config).await?;
        }

        Commands::Customer { action } => {
            let ctx = db::connect(&config).await?;
            customer::handle(&ctx, action).await?;
        }

        Commands::Limit { action } => {
            let ctx = db::connect(&config).await?;
            limit::handle(&ctx, action).await?;
        }

        Commands::Tx { action } => {
            let ctx = db::connect(&config).await?;
            tx::handle(&ctx, action).await?;
        }

        Commands::Ledger {
            customer_id,
            limit_id,
        } => {
            let ctx = db::connect(&config).await?;
            audit::show_ledger(&ctx, customer_id, limit_id).await?;
        }

        Commands::Usage { customer_id } => {
            let ctx = db::connect(&config).await?;
            audit::show_usage(&ctx, customer_id).await?;
        }

        Commands::Permissions { customer_id } => {
            let ctx = db::connect(&config).await?;
            audit::show_permissions(&ctx, customer_id).await?;
        }

        Commands::Journal { count } => {
            let ctx = db::connect(&config).await?;
            audit::show_journal(&ctx, count)?;
        }
    }

    Ok(())
}
