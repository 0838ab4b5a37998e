//! SQLite persistence module
//!
//! Repository pattern cho SQLite database access.

pub mod repos;
pub mod schema;

pub use repos::{
    create_pool, init_database, run_migrations, CustomerRepo, LimitRepo, MutationRepo,
    PermissionRepo, TransactionRepo,
};
pub use schema::{CustomerRow, LimitMutationRow, NewCustomer, TenorLimitRow, TransactionRow};
