//! CLI command handlers

pub mod audit;
pub mod customer;
pub mod limit;
pub mod tx;
