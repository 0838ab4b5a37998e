//! JSONL audit journal
//!
//! Bản sao best-effort của ledger, ghi sau khi unit of work đã commit.
//! Database ledger (`limit_mutations`) mới là nguồn authoritative.

pub mod reader;
pub mod store;

pub use reader::AuditReader;
pub use store::{AuditJournal, AuditRecord};
