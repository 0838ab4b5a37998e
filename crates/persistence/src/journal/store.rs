//! JSONL Audit Journal - append-only writer
//!
//! Ghi audit records vào files JSONL theo ngày: `data/audit/2026-03-01.jsonl`

use crate::error::{PersistenceError, PersistenceResult};
use chrono::{DateTime, Utc};
use creditline_core::{LimitMutation, MutationAction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Một dòng trong audit journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub mutation_id: i64,
    pub action: MutationAction,
    pub customer_id: i64,
    pub tenor_limit_id: i64,
    pub old_amount: Decimal,
    pub new_amount: Decimal,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

impl AuditRecord {
    /// Record cho một mutation đã commit
    pub fn from_mutation(mutation: &LimitMutation) -> Self {
        Self {
            timestamp: mutation.created_at,
            mutation_id: mutation.id,
            action: mutation.action,
            customer_id: mutation.customer_id,
            tenor_limit_id: mutation.tenor_limit_id,
            old_amount: mutation.old_amount,
            new_amount: mutation.new_amount,
            reason: mutation.reason.clone(),
            contract_number: None,
            amount: None,
        }
    }

    /// Gắn thông tin usage (contract + OTR)
    pub fn with_usage(mut self, contract_number: &str, amount: Decimal) -> Self {
        self.contract_number = Some(contract_number.to_string());
        self.amount = Some(amount);
        self
    }
}

/// Audit Journal - ghi records vào files JSONL.
pub struct AuditJournal {
    /// Thư mục chứa journal files
    base_path: PathBuf,
    /// Current file writer (thread-safe)
    current_writer: Mutex<Option<JournalWriter>>,
}

struct JournalWriter {
    date: String,
    writer: BufWriter<File>,
}

impl AuditJournal {
    /// Tạo AuditJournal mới, tạo thư mục nếu chưa có
    pub fn new<P: AsRef<Path>>(base_path: P) -> PersistenceResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            current_writer: Mutex::new(None),
        })
    }

    /// Lấy base path
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, date: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl", date))
    }

    fn current_date() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    /// Ghi record vào journal
    pub fn append(&self, record: &AuditRecord) -> PersistenceResult<()> {
        let date = Self::current_date();
        let json = serde_json::to_string(record)?;

        let mut guard = self
            .current_writer
            .lock()
            .map_err(|_| PersistenceError::Other("audit journal writer poisoned".to_string()))?;

        // Sang ngày mới thì mở file mới
        let needs_new_file = guard.as_ref().map_or(true, |w| w.date != date);
        if needs_new_file {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.file_path(&date))?;
            debug!(date = %date, "opening audit journal file");
            *guard = Some(JournalWriter {
                date: date.clone(),
                writer: BufWriter::new(file),
            });
        }

        if let Some(ref mut w) = *guard {
            writeln!(w.writer, "{}", json)?;
            w.writer.flush()?;
        }

        Ok(())
    }

    /// Lấy tất cả journal files, sắp xếp theo ngày
    pub fn list_files(&self) -> PersistenceResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "jsonl") {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}
