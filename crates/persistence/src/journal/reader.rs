//! Audit Reader - đọc journal newest-first

use crate::error::PersistenceResult;
use crate::journal::store::AuditRecord;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Audit Reader - đọc records từ files JSONL
pub struct AuditReader {
    base_path: PathBuf,
}

impl AuditReader {
    /// Tạo reader mới
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Đọc tất cả records từ một file, theo thứ tự ghi
    pub fn read_file(&self, file_path: &Path) -> PersistenceResult<Vec<AuditRecord>> {
        let reader = BufReader::new(File::open(file_path)?);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }

        Ok(records)
    }

    /// Records mới nhất trước, tối đa `count` (None = tất cả).
    ///
    /// Thư mục chưa tồn tại trả về danh sách rỗng.
    pub fn recent(&self, count: Option<usize>) -> PersistenceResult<Vec<AuditRecord>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&self.base_path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map_or(false, |ext| ext == "jsonl"))
            .collect();
        files.sort();

        let limit = count.unwrap_or(usize::MAX);
        let mut result = Vec::new();

        for file in files.iter().rev() {
            let mut records = self.read_file(file)?;
            records.reverse();
            for record in records {
                if result.len() >= limit {
                    return Ok(result);
                }
                result.push(record);
            }
        }

        Ok(result)
    }
}
