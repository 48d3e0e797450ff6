//! 审计日志存储
//!
//! JSON Lines 文件, 只追加。写入失败只记录错误, 不影响打印结果。

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::types::AuditEntry;

/// Durable record of completed driver invocations
pub trait JobAuditLog: Send + Sync {
    /// Append one entry; never fails from the caller's view
    fn record(&self, entry: AuditEntry);

    /// Most recent `limit` entries, oldest first
    fn recent(&self, limit: usize) -> std::io::Result<Vec<AuditEntry>>;
}

/// 文件审计日志 (`print_log.jsonl`)
pub struct FileAuditLog {
    path: PathBuf,
    /// Serializes appends from concurrent requests
    write_lock: Mutex<()>,
}

impl FileAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &AuditEntry) -> anyhow::Result<()> {
        let line = serde_json::to_string(entry)?;

        let _guard = self.write_lock.lock();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

impl JobAuditLog for FileAuditLog {
    fn record(&self, entry: AuditEntry) {
        tracing::info!(
            target: "audit",
            document = %entry.document_name,
            quantity = entry.quantity,
            printer = %entry.printer,
            status = %entry.status,
            timestamp = %entry.timestamp,
            "PRINT"
        );

        if let Err(e) = self.append(&entry) {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to write print log entry");
        }
    }

    fn recent(&self, limit: usize) -> std::io::Result<Vec<AuditEntry>> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed print log line"),
            }
        }

        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }
}

/// 内存审计日志 (测试 / 无工作目录场景)
#[derive(Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }
}

impl JobAuditLog for MemoryAuditLog {
    fn record(&self, entry: AuditEntry) {
        self.entries.lock().push(entry);
    }

    fn recent(&self, limit: usize) -> std::io::Result<Vec<AuditEntry>> {
        let entries = self.entries.lock();
        let skip = entries.len().saturating_sub(limit);
        Ok(entries[skip..].to_vec())
    }
}
