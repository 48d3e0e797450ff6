//! 审计日志类型定义

use serde::{Deserialize, Serialize};

/// Timestamp format of the print log
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 打印类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// SKU 主任务
    Printed,
    /// 分隔页
    SeparatorPrinted,
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStatus::Printed => write!(f, "printed"),
            AuditStatus::SeparatorPrinted => write!(f, "separator_printed"),
        }
    }
}

/// 一条打印记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// 本地时间 `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    pub document_name: String,
    pub quantity: u32,
    pub printer: String,
    pub status: AuditStatus,
}

impl AuditEntry {
    /// 以当前本地时间创建记录
    pub fn now(
        document_name: impl Into<String>,
        quantity: u32,
        printer: impl Into<String>,
        status: AuditStatus,
    ) -> Self {
        Self {
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            document_name: document_name.into(),
            quantity,
            printer: printer.into(),
            status,
        }
    }
}
