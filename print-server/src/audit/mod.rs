//! 打印审计日志: 记录每一次成功的驱动调用
//!
//! # 架构
//!
//! ```text
//! PrintJobCoordinator
//!   └─ JobAuditLog::record() ─┬─ print_log.jsonl (一行一条, append-only)
//!                             └─ tracing target "audit" (独立日志文件)
//! ```
//!
//! 失败的调用不记录。

pub mod storage;
pub mod types;

pub use storage::{FileAuditLog, JobAuditLog, MemoryAuditLog};
pub use types::{AuditEntry, AuditStatus};
