//! 工具模块
//!
//! - [`logger`] - 日志初始化、旧日志清理

pub mod logger;

pub use logger::{cleanup_old_logs, init_logger, init_logger_with_file};
