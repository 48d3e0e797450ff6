//! Label Print Server - SKU 标签打印网关
//!
//! # 架构概述
//!
//! 网页 (跨域) 提交 `{ sku, quantity }`, 服务端找到对应 PDF,
//! 计算居中偏移, 调用 Ghostscript 打印到默认打印机, 随后打印一张分隔页。
//!
//! # 模块结构
//!
//! ```text
//! print-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── api/           # HTTP 路由、处理器、中间件
//! ├── printing/      # 打印任务编排 (打印机锁、分隔页)
//! ├── audit/         # 打印记录
//! └── utils/         # 日志
//! ```
//!
//! 文档解析、版面计算和驱动调用在 `label-printer` crate 中。

pub mod api;
pub mod audit;
pub mod core;
pub mod printing;
pub mod utils;

// Re-export 公共类型
pub use audit::{AuditEntry, AuditStatus, FileAuditLog, JobAuditLog, MemoryAuditLog};
pub use core::{Config, PrintSettings, Server, ServerError, ServerState};
pub use printing::{PrintJobCoordinator, PrintRequest, SubmitError, SubmitReport};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 设置运行环境: 加载 `.env`, 读取配置, 初始化日志
///
/// 必须在 tokio 运行时内调用 (日志清理任务)。
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    let json = config.log_json || config.is_production();
    init_logger_with_file(&config.log_level, json, config.log_dir.as_deref())?;

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    __          __         __
   / /   ____ _/ /_  ___  / /
  / /   / __ `/ __ \/ _ \/ /
 / /___/ /_/ / /_/ /  __/ /
/_____/\__,_/_.___/\___/_/
    ____       _       __
   / __ \_____(_)___  / /_
  / /_/ / ___/ / __ \/ __/
 / ____/ /  / / / / / /_
/_/   /_/  /_/_/ /_/\__/
    "#
    );
}
