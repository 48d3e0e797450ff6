use std::sync::Arc;
use std::time::Instant;

use label_printer::{
    FixedPrinterLocator, GhostscriptDriver, PrintDriver, PrinterLocator, SystemPrinterLocator,
};

use crate::audit::{FileAuditLog, JobAuditLog};
use crate::core::Config;
use crate::core::config::{ConfigError, PrintSettings};
use crate::printing::PrintJobCoordinator;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝, 每个请求克隆一份。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 进程配置 (不可变) |
/// | coordinator | 打印任务编排 + 打印机锁 |
/// | printers | 默认打印机查找 |
/// | audit | 打印记录 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub coordinator: Arc<PrintJobCoordinator>,
    pub printers: Arc<dyn PrinterLocator>,
    pub audit: Arc<dyn JobAuditLog>,
    pub started_at: Instant,
}

impl ServerState {
    /// 组装状态 (测试时注入替身)
    pub fn new(
        config: Config,
        driver: Arc<dyn PrintDriver>,
        audit: Arc<dyn JobAuditLog>,
        printers: Arc<dyn PrinterLocator>,
    ) -> Self {
        let coordinator = Arc::new(PrintJobCoordinator::new(driver, audit.clone()));
        Self {
            config,
            coordinator,
            printers,
            audit,
            started_at: Instant::now(),
        }
    }

    /// 使用真实的 Ghostscript 驱动、文件审计日志和系统打印机初始化
    pub fn initialize(config: &Config) -> Self {
        let driver = GhostscriptDriver::new().with_timeout(config.driver_timeout());
        let audit = FileAuditLog::new(config.audit_log_path());

        let printers: Arc<dyn PrinterLocator> = match &config.printer_name {
            Some(name) => {
                tracing::info!(printer = %name, "Using configured printer");
                Arc::new(FixedPrinterLocator::new(name.clone()))
            }
            None => Arc::new(SystemPrinterLocator),
        };

        tracing::info!(
            audit_log = %audit.path().display(),
            printer_config = %config.printer_config_path.display(),
            driver_timeout = ?config.driver_timeout(),
            "Server state initialized"
        );

        Self::new(config.clone(), Arc::new(driver), Arc::new(audit), printers)
    }

    /// 读取当前打印设置 (每次请求重新读取)
    pub fn print_settings(&self) -> Result<PrintSettings, ConfigError> {
        PrintSettings::load(&self.config.printer_config_path)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
