use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator sheet shipped with the label stock
pub const DEFAULT_SEPARATOR_FILE: &str = "分割72.pdf";

/// 服务配置 - 进程级配置项
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录 (打印日志、默认配置文件) |
/// | HTTP_HOST | 0.0.0.0 | 监听地址 |
/// | HTTP_PORT | 8080 | HTTP 服务端口 |
/// | PRINTER_CONFIG | $WORK_DIR/printer_config.json | 打印设置文件 |
/// | PRINTER_NAME | (系统默认打印机) | 固定打印机名称 |
/// | DRIVER_TIMEOUT_SECS | 120 | Ghostscript 超时, 0 = 不限 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志格式 |
/// | LOG_DIR | (无) | 日志文件目录 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=C:/labels/work HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// 监听地址
    pub http_host: String,
    /// HTTP 服务端口
    pub http_port: u16,
    /// 打印设置 JSON 文件
    pub printer_config_path: PathBuf,
    /// 覆盖系统默认打印机
    pub printer_name: Option<String>,
    /// 单次驱动调用超时 (秒), 0 = 不限
    pub driver_timeout_secs: u64,
    /// 日志级别
    pub log_level: String,
    /// 是否 JSON 日志
    pub log_json: bool,
    /// 日志文件目录
    pub log_dir: Option<String>,
    /// 运行环境: development | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into());
        let printer_config_path = std::env::var("PRINTER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Path::new(&work_dir).join("printer_config.json"));

        Self {
            http_host: std::env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port: env_parse("HTTP_PORT").unwrap_or(8080),
            printer_config_path,
            printer_name: std::env::var("PRINTER_NAME")
                .ok()
                .filter(|name| !name.trim().is_empty()),
            driver_timeout_secs: env_parse("DRIVER_TIMEOUT_SECS").unwrap_or(120),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON").unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            work_dir,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.printer_config_path = Path::new(&config.work_dir).join("printer_config.json");
        config
    }

    /// Ghostscript 调用超时
    pub fn driver_timeout(&self) -> Option<Duration> {
        (self.driver_timeout_secs > 0).then(|| Duration::from_secs(self.driver_timeout_secs))
    }

    /// 打印审计日志文件
    pub fn audit_log_path(&self) -> PathBuf {
        Path::new(&self.work_dir).join("print_log.jsonl")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid printer config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 打印设置 - 每次请求时从 JSON 文件读取, 修改后立即生效
///
/// 同时接受旧版键名 (`temuskupdf_folder`, `other_folder`, `gs_path`) 与 camelCase。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintSettings {
    /// SKU PDF 所在目录
    #[serde(alias = "documentRootDir", alias = "temuskupdf_folder")]
    pub document_root_dir: Option<PathBuf>,
    /// 分隔页所在目录
    #[serde(alias = "separatorDir", alias = "other_folder")]
    pub separator_dir: Option<PathBuf>,
    /// 分隔页文件名
    #[serde(alias = "separatorFileName", alias = "separator_pdf_name")]
    pub separator_file_name: Option<String>,
    /// 主任务后是否打印分隔页
    #[serde(alias = "printSeparator")]
    pub print_separator: bool,
    /// Ghostscript 可执行文件 (为空则自动查找)
    #[serde(alias = "driverPath", alias = "gs_path")]
    pub driver_path: Option<PathBuf>,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            document_root_dir: None,
            separator_dir: None,
            separator_file_name: Some(DEFAULT_SEPARATOR_FILE.to_string()),
            print_separator: true,
            driver_path: None,
        }
    }
}

impl PrintSettings {
    /// 从文件加载设置, 文件不存在时使用默认值
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Printer config not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(settings.normalized())
    }

    /// 保存设置到文件
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, content).map_err(io_err)
    }

    /// Full path of the separator sheet, when both parts are configured
    pub fn separator_path(&self) -> Option<PathBuf> {
        let dir = self.separator_dir.as_ref()?;
        let name = self.separator_file_name.as_ref()?;
        Some(dir.join(name))
    }

    /// Empty strings in the file mean "not configured"
    fn normalized(mut self) -> Self {
        fn blank_path(p: &Option<PathBuf>) -> bool {
            p.as_ref().is_some_and(|p| p.as_os_str().is_empty())
        }

        if blank_path(&self.document_root_dir) {
            self.document_root_dir = None;
        }
        if blank_path(&self.separator_dir) {
            self.separator_dir = None;
        }
        if blank_path(&self.driver_path) {
            self.driver_path = None;
        }
        if self
            .separator_file_name
            .as_ref()
            .is_some_and(|n| n.trim().is_empty())
        {
            self.separator_file_name = None;
        }
        self
    }
}
