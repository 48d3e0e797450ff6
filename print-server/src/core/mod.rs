//! 核心模块 - 服务器配置、状态和错误定义
//!
//! # 模块结构
//!
//! - [`Config`] - 进程配置, [`PrintSettings`] - 打印设置文件
//! - [`ServerState`] - 服务器状态
//! - [`Server`] - HTTP 服务器
//! - [`ServerError`] - 网关错误

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::{Config, PrintSettings};
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
