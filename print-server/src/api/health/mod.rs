//! 健康检查路由
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 版本、运行时间、驱动是否可用 |
//!
//! # 响应示例
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "uptime_seconds": 3600,
//!   "driver_available": true
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// ok | degraded
    status: &'static str,
    version: &'static str,
    /// 运行时间 (秒)
    uptime_seconds: u64,
    /// Ghostscript 是否可定位
    driver_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// 健康检查
///
/// 驱动不可用时所有打印都会失败, 状态报告为 degraded。
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let lookup = match state.print_settings() {
        Ok(settings) => {
            let driver = state.coordinator.driver().clone();
            tokio::task::spawn_blocking(move || {
                driver
                    .locate(settings.driver_path.as_deref())
                    .map_err(|e| e.to_string())
            })
            .await
            .unwrap_or_else(|e| Err(format!("driver lookup task failed: {}", e)))
        }
        Err(e) => Err(e.to_string()),
    };

    let (status, driver_available, message) = match lookup {
        Ok(_) => ("ok", true, None),
        Err(message) => ("degraded", false, Some(message)),
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        driver_available,
        message,
    })
}
