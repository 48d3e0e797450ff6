//! Print API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /print | POST | 提交 SKU 标签打印 |
//! | /print/log | GET | 最近的打印记录 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/print", post(handler::submit))
        .route("/print/log", get(handler::recent_log))
}
