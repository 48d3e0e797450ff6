use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::printing::SubmitError;

/// 网关错误 - 映射为纯文本 HTTP 响应
///
/// 响应体是固定文案, 网页脚本按文案判断结果。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,

    /// 请求体缺少 sku / quantity, 或取值非法
    #[error("Missing sku or quantity")]
    Validation(String),

    /// 文档解析、驱动查找或主打印任务失败
    #[error("Failed to submit print job")]
    PrintFailed(#[from] SubmitError),

    /// Body carries the whole context chain (`outer: inner`)
    #[error("Server error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            ServerError::NotFound => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            ServerError::Validation(reason) => {
                tracing::warn!(reason = %reason, "Rejected print request");
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            ServerError::PrintFailed(err) => {
                tracing::error!(error = %err, "Print job failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
                    self.to_string(),
                )
                    .into_response()
            }
            ServerError::Internal(err) => {
                tracing::error!(error = ?err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}

/// 处理器的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
