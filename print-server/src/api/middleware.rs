//! HTTP 中间件
//!
//! - CORS 预检: 任意路径的 OPTIONS 直接返回 200
//! - 请求日志: 方法、路径、状态码、耗时
//! - panic 兜底: 转换为 500 `Server error: ...`

use std::any::Any;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use crate::core::ServerError;

pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "X-Requested-With, Content-Type";

/// Answer every OPTIONS request with permissive CORS headers
///
/// The print page runs on another origin and always preflights its POST.
pub async fn cors_preflight(req: Request, next: Next) -> Response {
    if req.method() != Method::OPTIONS {
        return next.run(req).await;
    }

    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}

/// 请求日志中间件
///
/// 记录请求 ID、方法、路径、状态码和耗时
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(request_id = %request_id, %method, path = %path, status = status.as_u16(), latency_ms, "Request failed");
    } else {
        info!(request_id = %request_id, %method, path = %path, status = status.as_u16(), latency_ms, "Request completed");
    }

    response
}

/// Convert a handler panic into the generic server error response
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    error!(panic = %message, "Handler panicked");
    ServerError::Internal(anyhow::anyhow!(message)).into_response()
}
