//! Print API Handlers

use anyhow::Context;
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::Value;

use crate::audit::AuditEntry;
use crate::core::{Result, ServerError, ServerState};
use crate::printing::PrintRequest;

const DEFAULT_LOG_LIMIT: usize = 100;
const MAX_LOG_LIMIT: usize = 1000;

/// POST /print - 提交打印任务
///
/// Body: `{ "sku": "ABC123", "quantity": 2 }`. The body is read as raw
/// bytes so that malformed JSON maps to a server error rather than axum's
/// own rejection.
pub async fn submit(State(state): State<ServerState>, body: Bytes) -> Result<impl IntoResponse> {
    let body: Value = serde_json::from_slice(&body).context("invalid JSON body")?;
    let request = PrintRequest::from_json(&body).map_err(ServerError::Validation)?;

    let printers = state.printers.clone();
    let printer = tokio::task::spawn_blocking(move || printers.default_printer())
        .await
        .context("printer lookup task failed")?
        .context("no printer available")?;

    let settings = state
        .print_settings()
        .context("failed to load print settings")?;

    let report = state
        .coordinator
        .submit(&request, &printer, &settings)
        .await?;

    tracing::debug!(
        document = %report.document.display_name,
        printer = %report.printer,
        separator = ?report.separator,
        "Print request completed"
    );

    Ok((
        StatusCode::OK,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        "Print job submitted",
    ))
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub limit: Option<usize>,
}

/// GET /print/log - 最近的打印记录 (旧的在前)
pub async fn recent_log(
    State(state): State<ServerState>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Vec<AuditEntry>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).min(MAX_LOG_LIMIT);
    let entries = state
        .audit
        .recent(limit)
        .context("failed to read print log")?;
    Ok(Json(entries))
}
