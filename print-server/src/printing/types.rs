//! Print request and submission result types

use std::path::PathBuf;

use label_printer::{DocumentInfo, GeometryPlan, PrintError, PrintJobOutcome};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// One inbound print request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintRequest {
    pub sku: String,
    pub quantity: u32,
}

impl PrintRequest {
    pub fn new(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            quantity,
        }
    }

    /// Validate a `{ "sku": string, "quantity": integer }` body
    ///
    /// `sku` must be a non-empty string, `quantity` a positive integer.
    pub fn from_json(body: &Value) -> Result<Self, String> {
        let sku = body
            .get("sku")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|sku| !sku.is_empty())
            .ok_or("missing or empty sku")?;

        let quantity = body
            .get("quantity")
            .and_then(Value::as_u64)
            .filter(|q| *q > 0)
            .ok_or("missing or non-positive quantity")?;
        let quantity = u32::try_from(quantity).map_err(|_| "quantity out of range")?;

        Ok(Self::new(sku, quantity))
    }
}

/// What happened to the separator sheet after a successful main job
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SeparatorOutcome {
    Disabled,
    /// Directory or file name missing from the settings
    NotConfigured,
    Missing { path: PathBuf },
    Printed { outcome: PrintJobOutcome },
    /// Logged as a warning; the request still succeeds
    Failed { outcome: PrintJobOutcome },
}

/// Successful submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReport {
    pub document: DocumentInfo,
    pub printer: String,
    pub plan: GeometryPlan,
    pub main: PrintJobOutcome,
    pub separator: SeparatorOutcome,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("quantity must be greater than 0")]
    InvalidQuantity,

    /// Document root / file missing, bad SKU, or unreadable PDF
    #[error("{0}")]
    Document(#[source] PrintError),

    #[error("{0}")]
    DriverNotFound(#[source] PrintError),

    #[error("print driver failed for {}: {:?} {}", .0.document_name, .0.status, .0.diagnostic_text)]
    DriverFailed(PrintJobOutcome),

    #[error("internal error: {0}")]
    Internal(String),
}
