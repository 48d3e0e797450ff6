//! Print job coordinator
//!
//! One request runs: resolve → plan → locate driver → main job → separator.
//! The driver stage is serialized per printer: a physical device cannot
//! interleave two Ghostscript jobs. Once a job holds its printer it runs on
//! its own task, so a dropped caller cannot cut a print short.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use label_printer::{
    DocumentInfo, GeometryPlan, LABEL_MEDIUM, OutputMedium, PrintDriver, PrintJob, document,
    geometry,
};
use tokio::sync::Mutex;
use tracing::{Instrument, error, info, instrument, warn};

use super::types::{PrintRequest, SeparatorOutcome, SubmitError, SubmitReport};
use crate::audit::{AuditEntry, AuditStatus, JobAuditLog};
use crate::core::config::PrintSettings;

/// Orchestrates print requests against one or more printers
pub struct PrintJobCoordinator {
    driver: Arc<dyn PrintDriver>,
    audit: Arc<dyn JobAuditLog>,
    medium: OutputMedium,
    /// One lock per printer name, created on first use
    printer_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PrintJobCoordinator {
    pub fn new(driver: Arc<dyn PrintDriver>, audit: Arc<dyn JobAuditLog>) -> Self {
        Self {
            driver,
            audit,
            medium: LABEL_MEDIUM,
            printer_locks: DashMap::new(),
        }
    }

    pub fn driver(&self) -> &Arc<dyn PrintDriver> {
        &self.driver
    }

    fn printer_lock(&self, printer: &str) -> Arc<Mutex<()>> {
        self.printer_locks
            .entry(printer.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Print `request` on `printer`
    ///
    /// `Ok` means the main job succeeded; separator problems never turn it
    /// into an error.
    #[instrument(skip(self, settings), fields(sku = %request.sku, quantity = request.quantity))]
    pub async fn submit(
        &self,
        request: &PrintRequest,
        printer: &str,
        settings: &PrintSettings,
    ) -> Result<SubmitReport, SubmitError> {
        if request.quantity == 0 {
            warn!("Rejected: quantity must be greater than 0");
            return Err(SubmitError::InvalidQuantity);
        }

        let document = self.resolve_document(&request.sku, settings).await?;
        let plan = geometry::plan(&document, &self.medium);
        let executable = self.locate_driver(settings).await?;

        // Waiting for the printer may be abandoned; once the lock is held the
        // driver stage runs to completion even if the caller goes away.
        let guard = self.printer_lock(printer).lock_owned().await;

        let stage = DriverStage {
            driver: self.driver.clone(),
            audit: self.audit.clone(),
            executable,
            document,
            plan,
            copies: request.quantity,
            printer: printer.to_string(),
            settings: settings.clone(),
        };
        let handle = tokio::spawn(
            async move {
                let _guard = guard;
                stage.run().await
            }
            .in_current_span(),
        );

        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(SubmitError::Internal(format!("print task failed: {}", e))),
        }
    }

    async fn resolve_document(
        &self,
        sku: &str,
        settings: &PrintSettings,
    ) -> Result<DocumentInfo, SubmitError> {
        let sku = sku.to_string();
        let root = settings.document_root_dir.clone();

        tokio::task::spawn_blocking(move || document::resolve(&sku, root.as_deref()))
            .await
            .map_err(|e| SubmitError::Internal(format!("document task failed: {}", e)))?
            .map_err(|e| {
                warn!(error = %e, "Document resolution failed");
                SubmitError::Document(e)
            })
    }

    async fn locate_driver(&self, settings: &PrintSettings) -> Result<PathBuf, SubmitError> {
        let driver = self.driver.clone();
        let override_path = settings.driver_path.clone();

        tokio::task::spawn_blocking(move || driver.locate(override_path.as_deref()))
            .await
            .map_err(|e| SubmitError::Internal(format!("driver lookup task failed: {}", e)))?
            .map_err(|e| {
                error!(error = %e, "No print driver available, all printing is blocked");
                SubmitError::DriverNotFound(e)
            })
    }
}

/// Main job, audit and separator, run while the printer lock is held
///
/// Owns everything it touches so it can run on its own task.
struct DriverStage {
    driver: Arc<dyn PrintDriver>,
    audit: Arc<dyn JobAuditLog>,
    executable: PathBuf,
    document: DocumentInfo,
    plan: GeometryPlan,
    copies: u32,
    printer: String,
    settings: PrintSettings,
}

impl DriverStage {
    async fn run(self) -> Result<SubmitReport, SubmitError> {
        let document = &self.document;
        let printer = self.printer.as_str();

        let main = self
            .driver
            .invoke(
                &self.executable,
                &PrintJob {
                    document: &document.resolved_path,
                    document_name: &document.display_name,
                    printer,
                    plan: self.plan,
                    copies: self.copies,
                },
            )
            .await;

        if !main.succeeded() {
            error!(
                document = %document.display_name,
                status = ?main.status,
                diagnostic = %main.diagnostic_text,
                "Main print job failed, separator skipped"
            );
            return Err(SubmitError::DriverFailed(main));
        }

        info!(
            document = %document.display_name,
            copies = self.copies,
            printer,
            "Print job submitted"
        );
        self.audit.record(AuditEntry::now(
            &document.display_name,
            self.copies,
            printer,
            AuditStatus::Printed,
        ));

        let separator = self.print_separator().await;

        Ok(SubmitReport {
            document: self.document,
            printer: self.printer,
            plan: self.plan,
            main,
            separator,
        })
    }

    /// Single-copy separator sheet after a successful main job
    ///
    /// Runs under the same printer lock and reuses the main job's plan.
    async fn print_separator(&self) -> SeparatorOutcome {
        let settings = &self.settings;
        let printer = self.printer.as_str();
        if !settings.print_separator {
            return SeparatorOutcome::Disabled;
        }

        let (Some(path), Some(name)) = (
            settings.separator_path(),
            settings.separator_file_name.as_deref(),
        ) else {
            warn!("Separator printing enabled but directory or file name is not set, skipping");
            return SeparatorOutcome::NotConfigured;
        };

        if !path.is_file() {
            warn!(path = %path.display(), "Separator document not found, skipping");
            return SeparatorOutcome::Missing { path };
        }

        let outcome = self
            .driver
            .invoke(
                &self.executable,
                &PrintJob {
                    document: &path,
                    document_name: name,
                    printer,
                    plan: self.plan,
                    copies: 1,
                },
            )
            .await;

        if outcome.succeeded() {
            info!(separator = name, "Separator printed");
            self.audit.record(AuditEntry::now(
                name,
                1,
                printer,
                AuditStatus::SeparatorPrinted,
            ));
            SeparatorOutcome::Printed { outcome }
        } else {
            warn!(
                separator = name,
                status = ?outcome.status,
                diagnostic = %outcome.diagnostic_text,
                "Separator print failed"
            );
            SeparatorOutcome::Failed { outcome }
        }
    }
}
