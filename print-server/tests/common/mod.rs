#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use label_printer::{JobStatus, PrintDriver, PrintError, PrintJob, PrintJobOutcome, PrintResult};
use lopdf::{Document, Object, dictionary};
use parking_lot::Mutex;
use print_server::{
    Config, MemoryAuditLog, PrintJobCoordinator, PrintSettings, ServerState,
};
use tempfile::TempDir;

pub const PT_PER_CM: f32 = 72.0 / 2.54;
pub const SEPARATOR_NAME: &str = "分割72.pdf";

/// One call to [`RecordingDriver::invoke`]
#[derive(Debug, Clone)]
pub struct Invocation {
    pub printer: String,
    pub document_name: String,
    pub copies: u32,
    pub offset_x_pt: f64,
    pub started: Instant,
    pub finished: Instant,
}

impl Invocation {
    pub fn overlaps(&self, other: &Invocation) -> bool {
        self.started < other.finished && other.started < self.finished
    }
}

/// Driver double that records every job instead of printing
#[derive(Default)]
pub struct RecordingDriver {
    pub invocations: Mutex<Vec<Invocation>>,
    /// Documents whose jobs exit with code 1
    pub failing_documents: Vec<String>,
    /// Simulated job duration
    pub delay: Duration,
    /// Report the driver as not installed
    pub missing: bool,
    /// Panic inside `invoke`
    pub panic: bool,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, document_name: &str) -> Self {
        self.failing_documents.push(document_name.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn missing(mut self) -> Self {
        self.missing = true;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic = true;
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }
}

#[async_trait]
impl PrintDriver for RecordingDriver {
    fn locate(&self, _override_path: Option<&Path>) -> PrintResult<PathBuf> {
        if self.missing {
            return Err(PrintError::DriverNotFound("gs".to_string()));
        }
        Ok(PathBuf::from("/opt/gs/bin/gs"))
    }

    async fn invoke(&self, _executable: &Path, job: &PrintJob<'_>) -> PrintJobOutcome {
        if self.panic {
            panic!("driver exploded");
        }

        let started = Instant::now();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let finished = Instant::now();

        self.invocations.lock().push(Invocation {
            printer: job.printer.to_string(),
            document_name: job.document_name.to_string(),
            copies: job.copies,
            offset_x_pt: job.plan.offset_x_pt,
            started,
            finished,
        });

        let failed = self
            .failing_documents
            .iter()
            .any(|name| name == job.document_name);

        PrintJobOutcome {
            status: if failed {
                JobStatus::Failed { exit_code: Some(1) }
            } else {
                JobStatus::Succeeded
            },
            diagnostic_text: if failed {
                "Error: /undefinedfilename".to_string()
            } else {
                String::new()
            },
            copies_requested: job.copies,
            document_name: job.document_name.to_string(),
        }
    }
}

/// Document and separator directories for one test
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("skus")).unwrap();
        std::fs::create_dir_all(dir.path().join("other")).unwrap();
        Self { dir }
    }

    pub fn document_root(&self) -> PathBuf {
        self.dir.path().join("skus")
    }

    pub fn separator_dir(&self) -> PathBuf {
        self.dir.path().join("other")
    }

    /// Add `<sku>.pdf` with a page of `width_cm` x `height_cm`
    pub fn add_sku(&self, sku: &str, width_cm: f32, height_cm: f32) -> PathBuf {
        let path = self.document_root().join(format!("{sku}.pdf"));
        write_pdf(&path, width_cm * PT_PER_CM, height_cm * PT_PER_CM);
        path
    }

    pub fn add_separator(&self) -> PathBuf {
        let path = self.separator_dir().join(SEPARATOR_NAME);
        write_pdf(&path, 7.0 * PT_PER_CM, 5.0 * PT_PER_CM);
        path
    }

    pub fn settings(&self, print_separator: bool) -> PrintSettings {
        PrintSettings {
            document_root_dir: Some(self.document_root()),
            separator_dir: Some(self.separator_dir()),
            separator_file_name: Some(SEPARATOR_NAME.to_string()),
            print_separator,
            driver_path: None,
        }
    }

    /// Server state wired to test doubles; settings are written to disk
    pub fn state(
        &self,
        driver: Arc<RecordingDriver>,
        audit: Arc<MemoryAuditLog>,
        print_separator: bool,
    ) -> ServerState {
        let work_dir = self.dir.path().join("work_dir");
        let config = Config::with_overrides(work_dir.to_string_lossy(), 0);
        self.settings(print_separator)
            .save(&config.printer_config_path)
            .unwrap();

        ServerState::new(
            config,
            driver,
            audit,
            Arc::new(label_printer::FixedPrinterLocator::new("Label-7x5")),
        )
    }
}

pub fn coordinator(driver: Arc<RecordingDriver>, audit: Arc<MemoryAuditLog>) -> PrintJobCoordinator {
    PrintJobCoordinator::new(driver, audit)
}

/// Write a single-page PDF with a MediaBox of `width_pt` x `height_pt`
pub fn write_pdf(path: &Path, width_pt: f32, height_pt: f32) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width_pt.into(), height_pt.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}
