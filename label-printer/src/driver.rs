//! Ghostscript print driver
//!
//! Rasterizes a PDF straight to a Windows printer queue through the
//! `mswinpr2` device:
//!
//! ```text
//! gswin64c -dNOPAUSE -dBATCH -dSAFER -sDEVICE=mswinpr2
//!          -sOutputFile=%printer%<name> -dNumCopies=<n>
//!          -dDEVICEWIDTHPOINTS=<w> -dDEVICEHEIGHTPOINTS=<h>
//!          -c "<< /PageOffset [<x> <y>] ... >> setpagedevice" -f <document>
//! ```
//!
//! The argument vector is handed to the OS as-is; nothing goes through a shell.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Command;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{PrintError, PrintResult};
use crate::geometry::GeometryPlan;

/// Win32 `CREATE_NO_WINDOW` process creation flag
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Well-known Ghostscript install locations, checked in order
pub const DEFAULT_DRIVER_PATHS: &[&str] = &[
    r"C:\Program Files\gs\gs10.04.0\bin\gswin64c.exe",
    r"C:\Program Files (x86)\gs\gs10.04.0\bin\gswin32c.exe",
    r"C:\Program Files\gs\gs10.03.1\bin\gswin64c.exe",
    r"C:\Program Files (x86)\gs\gs10.03.1\bin\gswin32c.exe",
];

#[cfg(windows)]
const LOOKUP_TOOL: &str = "where";
#[cfg(windows)]
const LOOKUP_NAMES: &[&str] = &["gswin64c.exe", "gswin32c.exe"];

#[cfg(not(windows))]
const LOOKUP_TOOL: &str = "which";
#[cfg(not(windows))]
const LOOKUP_NAMES: &[&str] = &["gs", "gsc"];

/// Finds the Ghostscript executable
#[derive(Debug, Clone)]
pub struct DriverLocator {
    candidates: Vec<PathBuf>,
    lookup_tool: String,
    lookup_names: Vec<String>,
}

impl DriverLocator {
    /// Create a locator with custom candidate paths and lookup names
    pub fn new(candidates: Vec<PathBuf>, lookup_names: Vec<String>) -> Self {
        Self {
            candidates,
            lookup_tool: LOOKUP_TOOL.to_string(),
            lookup_names,
        }
    }

    /// Resolve the driver executable
    ///
    /// An explicit override is authoritative: if it does not exist the lookup
    /// fails rather than falling back.
    pub fn locate(&self, override_path: Option<&Path>) -> PrintResult<PathBuf> {
        if let Some(path) = override_path {
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            return Err(PrintError::DriverNotFound(format!(
                "configured driver path does not exist: {}",
                path.display()
            )));
        }

        if let Some(found) = self.candidates.iter().find(|p| p.is_file()) {
            return Ok(found.clone());
        }

        for name in &self.lookup_names {
            if let Some(found) = self.lookup(name) {
                return Ok(found);
            }
        }

        Err(PrintError::DriverNotFound(
            "Ghostscript is not installed in any known location or on PATH".to_string(),
        ))
    }

    /// Ask the OS executable locator for `name`; first existing hit wins
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        let mut cmd = std::process::Command::new(&self.lookup_tool);
        cmd.arg(name).stdin(Stdio::null()).stderr(Stdio::null());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) => {
                debug!(tool = %self.lookup_tool, error = %e, "Executable lookup unavailable");
                return None;
            }
        };

        if !output.status.success() {
            return None;
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .find(|p| p.is_file())
    }
}

impl Default for DriverLocator {
    fn default() -> Self {
        Self::new(
            DEFAULT_DRIVER_PATHS.iter().map(PathBuf::from).collect(),
            LOOKUP_NAMES.iter().map(|s| s.to_string()).collect(),
        )
    }
}

/// One document sent to one printer
#[derive(Debug, Clone)]
pub struct PrintJob<'a> {
    pub document: &'a Path,
    pub document_name: &'a str,
    pub printer: &'a str,
    pub plan: GeometryPlan,
    pub copies: u32,
}

impl PrintJob<'_> {
    /// Ghostscript arguments, excluding the executable itself
    pub fn driver_args(&self) -> Vec<OsString> {
        let plan = &self.plan;
        let mut args: Vec<OsString> = [
            "-dNOPAUSE".to_string(),
            "-dBATCH".to_string(),
            "-dSAFER".to_string(),
            "-sDEVICE=mswinpr2".to_string(),
            format!("-sOutputFile=%printer%{}", self.printer),
            format!("-dNumCopies={}", self.copies),
            format!("-dDEVICEWIDTHPOINTS={}", plan.medium_width_pt),
            format!("-dDEVICEHEIGHTPOINTS={}", plan.medium_height_pt),
            "-c".to_string(),
            format!(
                "<< /PageOffset [{} {}] /BeginPage {{ 1.0 dup scale }}  >> setpagedevice",
                plan.offset_x_pt, plan.offset_y_pt
            ),
            "-f".to_string(),
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(self.document.as_os_str().to_os_string());
        args
    }
}

/// How a driver invocation ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobStatus {
    Succeeded,
    /// Non-zero exit; `None` when the process was terminated by a signal
    Failed { exit_code: Option<i32> },
    TimedOut,
    SpawnFailed,
}

/// Result of one driver invocation
#[derive(Debug, Clone, Serialize)]
pub struct PrintJobOutcome {
    pub status: JobStatus,
    pub diagnostic_text: String,
    pub copies_requested: u32,
    pub document_name: String,
}

impl PrintJobOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == JobStatus::Succeeded
    }
}

/// Captured output of a finished child process
#[derive(Debug)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Why a child process produced no [`ProcessOutput`]
#[derive(Debug)]
pub enum SpawnFailure {
    TimedOut(Duration),
    Io(std::io::Error),
}

/// Run `program` without a console window and wait for it
///
/// The child is killed if `timeout` elapses first.
pub async fn spawn_hidden(
    program: &Path,
    args: &[OsString],
    timeout: Option<Duration>,
) -> Result<ProcessOutput, SpawnFailure> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(windows)]
    cmd.creation_flags(CREATE_NO_WINDOW);

    let child = cmd.spawn().map_err(SpawnFailure::Io)?;
    let wait = child.wait_with_output();

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, wait)
            .await
            .map_err(|_| SpawnFailure::TimedOut(limit))?,
        None => wait.await,
    }
    .map_err(SpawnFailure::Io)?;

    Ok(ProcessOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Seam between the job coordinator and the external driver
#[async_trait]
pub trait PrintDriver: Send + Sync {
    /// Resolve the driver executable
    fn locate(&self, override_path: Option<&Path>) -> PrintResult<PathBuf>;

    /// Run one job to completion; failures are reported in the outcome
    async fn invoke(&self, executable: &Path, job: &PrintJob<'_>) -> PrintJobOutcome;
}

/// Ghostscript-backed driver
#[derive(Debug, Clone)]
pub struct GhostscriptDriver {
    locator: DriverLocator,
    timeout: Option<Duration>,
}

impl GhostscriptDriver {
    /// Driver with the default locator and no timeout
    pub fn new() -> Self {
        Self {
            locator: DriverLocator::default(),
            timeout: None,
        }
    }

    /// Bound each invocation; `None` waits indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_locator(mut self, locator: DriverLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for GhostscriptDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrintDriver for GhostscriptDriver {
    fn locate(&self, override_path: Option<&Path>) -> PrintResult<PathBuf> {
        self.locator.locate(override_path)
    }

    #[instrument(skip(self, job), fields(
        document = %job.document_name,
        printer = %job.printer,
        copies = job.copies,
    ))]
    async fn invoke(&self, executable: &Path, job: &PrintJob<'_>) -> PrintJobOutcome {
        let args = job.driver_args();
        debug!(driver = %executable.display(), ?args, "Invoking print driver");

        let outcome = |status, diagnostic_text| PrintJobOutcome {
            status,
            diagnostic_text,
            copies_requested: job.copies,
            document_name: job.document_name.to_string(),
        };

        match spawn_hidden(executable, &args, self.timeout).await {
            Ok(output) if output.exit_code == Some(0) => {
                info!("Print driver finished");
                outcome(JobStatus::Succeeded, output.stderr)
            }
            Ok(output) => {
                warn!(exit_code = ?output.exit_code, stderr = %output.stderr, "Print driver failed");
                let diagnostic = [output.stderr, output.stdout]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n");
                outcome(
                    JobStatus::Failed {
                        exit_code: output.exit_code,
                    },
                    diagnostic,
                )
            }
            Err(SpawnFailure::TimedOut(limit)) => {
                error!(timeout_secs = limit.as_secs_f64(), "Print driver timed out, killed");
                outcome(
                    JobStatus::TimedOut,
                    format!("driver did not finish within {:?}", limit),
                )
            }
            Err(SpawnFailure::Io(e)) => {
                error!(driver = %executable.display(), error = %e, "Failed to start print driver");
                outcome(
                    JobStatus::SpawnFailed,
                    format!("failed to start {}: {}", executable.display(), e),
                )
            }
        }
    }
}
