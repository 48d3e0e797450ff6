//! # label-printer
//!
//! PDF label printing through Ghostscript - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - SKU → PDF resolution and first-page measurement
//! - Centering a document on the 7 x 5 cm label medium
//! - Locating and invoking Ghostscript (`mswinpr2` device)
//! - Default printer discovery
//!
//! WHEN to print (locking, separator sheets, audit) stays in `print-server`.
//!
//! ## Example
//!
//! ```ignore
//! use label_printer::{GhostscriptDriver, LABEL_MEDIUM, PrintDriver, PrintJob, document, geometry};
//!
//! let info = document::resolve("ABC123", Some(Path::new("C:/labels")))?;
//! let plan = geometry::plan(&info, &LABEL_MEDIUM);
//!
//! let driver = GhostscriptDriver::new().with_timeout(Some(Duration::from_secs(120)));
//! let exe = driver.locate(None)?;
//! let outcome = driver
//!     .invoke(&exe, &PrintJob {
//!         document: &info.resolved_path,
//!         document_name: &info.display_name,
//!         printer: "Label Printer",
//!         plan,
//!         copies: 2,
//!     })
//!     .await;
//! ```

pub mod document;
pub mod driver;
mod error;
pub mod geometry;
mod printer;

// Re-exports
pub use document::DocumentInfo;
pub use driver::{
    DriverLocator, GhostscriptDriver, JobStatus, PrintDriver, PrintJob, PrintJobOutcome,
    spawn_hidden,
};
pub use error::{PrintError, PrintResult};
pub use geometry::{GeometryPlan, LABEL_MEDIUM, OutputMedium};
pub use printer::{FixedPrinterLocator, PrinterLocator, SystemPrinterLocator};

#[cfg(windows)]
pub use printer::WindowsPrinter;
