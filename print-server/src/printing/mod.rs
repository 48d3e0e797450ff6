//! SKU Label Printing Module
//!
//! This module turns a print request into Ghostscript jobs:
//! - Main job: the SKU document, `quantity` copies
//! - Separator job: optional single divider sheet after a successful main job

pub mod coordinator;
pub mod types;

pub use coordinator::PrintJobCoordinator;
pub use types::{PrintRequest, SeparatorOutcome, SubmitError, SubmitReport};
