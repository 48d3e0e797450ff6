//! SKU → PDF resolution and page measurement
//!
//! A SKU maps to `<document_root>/<SKU>.pdf`. The first page's visible box is
//! measured in points and reported in centimeters.

use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::{PrintError, PrintResult};

/// File extension every SKU document carries
pub const DOCUMENT_EXTENSION: &str = ".pdf";

/// Centimeters per PDF point (1 pt = 1/72 in, 1 in = 2.54 cm)
pub const CM_PER_POINT: f64 = 2.54 / 72.0;

/// Parent chain guard for malformed page trees
const MAX_TREE_DEPTH: usize = 32;

/// Resolved document and its first-page geometry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub resolved_path: PathBuf,
    pub display_name: String,
    pub width_cm: f64,
    pub height_cm: f64,
    /// Informational only; never used to rotate or swap dimensions
    pub is_landscape: bool,
}

/// Map a SKU to its document file name
///
/// Appends `.pdf` unless the SKU already ends with it (case-insensitive).
/// Separators, drive prefixes (`C:foo`) and `..` are rejected so the file
/// stays directly under the document root.
pub fn document_file_name(sku: &str) -> PrintResult<String> {
    let sku = sku.trim();
    if sku.is_empty()
        || sku == "."
        || sku.starts_with("..")
        || sku.contains(|c| c == '/' || c == '\\' || c == ':')
    {
        return Err(PrintError::InvalidSku(sku.to_string()));
    }

    if sku.to_ascii_lowercase().ends_with(DOCUMENT_EXTENSION) {
        Ok(sku.to_string())
    } else {
        Ok(format!("{}{}", sku, DOCUMENT_EXTENSION))
    }
}

/// Resolve a SKU under `document_root` and measure its first page
///
/// Blocking: parses the PDF. Run it on a blocking thread from async code.
#[instrument(skip(document_root), fields(root = ?document_root))]
pub fn resolve(sku: &str, document_root: Option<&Path>) -> PrintResult<DocumentInfo> {
    let root = document_root
        .ok_or_else(|| PrintError::NotFound("document root directory is not configured".into()))?;

    if !root.is_dir() {
        warn!(root = %root.display(), "Document root is not a directory");
        return Err(PrintError::NotFound(format!(
            "document root is not a directory: {}",
            root.display()
        )));
    }

    let file_name = document_file_name(sku)?;
    let path = root.join(&file_name);
    if path.parent() != Some(root) {
        return Err(PrintError::InvalidSku(sku.to_string()));
    }
    if !path.is_file() {
        warn!(path = %path.display(), "Document not found");
        return Err(PrintError::NotFound(format!(
            "document not found: {}",
            path.display()
        )));
    }

    let (width_pt, height_pt) = measure_first_page(&path)?;
    let width_cm = round2(width_pt * CM_PER_POINT);
    let height_cm = round2(height_pt * CM_PER_POINT);

    if width_cm <= 0.0 || height_cm <= 0.0 {
        return Err(PrintError::invalid_document(
            &path,
            format!("degenerate page size {}x{} cm", width_cm, height_cm),
        ));
    }

    debug!(width_cm, height_cm, "Document measured");

    Ok(DocumentInfo {
        resolved_path: path,
        display_name: file_name,
        width_cm,
        height_cm,
        is_landscape: width_cm > height_cm,
    })
}

/// Visible size of the first page in points
///
/// Uses CropBox when present, else MediaBox (both inheritable), and swaps the
/// axes for pages rotated by 90 or 270 degrees.
pub fn measure_first_page(path: &Path) -> PrintResult<(f64, f64)> {
    let doc = Document::load(path)
        .map_err(|e| PrintError::invalid_document(path, format!("cannot parse PDF: {}", e)))?;

    let page_id = doc
        .get_pages()
        .into_values()
        .next()
        .ok_or_else(|| PrintError::invalid_document(path, "document has no pages"))?;

    let rect = inherited(&doc, page_id, b"CropBox")
        .and_then(|obj| rectangle(&doc, obj))
        .or_else(|| inherited(&doc, page_id, b"MediaBox").and_then(|obj| rectangle(&doc, obj)))
        .ok_or_else(|| PrintError::invalid_document(path, "first page has no bounding box"))?;

    let (llx, lly, urx, ury) = rect;
    let width = (urx - llx).abs();
    let height = (ury - lly).abs();

    let rotate = inherited(&doc, page_id, b"Rotate")
        .and_then(|obj| number(&doc, obj))
        .map(|r| (r as i64).rem_euclid(360))
        .unwrap_or(0);

    if rotate == 90 || rotate == 270 {
        Ok((height, width))
    } else {
        Ok((width, height))
    }
}

/// Look up a page attribute, following the `Parent` chain for inherited keys
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = Some(page_id);
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_object(current?).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

fn resolve_ref<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn number(doc: &Document, obj: &Object) -> Option<f64> {
    match resolve_ref(doc, obj)? {
        Object::Integer(v) => Some(*v as f64),
        Object::Real(v) => Some(f64::from(*v)),
        _ => None,
    }
}

fn rectangle(doc: &Document, obj: &Object) -> Option<(f64, f64, f64, f64)> {
    let values = resolve_ref(doc, obj)?.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut coords = values.iter().map(|v| number(doc, v));
    Some((coords.next()??, coords.next()??, coords.next()??, coords.next()??))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
