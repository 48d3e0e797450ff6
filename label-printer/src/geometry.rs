//! Label medium geometry
//!
//! Every document is centered on a fixed 7 x 5 cm label. Device units are
//! PostScript points.

use serde::Serialize;

use crate::document::DocumentInfo;

/// Points per centimeter, as passed to the driver
pub const POINTS_PER_CM: f64 = 28.346;

/// Physical output rectangle, in centimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputMedium {
    pub width_cm: f64,
    pub height_cm: f64,
}

/// The label stock loaded in the printer
pub const LABEL_MEDIUM: OutputMedium = OutputMedium {
    width_cm: 7.0,
    height_cm: 5.0,
};

/// Device geometry for one driver invocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeometryPlan {
    pub medium_width_pt: f64,
    pub medium_height_pt: f64,
    /// Negative when the document is wider than the medium
    pub offset_x_pt: f64,
    pub offset_y_pt: f64,
}

/// Center `doc` on `medium`
///
/// Oversized documents overflow symmetrically; offsets are never clamped.
pub fn plan(doc: &DocumentInfo, medium: &OutputMedium) -> GeometryPlan {
    let medium_width_pt = medium.width_cm * POINTS_PER_CM;
    let medium_height_pt = medium.height_cm * POINTS_PER_CM;
    let doc_width_pt = doc.width_cm * POINTS_PER_CM;
    let doc_height_pt = doc.height_cm * POINTS_PER_CM;

    GeometryPlan {
        medium_width_pt,
        medium_height_pt,
        offset_x_pt: (medium_width_pt - doc_width_pt) / 2.0,
        offset_y_pt: (medium_height_pt - doc_height_pt) / 2.0,
    }
}
