//! High-level label operations.
//!
//! [`plan_annotation`] turns the overlay config and a lot's energy value into
//! the ordered list of edits; [`annotate`] runs them against a backend.

use super::backend::{BackendError, RasterBackend};
use super::params::{Gravity, RasterOp};
use crate::config::AnnotationConfig;
use crate::vocabulary::Energy;
use serde::Serialize;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// What happened to the QR image after it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnnotationOutcome {
    /// All operations ran through `tool`.
    Applied { tool: String, steps: usize },
    /// No raster tool was found; the image is unlabeled but scannable.
    Skipped,
}

/// The footer text, `E(100ml)=312kJ/75kcal`.
pub fn energy_label(energy: &Energy) -> String {
    format!("E(100ml)={}", energy.compact())
}

/// The five overlay edits, in the order they must run.
///
/// 1. white band on top
/// 2. header title
/// 3. header subtitle
/// 4. white band on the bottom
/// 5. energy label
pub fn plan_annotation(energy: &Energy, config: &AnnotationConfig) -> Vec<RasterOp> {
    vec![
        RasterOp::Splice {
            gravity: Gravity::North,
            pixels: config.header_band,
        },
        RasterOp::Annotate {
            gravity: Gravity::North,
            offset: config.title_offset,
            point_size: config.header_point_size,
            text: config.header_title.clone(),
        },
        RasterOp::Annotate {
            gravity: Gravity::North,
            offset: config.subtitle_offset,
            point_size: config.header_point_size,
            text: config.header_subtitle.clone(),
        },
        RasterOp::Splice {
            gravity: Gravity::South,
            pixels: config.footer_band,
        },
        RasterOp::Annotate {
            gravity: Gravity::South,
            offset: config.footer_offset,
            point_size: config.footer_point_size,
            text: energy_label(energy),
        },
    ]
}

/// Apply `ops` to `image` in order.
///
/// Skips everything when the backend has no tool. A failing step stops the
/// sequence and leaves the earlier edits in place.
pub fn annotate(
    backend: &dyn RasterBackend,
    image: &Path,
    ops: &[RasterOp],
) -> Result<AnnotationOutcome> {
    let Some(tool) = backend.tool() else {
        return Ok(AnnotationOutcome::Skipped);
    };
    for op in ops {
        backend.apply(image, op)?;
    }
    Ok(AnnotationOutcome::Applied {
        tool: tool.to_string(),
        steps: ops.len(),
    })
}
