//! CLI output formatting.
//!
//! # Information-First Display
//!
//! A lot is identified by its token and slug; file paths are shown as
//! indented context lines underneath. Warnings (no raster tool, missing page
//! directory) appear in the same tree, not on stderr, so the run reads as
//! one inventory.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! LM0001 → mercurey_champs_martin_1er_cru_red_2024_lm0001
//!     QR: labels/QRCODE_mercurey_champs_martin_1er_cru_red_2024_lm0001.png
//!     URL: https://vins.example.com/mercurey_champs_martin_1er_cru_red_2024_lm0001.html
//!     Label: magick (5 steps)
//!     Page: pages/mercurey_champs_martin_1er_cru_red_2024_lm0001.html
//!     Logo: copied to pages/
//! ```
//!
//! ## Invalid attributes
//!
//! ```text
//! Invalid wine attributes
//!     unknown appellation 'chablis'
//!
//! Valid values
//!     appellation: mercurey, rully, bourgogne
//!     color: red, white
//!     cru: village, 1er cru, grand cru, -
//!     climat: Champs Martin, Fromange, -
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::pipeline::{GenerationReport, PipelineEvent, Preview};
use crate::vocabulary::{InvalidAttributes, SENTINEL, vocabulary_listing};
use std::path::Path;
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Progress printer thread panicked")]
    PrinterPanicked,
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Lot header: token, arrow, slug.
fn lot_header(lot: &impl std::fmt::Display, slug: &impl std::fmt::Display) -> String {
    format!("{} \u{2192} {}", lot, slug)
}

/// Directory display with a trailing slash.
fn dir_display(dir: &Path) -> String {
    let shown = dir.display().to_string();
    if shown.ends_with('/') {
        shown
    } else {
        format!("{}/", shown)
    }
}

// ============================================================================
// Vocabulary
// ============================================================================

/// One line per vocabulary, canonical spellings in listing order.
pub fn format_vocabulary() -> Vec<String> {
    vocabulary_listing()
        .into_iter()
        .map(|(name, labels)| format!("{}: {}", name, labels.join(", ")))
        .collect()
}

pub fn print_vocabulary() {
    for line in format_vocabulary() {
        println!("{}", line);
    }
}

/// The validation failure listing: every problem, then every valid value.
pub fn format_invalid_attributes(invalid: &InvalidAttributes) -> Vec<String> {
    let mut lines = vec!["Invalid wine attributes".to_string()];
    for problem in &invalid.problems {
        lines.push(format!("{}{}", indent(1), problem));
    }
    lines.push(String::new());
    lines.push("Valid values".to_string());
    for line in format_vocabulary() {
        lines.push(format!("{}{}", indent(1), line));
    }
    lines.push(format!(
        "{}('{}' means not applicable; climat and cru default to it)",
        indent(1),
        SENTINEL
    ));
    lines
}

pub fn print_invalid_attributes(invalid: &InvalidAttributes) {
    for line in format_invalid_attributes(invalid) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format a single pipeline progress event as display lines.
pub fn format_pipeline_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::LotReserved { lot, slug } => vec![lot_header(lot, slug)],
        PipelineEvent::QrWritten { path, url } => vec![
            format!("{}QR: {}", indent(1), path.display()),
            format!("{}URL: {}", indent(1), url),
        ],
        PipelineEvent::Annotated { tool, steps } => {
            vec![format!("{}Label: {} ({} steps)", indent(1), tool, steps)]
        }
        PipelineEvent::AnnotationSkipped => vec![format!(
            "{}Label: not annotated (no raster tool found)",
            indent(1)
        )],
        PipelineEvent::PageWritten { path, logo_copied } => {
            let mut lines = vec![format!("{}Page: {}", indent(1), path.display())];
            if *logo_copied {
                let dir = path.parent().unwrap_or(Path::new(""));
                lines.push(format!("{}Logo: copied to {}", indent(1), dir_display(dir)));
            }
            lines
        }
        PipelineEvent::PageSkipped { dir } => vec![format!(
            "{}Page: skipped, {} does not exist",
            indent(1),
            dir_display(dir)
        )],
    }
}

/// Prints pipeline events on a background thread as they arrive.
pub struct EventPrinter {
    handle: JoinHandle<()>,
}

impl EventPrinter {
    /// Print every event from `rx` to stdout until the sender is dropped.
    pub fn spawn(rx: Receiver<PipelineEvent>) -> Self {
        Self::spawn_with(rx, |line| println!("{}", line))
    }

    /// Like [`EventPrinter::spawn`], handing each formatted line to `sink`.
    pub fn spawn_with<F>(rx: Receiver<PipelineEvent>, mut sink: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        let handle = thread::spawn(move || {
            for event in rx {
                for line in format_pipeline_event(&event) {
                    sink(line);
                }
            }
        });
        Self { handle }
    }

    /// Wait for the remaining events to be printed.
    pub fn finish(self) -> Result<(), OutputError> {
        self.handle.join().map_err(|_| OutputError::PrinterPanicked)
    }
}

/// Closing summary after a generation.
pub fn format_generation_summary(report: &GenerationReport) -> Vec<String> {
    vec![format!("Generated lot {} for {}", report.lot, report.url)]
}

pub fn print_generation_summary(report: &GenerationReport) {
    for line in format_generation_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// What `check` would produce, in the same shape as a generation.
pub fn format_preview(preview: &Preview) -> Vec<String> {
    let attrs = &preview.attributes;
    vec![
        lot_header(&preview.lot, &preview.slug),
        format!("{}QR: {}", indent(1), preview.qr_filename),
        format!("{}URL: {}", indent(1), preview.url),
        format!("{}Page: {}", indent(1), preview.page_filename),
        format!("{}Energy: {}", indent(1), attrs.energy),
    ]
}

pub fn print_preview(preview: &Preview) {
    for line in format_preview(preview) {
        println!("{}", line);
    }
}
