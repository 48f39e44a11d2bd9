//! Product page rendering.
//!
//! Each lot gets one static page, `<output_dir>/<slug>.html`, showing the
//! wine's attributes and its energy value. When the organic logo is enabled
//! the page also shows `organic-logo.png`, which lives next to the pages and
//! is copied there the first time a page needs it.
//!
//! ## Output Structure
//!
//! ```text
//! pages/
//! ├── organic-logo.png                                   # copied once
//! ├── mercurey_champs_martin_1er_cru_red_2024_lm0001.html
//! └── bourgogne_white_2022_lm0002.html
//! ```
//!
//! The output directory is never created here. When it is missing the page
//! is skipped and the caller reports it; the QR image is unaffected.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) with the stylesheet and logo
//! embedded at compile time, so the binary ships no template files.

use crate::lot::LotToken;
use crate::naming::Slug;
use crate::vocabulary::{Climat, Cru, Vocabulary, WineAttributes};
use maud::{DOCTYPE, Markup, html};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const LOGO_FILENAME: &str = "organic-logo.png";

const LOGO_PNG: &[u8] = include_bytes!("../static/organic-logo.png");
const CSS: &str = include_str!("../static/page.css");

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// What happened to the product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    Written { path: PathBuf, logo_copied: bool },
    /// The output directory does not exist.
    Skipped { dir: PathBuf },
}

/// Copy the packaged logo into `dir` unless a file of that name exists.
///
/// Returns whether a copy was made. Uses create-new semantics, so two
/// concurrent first renders cannot both write it.
pub fn ensure_logo(dir: &Path) -> Result<bool, RenderError> {
    let path = dir.join(LOGO_FILENAME);
    match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut file) => {
            file.write_all(LOGO_PNG)?;
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Write the page for one lot into `output_dir`.
pub fn write_page(
    output_dir: &Path,
    attrs: &WineAttributes,
    slug: &Slug,
    lot: &LotToken,
    organic_logo: bool,
) -> Result<PageOutcome, RenderError> {
    if !output_dir.is_dir() {
        return Ok(PageOutcome::Skipped {
            dir: output_dir.to_path_buf(),
        });
    }

    let logo_copied = if organic_logo {
        ensure_logo(output_dir)?
    } else {
        false
    };
    let has_logo = organic_logo && output_dir.join(LOGO_FILENAME).is_file();

    let page = render_page(attrs, lot, has_logo);
    let path = output_dir.join(slug.page_filename());
    fs::write(&path, page.into_string())?;
    Ok(PageOutcome::Written { path, logo_copied })
}

// ============================================================================
// HTML Components
// ============================================================================

/// Heading: appellation, then climat and cru when they apply.
fn page_title(attrs: &WineAttributes) -> String {
    let mut parts = vec![attrs.appellation.title()];
    if attrs.climat != Climat::NotApplicable {
        parts.push(attrs.climat.label());
    }
    if attrs.cru != Cru::NotApplicable {
        parts.push(attrs.cru.label());
    }
    parts.join(" ")
}

fn or_not_applicable(label: &str) -> &str {
    if label == crate::vocabulary::SENTINEL {
        "n/a"
    } else {
        label
    }
}

/// Renders the complete product page.
pub fn render_page(attrs: &WineAttributes, lot: &LotToken, has_logo: bool) -> Markup {
    let title = page_title(attrs);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " " (attrs.year) }
                style { (CSS) }
            }
            body {
                main.wine-page {
                    header.wine-header {
                        h1 { (title) }
                        span.vintage { (attrs.year) }
                    }
                    dl.attributes {
                        dt { "Vintage" }
                        dd { (attrs.year) }
                        dt { "Appellation" }
                        dd { (attrs.appellation.title()) }
                        dt { "Color" }
                        dd { (attrs.color) }
                        dt { "Climat" }
                        dd { (or_not_applicable(attrs.climat.label())) }
                        dt { "Cru" }
                        dd { (or_not_applicable(attrs.cru.label())) }
                    }
                    section.nutrition {
                        h2 { "Ingredient & Nutrition" }
                        p.energy { "Energy (100 ml): " (attrs.energy) }
                    }
                    @if has_logo {
                        div.organic {
                            img src=(LOGO_FILENAME) alt="Organic certification";
                        }
                    }
                    footer.lot { "Lot " (lot) }
                }
            }
        }
    }
}
