//! Slug construction and artifact filename conventions.
//!
//! A lot's artifacts share one slug, built from the attributes in a fixed
//! order:
//!
//! ```text
//! appellation _ climat _ cru _ color _ year _ lot
//! mercurey   _ Champs Martin _ 1er cru _ red _ 2024 _ LM0001
//!   → mercurey_champs_martin_1er_cru_red_2024_lm0001
//! ```
//!
//! Every run of non-alphanumeric characters (the explicit `_` delimiters,
//! spaces inside `Champs Martin`, the `-` sentinel) collapses to a single
//! underscore and the result is lowercased. The slug is then used verbatim
//! as:
//!
//! - the QR image filename: `QRCODE_<slug>.png`
//! - the page filename and URL path: `<slug>.html`
//!
//! Build it once per run. Recomputing after another lot has been reserved
//! gives a different slug.

use crate::lot::LotToken;
use crate::vocabulary::{Vocabulary, WineAttributes};
use serde::Serialize;
use std::fmt;

/// Fixed prefix on every generated QR image.
pub const QR_PREFIX: &str = "QRCODE_";
pub const QR_EXTENSION: &str = ".png";

/// Canonical lowercase token shared by a lot's image, page and URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn build(attrs: &WineAttributes, lot: &LotToken) -> Self {
        let year = attrs.year.to_string();
        let lot = lot.to_string();
        Self(slugify(&[
            attrs.appellation.label(),
            attrs.climat.label(),
            attrs.cru.label(),
            attrs.color.label(),
            year.as_str(),
            lot.as_str(),
        ]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `QRCODE_<slug>.png`
    pub fn qr_filename(&self) -> String {
        format!("{QR_PREFIX}{}{QR_EXTENSION}", self.0)
    }

    /// `<slug>.html`, re-normalized so a hand-built slug still lands on a
    /// safe filename.
    pub fn page_filename(&self) -> String {
        format!("{}.html", slugify(&[self.0.as_str()]))
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Join `parts` with underscores, collapse non-alphanumeric runs to one
/// underscore, trim the ends and lowercase.
pub fn slugify(parts: &[&str]) -> String {
    let mut slug = String::new();
    let mut pending_separator = false;
    for c in parts.iter().flat_map(|p| p.chars().chain(std::iter::once('_'))) {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// Extract the lot number from a generated QR filename.
///
/// Matches `QRCODE_<anything>_<lot prefix><digits>.png`, ignoring case on
/// the lot prefix and extension. Returns `None` for anything else,
/// including files without the `QRCODE_` prefix.
///
/// - `"QRCODE_rully_white_2023_lm0012.png"` → `Some(12)`
/// - `"QRCODE_rully_white_2023_LM0012.PNG"` → `Some(12)`
/// - `"QRCODE_rully_white_2023.png"` → `None`
/// - `"notes_lm0099.png"` → `None`
pub fn parse_artifact_lot(filename: &str) -> Option<u32> {
    let rest = filename.strip_prefix(QR_PREFIX)?;
    let stem = strip_suffix_ignore_case(rest, QR_EXTENSION)?;
    let (_, token) = stem.rsplit_once('_')?;
    LotToken::parse(token).map(|lot| lot.number())
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = s.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}
