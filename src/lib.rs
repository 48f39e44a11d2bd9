//! # vin-qr
//!
//! Generates the traceability artifacts for a bottled wine lot: a QR code
//! label and the product page it points to.
//!
//! Given a vintage, appellation, color, climat, cru and energy value, one
//! run reserves the next lot number, writes `QRCODE_<slug>.png` (annotated
//! with an "INGREDIENT & NUTRITION" header and the energy footer) and
//! `<slug>.html`. The QR code encodes `https://<host>/<slug>.html`, so the
//! label scans straight to its page.
//!
//! # Architecture: One Linear Pipeline
//!
//! ```text
//! validate → reserve lot → slug → QR image → commit lot → annotate → page
//! ```
//!
//! Every step after validation writes to disk, so validation runs first and
//! writes nothing on failure. The two best-effort steps (annotation, page)
//! report a skip instead of failing when their precondition is missing.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`vocabulary`] | Closed vocabularies, energy parsing, [`vocabulary::WineAttributes`] |
//! | [`lot`] | `LM####` tokens, directory scan, lock-protected lot ledger |
//! | [`naming`] | Slug construction and artifact filename conventions |
//! | [`qr`] | QR encoding at error-correction level H, PNG output |
//! | [`imaging`] | Label annotation through an external raster tool |
//! | [`render`] | Product page HTML using Maud, organic logo handling |
//! | [`pipeline`] | Orchestrates one generation, emits progress events |
//! | [`config`] | `vin-qr.toml` loading, validation and stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Artifact Directory Is the Lot Register
//!
//! Every issued lot leaves a `QRCODE_…_lmNNNN.png` behind, so the directory
//! listing alone tells which numbers are taken. A small counter file and an
//! exclusive lock sit on top of it: the lock serializes concurrent runs, the
//! counter remembers numbers whose images were moved away. See [`lot`].
//!
//! ## Shelling Out for Label Text
//!
//! QR encoding and rasterization are pure Rust (`qrcode` + `image`). Text
//! rendering is left to ImageMagick, which is probed once per run. Without
//! it the label is still a valid, scannable code; it just lacks the header
//! and energy footer.
//!
//! ## Maud Over Template Engines
//!
//! Pages are generated with [Maud](https://maud.lambda.xyz/): malformed
//! markup is a build error, interpolation is escaped, and the stylesheet and
//! logo are compiled into the binary.

pub mod config;
pub mod imaging;
pub mod lot;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod qr;
pub mod render;
pub mod vocabulary;

#[cfg(test)]
pub(crate) mod test_helpers;
