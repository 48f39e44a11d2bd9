//! QR image generation.
//!
//! The code always encodes `https://<host>/<slug>.html` at error-correction
//! level H (about 30% of the modules can be lost).
//!
//! The image is written as 8-bit grayscale PNG at
//! `<artifact_dir>/QRCODE_<slug>.png`. Failures propagate, nothing retries.

use crate::config::QrConfig;
use crate::naming::Slug;
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// The page URL a lot's code points at.
pub fn product_url(host: &str, slug: &Slug) -> String {
    format!("https://{}/{}.html", host.trim(), slug)
}

/// Encode `url` at the highest error-correction level.
pub fn encode(url: &str) -> Result<QrCode, QrError> {
    Ok(QrCode::with_error_correction_level(url.as_bytes(), EcLevel::H)?)
}

/// Rasterize `code` with its quiet zone, at least `min_dimension` pixels wide.
pub fn rasterize(code: &QrCode, min_dimension: u32) -> GrayImage {
    code.render::<Luma<u8>>()
        .quiet_zone(true)
        .min_dimensions(min_dimension, min_dimension)
        .build()
}

/// Encode, rasterize and save the code for `url` as `QRCODE_<slug>.png`.
pub fn write_qr(
    artifact_dir: &Path,
    slug: &Slug,
    url: &str,
    config: &QrConfig,
) -> Result<PathBuf, QrError> {
    let code = encode(url)?;
    let image = rasterize(&code, config.min_dimension);
    let path = artifact_dir.join(slug.qr_filename());
    image
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|source| QrError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}
