//! Raster backend trait and shared types.
//!
//! A [`RasterBackend`] applies one [`RasterOp`] to an image file in place.
//! Two implementations ship:
//!
//! - [`CommandBackend`](super::command_backend::CommandBackend) shells out to
//!   ImageMagick (`magick` or `convert`), one process per operation.
//! - [`NoopBackend`](super::command_backend::NoopBackend) stands in when no
//!   tool was found; callers see `tool() == None` and skip annotation.

use super::params::RasterOp;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{tool} failed on {op} ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        op: String,
        status: String,
        stderr: String,
    },
}

/// Something that can edit an image file in place.
pub trait RasterBackend {
    /// Command or library doing the work; `None` when nothing is available.
    fn tool(&self) -> Option<&str>;

    /// Apply `op` to the file at `image`, overwriting it.
    fn apply(&self, image: &Path, op: &RasterOp) -> Result<(), BackendError>;
}
