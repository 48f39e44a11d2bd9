//! ImageMagick command-line backend.
//!
//! ## Operation mapping
//!
//! | Operation | Arguments |
//! |---|---|
//! | Band | `<img> -gravity north -background white -splice 0x70 <img>` |
//! | Text | `<img> -gravity north -pointsize 22 -fill black -annotate +0+8 "INGREDIENT &" <img>` |
//!
//! Input and output are the same path, so every operation rewrites the file
//! in place. ImageMagick 7 installs `magick`; ImageMagick 6 installs
//! `convert`. Both accept the arguments above, so [`probe`] just tries each
//! candidate with `-version` and keeps the first that runs.

use super::backend::{BackendError, RasterBackend};
use super::params::RasterOp;
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs one ImageMagick process per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBackend {
    program: String,
}

impl CommandBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl RasterBackend for CommandBackend {
    fn tool(&self) -> Option<&str> {
        Some(&self.program)
    }

    fn apply(&self, image: &Path, op: &RasterOp) -> Result<(), BackendError> {
        let output = Command::new(&self.program)
            .args(command_args(image, op))
            .stdin(Stdio::null())
            .output()?;
        if !output.status.success() {
            return Err(BackendError::ToolFailed {
                tool: self.program.clone(),
                op: op.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Stand-in used when no raster tool is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBackend;

impl RasterBackend for NoopBackend {
    fn tool(&self) -> Option<&str> {
        None
    }

    fn apply(&self, _image: &Path, _op: &RasterOp) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Arguments for one in-place operation on `image`.
pub fn command_args(image: &Path, op: &RasterOp) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![image.into()];
    match op {
        RasterOp::Splice { gravity, pixels } => {
            let geometry = format!("0x{}", pixels);
            args.extend(
                [
                    "-gravity",
                    gravity.as_str(),
                    "-background",
                    "white",
                    "-splice",
                    geometry.as_str(),
                ]
                .map(OsString::from),
            );
        }
        RasterOp::Annotate {
            gravity,
            offset,
            point_size,
            text,
        } => {
            let point_size = point_size.to_string();
            let offset = format!("+0+{}", offset);
            args.extend(
                [
                    "-gravity",
                    gravity.as_str(),
                    "-pointsize",
                    point_size.as_str(),
                    "-fill",
                    "black",
                    "-annotate",
                    offset.as_str(),
                    text.as_str(),
                ]
                .map(OsString::from),
            );
        }
    }
    args.push(image.into());
    args
}

/// Whether `program -version` runs and exits successfully.
pub fn is_available(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

/// First available command among `candidates`, in order.
pub fn probe(candidates: &[String]) -> Option<CommandBackend> {
    candidates
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .find(|c| is_available(c))
        .map(CommandBackend::new)
}

/// Probe once and box whichever backend applies.
pub fn select_backend(candidates: &[String]) -> Box<dyn RasterBackend> {
    match probe(candidates) {
        Some(backend) => Box::new(backend),
        None => Box::new(NoopBackend),
    }
}
