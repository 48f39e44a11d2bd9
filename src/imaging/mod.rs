//! Label post-processing.
//!
//! | Step | Operation |
//! |---|---|
//! | 1 | 70px white band on top |
//! | 2 | `INGREDIENT &` near the top |
//! | 3 | `NUTRITION` below it |
//! | 4 | 60px white band on the bottom |
//! | 5 | `E(100ml)=<energy>` near the bottom |
//!
//! The module is split into:
//! - **Parameters**: [`RasterOp`] and [`Gravity`], plain data
//! - **Backend**: [`RasterBackend`] trait + [`CommandBackend`] / [`NoopBackend`]
//! - **Operations**: planning the five steps and running them

pub mod backend;
pub mod command_backend;
pub mod operations;
mod params;

pub use backend::{BackendError, RasterBackend};
pub use command_backend::{CommandBackend, NoopBackend, probe, select_backend};
pub use operations::{AnnotationOutcome, annotate, energy_label, plan_annotation};
pub use params::{Gravity, RasterOp};
