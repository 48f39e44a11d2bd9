//! Parameter types for raster operations.
//!
//! These describe *what* to do to the label image, not *how*. The
//! [`operations`](super::operations) module decides which operations a label
//! needs; a [`backend`](super::backend) carries them out. Keeping the two
//! apart lets tests swap in a recording mock.
//!
//! ## Types
//!
//! - [`Gravity`]: which edge an operation is anchored to.
//! - [`RasterOp`]: one in-place edit: add a white band, or stamp text.

use std::fmt;

/// Anchor edge for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    North,
    South,
}

impl Gravity {
    pub fn as_str(self) -> &'static str {
        match self {
            Gravity::North => "north",
            Gravity::South => "south",
        }
    }
}

/// One in-place edit of the label image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterOp {
    /// Grow the canvas by `pixels` of white on the `gravity` edge.
    Splice { gravity: Gravity, pixels: u32 },
    /// Draw `text` in black, `offset` pixels in from the `gravity` edge,
    /// horizontally centered.
    Annotate {
        gravity: Gravity,
        offset: u32,
        point_size: u32,
        text: String,
    },
}

impl fmt::Display for RasterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterOp::Splice { gravity, pixels } => {
                write!(f, "band {} {}px", gravity.as_str(), pixels)
            }
            RasterOp::Annotate { text, .. } => write!(f, "text \"{}\"", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_arguments() {
        assert_eq!(Gravity::North.as_str(), "north");
        assert_eq!(Gravity::South.as_str(), "south");
    }

    #[test]
    fn op_display() {
        let band = RasterOp::Splice {
            gravity: Gravity::North,
            pixels: 70,
        };
        assert_eq!(band.to_string(), "band north 70px");

        let text = RasterOp::Annotate {
            gravity: Gravity::South,
            offset: 18,
            point_size: 20,
            text: "E(100ml)=312kJ/75kcal".into(),
        };
        assert_eq!(text.to_string(), "text \"E(100ml)=312kJ/75kcal\"");
    }
}
