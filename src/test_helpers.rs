//! Shared test utilities.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! touch_artifacts(tmp.path(), 1..=37);
//! assert_eq!(next_lot(tmp.path()).unwrap().to_string(), "LM0038");
//! ```

use std::fs;
use std::path::Path;

// =========================================================================
// Fixture setup
// =========================================================================

/// Create empty QR artifacts for the given lot numbers in `dir`.
///
/// Slugs vary with the lot so the files look like a real label run.
pub fn touch_artifacts(dir: &Path, lots: impl IntoIterator<Item = u32>) {
    const SLUGS: [&str; 3] = [
        "mercurey_champs_martin_1er_cru_red_2024",
        "rully_fromange_village_white_2023",
        "bourgogne_red_2022",
    ];
    fs::create_dir_all(dir).unwrap();
    for lot in lots {
        let slug = SLUGS[lot as usize % SLUGS.len()];
        fs::write(dir.join(format!("QRCODE_{slug}_lm{lot:04}.png")), b"").unwrap();
    }
}

// =========================================================================
// Lookup helpers
// =========================================================================

/// Sorted file names directly inside `dir`; empty when it does not exist.
pub fn list_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
