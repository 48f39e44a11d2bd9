//! Lot sequencing.
//!
//! Lot tokens look like `LM0038`: the `LM` prefix and a number zero-padded to
//! four digits. Past `LM9999` the field simply grows (`LM10000`); tokens are
//! always compared by number, never as strings.
//!
//! ## Where the next number comes from
//!
//! The artifact directory itself is the record of issued lots: every
//! `QRCODE_<slug>.png` ends with its lot token. [`scan_max_lot`] reads those
//! filenames; [`next_lot`] previews the next number from them and the
//! counter file described below.
//!
//! A directory listing alone cannot stop two concurrent runs from picking
//! the same number, so generation goes through a [`LotLedger`]:
//!
//! 1. take an exclusive lock on `.vin-qr.lock` in the artifact directory,
//! 2. read the last issued number from `.vin-qr-lot` (if present),
//! 3. scan the directory,
//! 4. issue `max(counter, scan) + 1`,
//! 5. after the QR image is on disk, [`LotLedger::commit`] rewrites the
//!    counter (temp file + rename) and releases the lock.
//!
//! Directories populated before the counter existed keep working: the scan
//! still sees their images. A counter that is ahead of the directory (images
//! moved away) also wins, so a number is never handed out twice.

use crate::naming::parse_artifact_lot;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const LOT_PREFIX: &str = "LM";
/// Minimum digit count; larger numbers print wider.
pub const LOT_WIDTH: usize = 4;

pub const LOCK_FILENAME: &str = ".vin-qr.lock";
pub const COUNTER_FILENAME: &str = ".vin-qr-lot";

#[derive(Error, Debug)]
pub enum LotError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Lot counter is not a number: {0}")]
    CorruptCounter(PathBuf),
    #[error("Lot numbers exhausted after {LOT_PREFIX}{0}")]
    Exhausted(u32),
}

/// A production batch identifier, `LM####`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LotToken(u32);

impl LotToken {
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// The token following `max`, the highest number already issued
    /// (0 when nothing has been issued).
    pub fn after(max: u32) -> Result<Self, LotError> {
        max.checked_add(1)
            .map(Self)
            .ok_or(LotError::Exhausted(max))
    }

    /// Parse `LM0012` / `lm0012`. At least one digit, digits only.
    pub fn parse(token: &str) -> Option<Self> {
        let prefix = token.get(..LOT_PREFIX.len())?;
        if !prefix.eq_ignore_ascii_case(LOT_PREFIX) {
            return None;
        }
        let digits = &token[LOT_PREFIX.len()..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Self)
    }
}

impl fmt::Display for LotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{LOT_PREFIX}{:0width$}", self.0, width = LOT_WIDTH)
    }
}

impl Serialize for LotToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Highest lot number embedded in a `QRCODE_*.png` filename in `dir`.
///
/// Returns 0 when there are none, including when `dir` does not exist yet.
pub fn scan_max_lot(dir: &Path) -> Result<u32, LotError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut max = 0;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(number) = name.to_str().and_then(parse_artifact_lot) {
            max = max.max(number);
        }
    }
    Ok(max)
}

/// The lot the next generation in `dir` would get: one past the higher of
/// the counter file and the directory scan.
///
/// Takes no lock, so a concurrent generation may claim it first.
pub fn next_lot(dir: &Path) -> Result<LotToken, LotError> {
    let counter = read_counter(&dir.join(COUNTER_FILENAME))?;
    LotToken::after(counter.unwrap_or(0).max(scan_max_lot(dir)?))
}

/// Exclusive, lock-protected view of a directory's lot sequence.
///
/// The lock is held until the ledger is committed or dropped. Dropping
/// without committing leaves the counter as it was.
#[derive(Debug)]
pub struct LotLedger {
    dir: PathBuf,
    _lock: File,
    counter: Option<u32>,
    scanned: u32,
}

impl LotLedger {
    /// Lock `dir` (created if missing) and read its current state.
    ///
    /// Blocks while another ledger holds the lock.
    pub fn open(dir: &Path) -> Result<Self, LotError> {
        fs::create_dir_all(dir)?;
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(LOCK_FILENAME))?;
        lock.lock()?;

        let counter = read_counter(&dir.join(COUNTER_FILENAME))?;
        let scanned = scan_max_lot(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            _lock: lock,
            counter,
            scanned,
        })
    }

    /// Last issued number according to the counter file, if any.
    pub fn counter(&self) -> Option<u32> {
        self.counter
    }

    /// Highest number found in the directory listing.
    pub fn scanned(&self) -> u32 {
        self.scanned
    }

    pub fn next(&self) -> Result<LotToken, LotError> {
        LotToken::after(self.counter.unwrap_or(0).max(self.scanned))
    }

    /// Record `lot` as issued and release the lock.
    pub fn commit(self, lot: LotToken) -> Result<(), LotError> {
        let path = self.dir.join(COUNTER_FILENAME);
        let tmp = self.dir.join(format!("{COUNTER_FILENAME}.tmp"));
        fs::write(&tmp, format!("{}\n", lot.number()))?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

fn read_counter(path: &Path) -> Result<Option<u32>, LotError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    content
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| LotError::CorruptCounter(path.to_path_buf()))
}
