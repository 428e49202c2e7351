//! Shift cache: persists the calibrated shift table between runs.
//!
//! The blob is the raw table (see [`crate::shifts`]) with no header and no
//! version: a missing or wrongly sized blob is simply a cache miss, and the
//! optimizer regenerates it. Deleting the file is the only invalidation.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::engine::TileEngine;
use crate::optimizer::{self, CalibrationProgress, OptimizerConfig};
use crate::shifts::ShiftTable;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("shift cache I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Byte-array load/store for the shift table.
pub trait ShiftStore {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<u8>>, CacheError>;
    fn store(&mut self, bytes: &[u8]) -> Result<(), CacheError>;
}

/// Shift cache in a single file.
#[derive(Clone, Debug)]
pub struct FileShiftStore {
    path: PathBuf,
}

impl FileShiftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ShiftStore for FileShiftStore {
    fn load(&self) -> Result<Option<Vec<u8>>, CacheError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Write to a sibling temp file, then rename over the target.
    fn store(&mut self, bytes: &[u8]) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, bytes).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

/// In-memory store, for tests and embedders that persist elsewhere.
#[derive(Clone, Debug, Default)]
pub struct MemoryShiftStore {
    bytes: Option<Vec<u8>>,
    /// Number of successful `store` calls.
    pub writes: usize,
}

impl MemoryShiftStore {
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Some(bytes),
            writes: 0,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

impl ShiftStore for MemoryShiftStore {
    fn load(&self) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.bytes.clone())
    }

    fn store(&mut self, bytes: &[u8]) -> Result<(), CacheError> {
        self.bytes = Some(bytes.to_vec());
        self.writes += 1;
        Ok(())
    }
}

/// How the engine obtained its shift table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheOutcome {
    /// A valid blob was found and loaded.
    Loaded,
    /// The optimizer ran and the result was handed to the store.
    Calibrated,
}

impl TileEngine {
    /// Load the shift table from `store`, or calibrate and persist it.
    ///
    /// Read failures and malformed blobs count as a miss. A failed write is
    /// logged; the freshly calibrated table is still used.
    pub fn load_or_calibrate(
        &mut self,
        store: &mut dyn ShiftStore,
        config: &OptimizerConfig,
        progress: impl FnMut(CalibrationProgress),
    ) -> CacheOutcome {
        match store.load() {
            Ok(Some(bytes)) => match ShiftTable::from_bytes(&bytes) {
                Ok(table) => {
                    info!("Loaded shift cache ({} bytes)", bytes.len());
                    self.set_shifts(table);
                    return CacheOutcome::Loaded;
                }
                Err(e) => warn!("Ignoring shift cache: {e}"),
            },
            Ok(None) => info!("No shift cache found, calibrating"),
            Err(e) => warn!("Could not read shift cache: {e}"),
        }

        self.recalibrate(store, config, progress);
        CacheOutcome::Calibrated
    }

    /// Run the optimizer from scratch and persist the result.
    pub fn recalibrate(
        &mut self,
        store: &mut dyn ShiftStore,
        config: &OptimizerConfig,
        progress: impl FnMut(CalibrationProgress),
    ) {
        self.set_shifts(ShiftTable::zeroed());
        optimizer::optimize(self, config, progress);
        if let Err(e) = store.store(self.shifts().as_bytes()) {
            warn!("Could not save shift cache: {e}");
        }
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shifts::{Axis, SHIFT_TABLE_LEN};
    use tilesmith_atlas::{CellCoord, SourceAtlas};

    #[test]
    fn test_memory_store_miss_calibrates() {
        let mut engine = TileEngine::new(SourceAtlas::blank());
        let mut store = MemoryShiftStore::default();
        let outcome = engine.load_or_calibrate(&mut store, &OptimizerConfig::default(), |_| {});
        assert_eq!(outcome, CacheOutcome::Calibrated);
        assert_eq!(store.writes, 1);
        assert_eq!(store.bytes().map(<[u8]>::len), Some(SHIFT_TABLE_LEN));
    }

    #[test]
    fn test_memory_store_hit_loads() {
        let mut table = ShiftTable::zeroed();
        table
            .slot_mut(CellCoord::new(3, 3), Axis::Horizontal, 10)
            .unwrap()
            .copy_from_slice(&[1, 2, 1]);
        let mut store = MemoryShiftStore::with_bytes(table.as_bytes().to_vec());
        let mut engine = TileEngine::new(SourceAtlas::blank());
        let outcome = engine.load_or_calibrate(&mut store, &OptimizerConfig::default(), |_| {});
        assert_eq!(outcome, CacheOutcome::Loaded);
        assert_eq!(store.writes, 0);
        assert_eq!(engine.shifts(), &table);
    }

    #[test]
    fn test_wrong_size_blob_is_a_miss() {
        let mut store = MemoryShiftStore::with_bytes(vec![1, 2, 3]);
        let mut engine = TileEngine::new(SourceAtlas::blank());
        let outcome = engine.load_or_calibrate(&mut store, &OptimizerConfig::default(), |_| {});
        assert_eq!(outcome, CacheOutcome::Calibrated);
        assert_eq!(store.bytes().map(<[u8]>::len), Some(SHIFT_TABLE_LEN));
    }
}
