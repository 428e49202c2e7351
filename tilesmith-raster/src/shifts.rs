//! Shift table: calibrated sub-pixel offsets for the interior stops.
//!
//! Layout (row-major, matches the on-disk cache byte for byte):
//!
//! ```text
//! [row: 24][col: 16][axis: 2][size - 1: 64][control point: 3]  →  i8
//! ```
//!
//! Values are tenths of a pixel. Control point 0 perturbs the 20% stop,
//! 1 the 80% stop, and 2 the 50% stop.

use thiserror::Error;
use tilesmith_atlas::{CellCoord, MAX_TILE_SIZE, TILE_COLS, TILE_ROWS};

/// Number of control points per (cell, axis, size).
pub const CONTROL_POINTS: usize = 3;

/// Total number of entries (and bytes in the cache file).
pub const SHIFT_TABLE_LEN: usize = TILE_ROWS * TILE_COLS * 2 * MAX_TILE_SIZE * CONTROL_POINTS;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShiftError {
    #[error("shift cache holds {actual} bytes, expected {expected}")]
    Size { expected: usize, actual: usize },
}

/// Which mapping table a shift triple applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal = 0,
    Vertical = 1,
}

/// Flat storage for every shift triple.
#[derive(Clone, PartialEq, Eq)]
pub struct ShiftTable {
    values: Vec<i8>,
}

impl Default for ShiftTable {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl std::fmt::Debug for ShiftTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.values.iter().filter(|&&v| v != 0).count();
        f.debug_struct("ShiftTable")
            .field("len", &self.values.len())
            .field("non_zero", &non_zero)
            .finish()
    }
}

impl ShiftTable {
    /// A table with no sub-pixel correction anywhere.
    pub fn zeroed() -> Self {
        Self {
            values: vec![0; SHIFT_TABLE_LEN],
        }
    }

    /// Interpret a cache blob. The size must match exactly.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ShiftError> {
        if bytes.len() != SHIFT_TABLE_LEN {
            return Err(ShiftError::Size {
                expected: SHIFT_TABLE_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            values: bytemuck::cast_slice::<u8, i8>(bytes).to_vec(),
        })
    }

    /// Flat byte dump, suitable for [`ShiftTable::from_bytes`].
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.values)
    }

    /// Shift triple for `cell` on `axis` at output size `size`.
    ///
    /// Sizes outside `1..=MAX_TILE_SIZE` have no calibration and yield
    /// zero shifts.
    pub fn get(&self, cell: CellCoord, axis: Axis, size: usize) -> [i8; CONTROL_POINTS] {
        match Self::offset(cell, axis, size) {
            Some(at) => [self.values[at], self.values[at + 1], self.values[at + 2]],
            None => [0; CONTROL_POINTS],
        }
    }

    /// Mutable triple, or `None` for an uncalibrated size.
    pub fn slot_mut(&mut self, cell: CellCoord, axis: Axis, size: usize) -> Option<&mut [i8]> {
        let at = Self::offset(cell, axis, size)?;
        Some(&mut self.values[at..at + CONTROL_POINTS])
    }

    /// True when no entry carries a shift.
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0)
    }

    fn offset(cell: CellCoord, axis: Axis, size: usize) -> Option<usize> {
        if size == 0 || size > MAX_TILE_SIZE || cell.row >= TILE_ROWS || cell.col >= TILE_COLS {
            return None;
        }
        let index = ((cell.row * TILE_COLS + cell.col) * 2 + axis as usize) * MAX_TILE_SIZE + size - 1;
        Some(index * CONTROL_POINTS)
    }
}

// ===================================================================
// Tests
// ===================================================================
