//! Atlas Inspector: classifies source cells once at start-up.
//!
//! Every cell gets a [`CellDescriptor`]: whether it holds any ink at all,
//! how much symmetric blank space sits above and below it (Fit cells only),
//! and the processing mode from the layout table.

use log::info;

use crate::atlas::SourceAtlas;
use crate::layout::{CellCoord, ProcessingMode, MAX_PADDING, TILE_COLS, TILE_HEIGHT, TILE_ROWS};

/// Immutable per-cell facts derived from the source atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellDescriptor {
    pub is_empty: bool,
    /// Blank rows at both the top and the bottom (0..=`MAX_PADDING`).
    pub padding: u8,
    pub mode: ProcessingMode,
}

/// True iff every pixel of the cell is zero.
pub fn is_cell_empty(atlas: &SourceAtlas, row: usize, col: usize) -> bool {
    (0..TILE_HEIGHT).all(|y| atlas.cell_row(row, col, y).iter().all(|&p| p == 0))
}

/// Scan from the top and bottom edges toward the centre in lock-step and
/// return the first depth at which either scanline has ink.
pub fn measure_padding(atlas: &SourceAtlas, row: usize, col: usize) -> u8 {
    let has_ink = |y: usize| atlas.cell_row(row, col, y).iter().any(|&p| p > 0);
    (0..MAX_PADDING)
        .find(|&padding| has_ink(padding) || has_ink(TILE_HEIGHT - padding - 1))
        .unwrap_or(MAX_PADDING) as u8
}

/// Descriptors for every cell of the atlas, row-major.
#[derive(Clone, Debug)]
pub struct CellTable {
    cells: Vec<CellDescriptor>,
}

impl CellTable {
    /// Inspect every cell of `atlas`.
    pub fn inspect(atlas: &SourceAtlas) -> Self {
        let cells: Vec<CellDescriptor> = CellCoord::all()
            .map(|cell| {
                let mode = cell.mode();
                CellDescriptor {
                    is_empty: is_cell_empty(atlas, cell.row, cell.col),
                    padding: if mode == ProcessingMode::Fit {
                        measure_padding(atlas, cell.row, cell.col)
                    } else {
                        0
                    },
                    mode,
                }
            })
            .collect();

        let non_empty = cells.iter().filter(|c| !c.is_empty).count();
        info!("Atlas inspected: {non_empty} of {} cells have ink", cells.len());

        Self { cells }
    }

    pub fn get(&self, cell: CellCoord) -> &CellDescriptor {
        &self.cells[cell.row * TILE_COLS + cell.col]
    }

    /// Cells with at least one non-zero pixel, row-major.
    pub fn non_empty(&self) -> impl Iterator<Item = CellCoord> + '_ {
        CellCoord::all().filter(move |&cell| !self.get(cell).is_empty)
    }

    /// Number of cells (always `TILE_ROWS * TILE_COLS`).
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.cells.len(), TILE_ROWS * TILE_COLS);
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TILE_WIDTH;

    #[test]
    fn test_blank_cell_is_empty() {
        let atlas = SourceAtlas::blank();
        assert!(is_cell_empty(&atlas, 0, 0));
        assert!(is_cell_empty(&atlas, TILE_ROWS - 1, TILE_COLS - 1));
    }

    #[test]
    fn test_single_pixel_makes_cell_non_empty() {
        let mut atlas = SourceAtlas::blank();
        atlas.fill_cell_rect(7, 3, (TILE_WIDTH - 1, TILE_HEIGHT - 1), (TILE_WIDTH, TILE_HEIGHT), 1);
        assert!(!is_cell_empty(&atlas, 7, 3));
        assert!(is_cell_empty(&atlas, 7, 4));
        assert!(is_cell_empty(&atlas, 8, 3));
    }

    #[test]
    fn test_padding_symmetric_scan() {
        let mut atlas = SourceAtlas::blank();
        // Ink from row 30 down to row 219: top gap 30, bottom gap 12.
        atlas.fill_cell_rect(0, 0, (40, 30), (60, 220), 255);
        assert_eq!(measure_padding(&atlas, 0, 0), 12);
    }

    #[test]
    fn test_padding_full_cell() {
        let mut atlas = SourceAtlas::blank();
        atlas.fill_cell_rect(0, 1, (0, 0), (TILE_WIDTH, TILE_HEIGHT), 255);
        assert_eq!(measure_padding(&atlas, 0, 1), 0);
    }

    #[test]
    fn test_padding_saturates_at_max() {
        let mut atlas = SourceAtlas::blank();
        // Ink only in the vertical centre, deeper than the scan reaches.
        atlas.fill_cell_rect(1, 0, (0, 110), (TILE_WIDTH, 120), 255);
        assert_eq!(measure_padding(&atlas, 1, 0) as usize, MAX_PADDING);
        // Empty cells saturate too.
        assert_eq!(measure_padding(&atlas, 1, 1) as usize, MAX_PADDING);
    }

    #[test]
    fn test_cell_table_padding_only_for_fit() {
        let mut atlas = SourceAtlas::blank();
        // (0, 0) is Fit, (2, 1) is Text.
        atlas.fill_cell_rect(0, 0, (0, 20), (TILE_WIDTH, 200), 255);
        atlas.fill_cell_rect(2, 1, (0, 20), (TILE_WIDTH, 200), 255);
        let table = CellTable::inspect(&atlas);

        let fit = table.get(CellCoord::new(0, 0));
        assert_eq!(fit.mode, ProcessingMode::Fit);
        assert_eq!(fit.padding, 20);
        assert!(!fit.is_empty);

        let text = table.get(CellCoord::new(2, 1));
        assert_eq!(text.mode, ProcessingMode::Text);
        assert_eq!(text.padding, 0);

        assert_eq!(table.non_empty().count(), 2);
        assert_eq!(table.len(), TILE_ROWS * TILE_COLS);
    }
}
