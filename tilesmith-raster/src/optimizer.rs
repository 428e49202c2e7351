//! Shift Optimizer: coordinate descent over the shift table.
//!
//! For every non-empty cell and every calibrated output size, each control
//! point is scanned over a small window while the tile is re-rendered with
//! `optimizing = true`; the value giving the lowest blur score is kept.
//!
//! ```text
//! for cell in non-empty cells:
//!     horizontal: width 5..=64 (height fixed at 64)
//!     vertical:   height 7..=64 (width fixed at 64)
//!         repeat `passes` times:
//!             for each control point:
//!                 try centre-radius ..= centre+radius, keep the best
//! ```
//!
//! This is a heuristic: deterministic, not globally optimal.

use std::ops::RangeInclusive;
use std::time::Instant;

use log::{debug, info};
use tilesmith_atlas::{CellCoord, ProcessingMode, MAX_TILE_SIZE, TILE_COLS, TILE_ROWS};

use crate::engine::TileEngine;
use crate::mapper::TileSize;
use crate::shifts::Axis;
use crate::surface::AtlasSurface;

/// Search parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptimizerConfig {
    /// Output widths to calibrate.
    pub horizontal_sizes: RangeInclusive<usize>,
    /// Output heights to calibrate.
    pub vertical_sizes: RangeInclusive<usize>,
    /// Refinement passes per size.
    pub passes: usize,
    /// Half-width of the scan window, in tenths of a pixel.
    pub radius: i32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            horizontal_sizes: 5..=MAX_TILE_SIZE,
            vertical_sizes: 7..=MAX_TILE_SIZE,
            passes: 3,
            radius: 5,
        }
    }
}

/// Reported once per calibrated cell, before its search starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibrationProgress {
    /// 1-based position of the cell in the atlas.
    pub index: usize,
    pub total: usize,
    pub cell: CellCoord,
}

/// Which control points an axis search touches.
#[derive(Clone, Copy, Debug)]
struct SearchPlan {
    params: usize,
    /// Control point 2 follows the midpoint of 0 and 1.
    coupled: bool,
}

impl SearchPlan {
    fn for_axis(mode: ProcessingMode, axis: Axis) -> Self {
        match (axis, mode) {
            (Axis::Horizontal, m) if m.is_text() => Self { params: 2, coupled: true },
            (Axis::Vertical, ProcessingMode::Text) => Self { params: 1, coupled: false },
            _ => Self { params: 3, coupled: false },
        }
    }
}

fn midpoint(a: i8, b: i8) -> i32 {
    (a as i32 + b as i32) / 2
}

fn to_shift(value: i32) -> i8 {
    value.clamp(i8::MIN as i32, i8::MAX as i32) as i8
}

/// Calibrate the shift table of `engine` in place.
pub fn optimize(
    engine: &mut TileEngine,
    config: &OptimizerConfig,
    mut progress: impl FnMut(CalibrationProgress),
) {
    let started = Instant::now();
    let cells: Vec<CellCoord> = engine.cells().non_empty().collect();
    info!("Calibrating shifts for {} non-empty cells", cells.len());

    for cell in cells {
        progress(CalibrationProgress {
            index: cell.row * TILE_COLS + cell.col + 1,
            total: TILE_ROWS * TILE_COLS,
            cell,
        });
        let mode = engine.descriptor(cell).mode;

        for width in config.horizontal_sizes.clone() {
            let tile = TileSize::new(width, MAX_TILE_SIZE);
            search(engine, config, cell, Axis::Horizontal, width, tile, SearchPlan::for_axis(mode, Axis::Horizontal));
        }
        for height in config.vertical_sizes.clone() {
            let tile = TileSize::new(MAX_TILE_SIZE, height);
            search(engine, config, cell, Axis::Vertical, height, tile, SearchPlan::for_axis(mode, Axis::Vertical));
        }
        debug!("Calibrated cell ({}, {})", cell.row, cell.col);
    }

    info!("Calibration finished in {:.1?}", started.elapsed());
}

/// Coordinate descent for one (cell, axis, size) slot.
///
/// The window for control points 0 and 1 is centred on the value already
/// in the table, not on zero, so the result depends on what the table held
/// before calibration started.
fn search(
    engine: &mut TileEngine,
    config: &OptimizerConfig,
    cell: CellCoord,
    axis: Axis,
    size: usize,
    tile: TileSize,
    plan: SearchPlan,
) {
    let Some(mut scratch) = AtlasSurface::new(tile) else {
        return;
    };
    let write = |engine: &mut TileEngine, idx: usize, value: i32| {
        if let Some(slot) = engine.shifts_mut().slot_mut(cell, axis, size) {
            slot[idx] = to_shift(value);
            if plan.coupled {
                slot[2] = to_shift(midpoint(slot[0], slot[1]));
            }
        }
    };

    for _ in 0..config.passes {
        for idx in 0..plan.params {
            let current = engine.shifts().get(cell, axis, size);
            let centre = if idx == 2 {
                midpoint(current[0], current[1])
            } else {
                current[idx] as i32
            };

            let mut best_blur = f64::INFINITY;
            let mut best = centre;
            for shift in centre - config.radius..=centre + config.radius {
                write(engine, idx, shift);
                let blur = engine.prepare_tile(&mut scratch, tile, cell, true);
                if blur < best_blur {
                    best_blur = blur;
                    best = shift;
                }
            }
            write(engine, idx, best);
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
