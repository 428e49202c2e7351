//! Rasterizer: source cell → accumulator → 8-bit alpha.

use std::f64::consts::PI;

use tilesmith_atlas::{CellCoord, ProcessingMode, SourceAtlas, TILE_HEIGHT};

use crate::accumulator::{Accumulator, FULL_SCALE};
use crate::mapper::CoordinateMap;
use crate::surface::AtlasSurface;

/// Linear intensities above this saturate to full opacity.
const SATURATION: u32 = 64_770;

/// Half of full scale, the de-bolding pivot.
const HALF_SCALE: u32 = FULL_SCALE / 2;

/// Downscale a source cell into the accumulator through `map`.
pub fn accumulate(atlas: &SourceAtlas, cell: CellCoord, map: &CoordinateMap, acc: &mut Accumulator) {
    for y in 0..TILE_HEIGHT {
        let Some(target_y) = map.scaled_y[y] else {
            continue;
        };
        let row = atlas.cell_row(cell.row, cell.col, y);
        for (&value, &target_x) in row.iter().zip(&map.scaled_x) {
            acc.add(target_x, target_y, value);
        }
    }
    acc.fill_skipped_rows(&map.scaled_y);
}

/// Thin text strokes: darken the lower half of the range, boost the upper.
pub fn debold(value: u32) -> u32 {
    if value < HALF_SCALE {
        value / 2
    } else {
        value * 3 / 2 - HALF_SCALE
    }
}

/// Gamma-compress a linear intensity to an alpha byte.
pub fn alpha_from_intensity(value: u32) -> u8 {
    match value {
        0 => 0,
        v if v > SATURATION => 255,
        v => (v as f64).sqrt().round().min(255.0) as u8,
    }
}

/// Blurriness of one pixel: 0 for black or white, 1 for mid-grey.
pub fn blur_weight(value: u32) -> f64 {
    (PI / FULL_SCALE as f64 * value as f64).sin()
}

/// Convert the accumulator into the cell's tile on `surface`.
///
/// Returns the summed blur score when `optimizing`, 0 otherwise.
pub fn resolve(
    acc: &Accumulator,
    surface: &mut AtlasSurface,
    cell: CellCoord,
    mode: ProcessingMode,
    optimizing: bool,
) -> f64 {
    let mut blur = 0.0;
    for y in 0..acc.height() {
        for x in 0..acc.width() {
            let mut value = acc.average(x, y);
            if optimizing {
                blur += blur_weight(value);
            }
            if mode.is_text() {
                value = debold(value);
            }
            surface.put(cell, x, y, alpha_from_intensity(value));
        }
    }
    blur
}

// ===================================================================
// Tests
// ===================================================================
