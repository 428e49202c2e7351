//! Coordinate Mapper: source pixel → target pixel lookup tables.
//!
//! Each axis is split at five *stops*. Between two stops the mapping is
//! linear; the target position of each stop (its *anchor*) is where the
//! alignment rules live:
//!
//! ```text
//! source x:  0 ──── 20% ──────── 50% ──────── 80% ──── 100%
//!            │       │            │            │        │
//! target:   a0   a1 + s0/10   a2 + s2/10   a3 + s1/10   a4
//! ```
//!
//! Horizontally the stops are percentages of the cell width. Vertically,
//! text cells use the baseline and x-height instead, and other cells use
//! percentages of the height left after removing the padding. Rows inside
//! the padding are not mapped at all.

use tilesmith_atlas::{
    CellCoord, CellDescriptor, ProcessingMode, TEXT_BASELINE, TEXT_X_HEIGHT, TILE_HEIGHT, TILE_WIDTH,
};

use crate::shifts::{Axis, ShiftTable};

/// Width × height in output pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TileSize {
    pub width: usize,
    pub height: usize,
}

impl TileSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Clamp both dimensions to at least one pixel.
    pub fn at_least_one(self) -> Self {
        Self::new(self.width.max(1), self.height.max(1))
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Lookup tables produced for one (cell, fit box, tile size) combination.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateMap {
    /// Size of the scaled glyph inside the fit box.
    pub glyph: TileSize,
    /// Target column for each source column (may fall outside the tile).
    pub scaled_x: Vec<i32>,
    /// Target row for each source row; `None` for padding rows.
    pub scaled_y: Vec<Option<i32>>,
}

/// How large the glyph may be drawn inside `fit`.
///
/// Stretch cells are handled by the caller (the glyph simply fills the
/// tile); this covers Fit and the two text modes.
pub fn glyph_size(mode: ProcessingMode, padding: u8, fit: TileSize) -> TileSize {
    let fit = fit.at_least_one();
    let (fw, fh) = (fit.width as f64, fit.height as f64);
    let (tw, th) = (TILE_WIDTH as f64, TILE_HEIGHT as f64);
    let clamp = |v: f64, max: usize| (v.round() as usize).clamp(1, max);

    match mode {
        ProcessingMode::Stretch => fit,
        ProcessingMode::Fit => {
            let inked = (TILE_HEIGHT - 2 * padding as usize) as f64;
            let stretch = ((fw * th) / (fh * tw)).clamp(1.0, 1.2);
            TileSize::new(
                clamp(1.2 * fh * tw / inked, fit.width),
                clamp(stretch * fw * inked / tw, fit.height),
            )
        }
        ProcessingMode::Text | ProcessingMode::TextSubpixel => TileSize::new(
            clamp(1.4 * fh * tw / th, fit.width),
            clamp(1.4 * fw * th / tw, fit.height),
        ),
    }
}

/// Horizontal stops: 0%, 20%, 50%, 80%, 100% of the cell width.
fn horizontal_stops() -> [usize; 5] {
    [0, TILE_WIDTH / 5, TILE_WIDTH / 2, TILE_WIDTH * 4 / 5, TILE_WIDTH]
}

/// Vertical stops for a cell.
pub fn vertical_stops(mode: ProcessingMode, padding: u8) -> [usize; 5] {
    if mode.is_text() {
        let baseline = TILE_HEIGHT - TEXT_BASELINE;
        let x_top = baseline - TEXT_X_HEIGHT;
        [0, x_top / 3, x_top, baseline, TILE_HEIGHT]
    } else {
        let top = padding as usize;
        let bottom = TILE_HEIGHT - top;
        let span = bottom - top;
        [top, top + span / 5, top + span / 2, top + span * 4 / 5, bottom]
    }
}

/// Anchors proportional to the stops, starting at `origin`.
fn proportional_anchors(origin: f64, glyph: usize, stops: &[usize; 5]) -> [f64; 5] {
    let span = (stops[4] - stops[0]) as f64;
    let mut anchors = [origin; 5];
    for i in 1..4 {
        anchors[i] = origin + glyph as f64 * (stops[i] - stops[0]) as f64 / span;
    }
    anchors[4] = origin + glyph as f64;
    anchors
}

/// Perturb the interior anchors by a calibrated shift triple.
fn apply_shifts(anchors: &mut [f64; 5], shifts: [i8; 3]) {
    anchors[1] += shifts[0] as f64 * 0.1;
    anchors[2] += shifts[2] as f64 * 0.1;
    anchors[3] += shifts[1] as f64 * 0.1;
}

/// Snap the x-height and baseline anchors to whole target pixels.
fn snap_to_baseline(anchors: &mut [f64; 5]) {
    anchors[3] += anchors[2].round() - anchors[2];
    anchors[2] = anchors[2].round();
    anchors[3] = (anchors[2] + 1.0).max(anchors[3].round());
    anchors[1] = anchors[0] + (anchors[2] - anchors[0]) / 3.0;
}

/// Piecewise-linear interpolation, truncated toward zero.
fn interpolate(stops: &[usize; 5], anchors: &[f64; 5], out: &mut [Option<i32>]) {
    for seg in 0..4 {
        let (s0, s1) = (stops[seg], stops[seg + 1]);
        let (a0, a1) = (anchors[seg], anchors[seg + 1]);
        for (i, slot) in out[s0..s1].iter_mut().enumerate() {
            *slot = Some((a0 + (a1 - a0) * i as f64 / (s1 - s0) as f64) as i32);
        }
    }
}

impl CoordinateMap {
    /// Build the mapping for `cell` scaled into a `tile`-sized output whose
    /// glyph must fit into `fit`.
    ///
    /// While optimizing, and for Stretch cells, the glyph fills the tile.
    pub fn build(
        desc: &CellDescriptor,
        cell: CellCoord,
        fit: TileSize,
        tile: TileSize,
        shifts: &ShiftTable,
        optimizing: bool,
    ) -> Self {
        let (fit, glyph) = if desc.mode == ProcessingMode::Stretch || optimizing {
            let tile = tile.at_least_one();
            (tile, tile)
        } else {
            let fit = fit.at_least_one();
            (fit, glyph_size(desc.mode, desc.padding, fit))
        };

        // ── Horizontal ───────────────────────────────────────────
        let stops = horizontal_stops();
        let origin = ((fit.width - glyph.width) / 2) as f64;
        let mut anchors = proportional_anchors(origin, glyph.width, &stops);
        apply_shifts(&mut anchors, shifts.get(cell, Axis::Horizontal, glyph.width));

        let mut scaled_x = vec![None; TILE_WIDTH];
        interpolate(&stops, &anchors, &mut scaled_x);
        let scaled_x = scaled_x.into_iter().map(|x| x.unwrap_or(0)).collect();

        // ── Vertical ─────────────────────────────────────────────
        let stops = vertical_stops(desc.mode, desc.padding);
        let origin = ((fit.height - glyph.height) / 2) as f64;
        let mut anchors = proportional_anchors(origin, glyph.height, &stops);
        if desc.mode == ProcessingMode::Text {
            snap_to_baseline(&mut anchors);
        }
        apply_shifts(&mut anchors, shifts.get(cell, Axis::Vertical, glyph.height));

        let mut scaled_y = vec![None; TILE_HEIGHT];
        interpolate(&stops, &anchors, &mut scaled_y);

        Self {
            glyph,
            scaled_x,
            scaled_y,
        }
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(mode: ProcessingMode, padding: u8) -> CellDescriptor {
        CellDescriptor {
            is_empty: false,
            padding,
            mode,
        }
    }

    #[test]
    fn test_text_glyph_size_limited_by_height() {
        // 1.4 × 16 × 128 / 232 = 12.36 → 12, width limited by fit width 10.
        let g = glyph_size(ProcessingMode::Text, 0, TileSize::new(10, 16));
        assert_eq!(g, TileSize::new(10, 16));
        let g = glyph_size(ProcessingMode::Text, 0, TileSize::new(20, 16));
        assert_eq!(g, TileSize::new(12, 16));
    }

    #[test]
    fn test_fit_glyph_size_respects_box() {
        let g = glyph_size(ProcessingMode::Fit, 20, TileSize::new(10, 18));
        assert!(g.width <= 10 && g.height <= 18);
        assert!(g.width >= 1 && g.height >= 1);
    }

    #[test]
    fn test_fit_glyph_size_exact() {
        // inked 192, stretch 1.0069: 14.4 → 10 (box), 15.10 → 15
        assert_eq!(glyph_size(ProcessingMode::Fit, 20, TileSize::new(10, 18)), TileSize::new(10, 15));
        // stretch capped at 1.2: 14.4 → 14, 36 → 18 (box)
        assert_eq!(glyph_size(ProcessingMode::Fit, 20, TileSize::new(20, 18)), TileSize::new(14, 18));
        // stretch floored at 1.0: 19.86 → 10 (box), 18.125 → 18
        assert_eq!(glyph_size(ProcessingMode::Fit, 0, TileSize::new(10, 30)), TileSize::new(10, 18));
    }

    #[test]
    fn test_glyph_size_clamps_zero_box() {
        let g = glyph_size(ProcessingMode::Text, 0, TileSize::new(0, 0));
        assert_eq!(g, TileSize::new(1, 1));
    }

    #[test]
    fn test_text_vertical_stops() {
        assert_eq!(vertical_stops(ProcessingMode::Text, 0), [0, 29, 89, 185, 232]);
        assert_eq!(vertical_stops(ProcessingMode::TextSubpixel, 9), [0, 29, 89, 185, 232]);
    }

    #[test]
    fn test_padded_vertical_stops() {
        // span = 232 - 40 = 192
        assert_eq!(vertical_stops(ProcessingMode::Fit, 20), [20, 58, 116, 173, 212]);
    }

    #[test]
    fn test_stretch_fills_tile_and_is_monotonic() {
        let tile = TileSize::new(10, 18);
        let map = CoordinateMap::build(
            &descriptor(ProcessingMode::Stretch, 0),
            CellCoord::new(16, 2),
            TileSize::new(3, 3),
            tile,
            &ShiftTable::zeroed(),
            false,
        );
        assert_eq!(map.glyph, tile);
        assert_eq!(map.scaled_x[0], 0);
        assert_eq!(*map.scaled_x.last().unwrap(), 9);
        assert!(map.scaled_x.windows(2).all(|w| w[0] <= w[1]));
        let ys: Vec<i32> = map.scaled_y.iter().map(|y| y.unwrap()).collect();
        assert_eq!(ys[0], 0);
        assert_eq!(*ys.last().unwrap(), 17);
        assert!(ys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_padding_rows_unmapped() {
        let map = CoordinateMap::build(
            &descriptor(ProcessingMode::Fit, 30),
            CellCoord::new(0, 0),
            TileSize::new(12, 20),
            TileSize::new(12, 20),
            &ShiftTable::zeroed(),
            false,
        );
        for y in 0..30 {
            assert_eq!(map.scaled_y[y], None, "top padding row {y} mapped");
            assert_eq!(map.scaled_y[TILE_HEIGHT - 1 - y], None, "bottom padding row mapped");
        }
        assert!(map.scaled_y[30].is_some());
        assert!(map.scaled_y[TILE_HEIGHT - 31].is_some());
    }

    #[test]
    fn test_glyph_centred_horizontally() {
        // Text glyph 12 wide inside a 20-wide box → origin (20 - 12) / 2 = 4.
        let map = CoordinateMap::build(
            &descriptor(ProcessingMode::Text, 0),
            CellCoord::new(4, 1),
            TileSize::new(20, 16),
            TileSize::new(20, 16),
            &ShiftTable::zeroed(),
            false,
        );
        assert_eq!(map.glyph.width, 12);
        assert_eq!(map.scaled_x[0], 4);
        assert_eq!(*map.scaled_x.last().unwrap(), 15);
    }

    #[test]
    fn test_text_baseline_snapped_to_pixel() {
        // With snapping, the first source row of the baseline segment lands
        // exactly on an integer anchor: it must be the first row mapped there.
        let map = CoordinateMap::build(
            &descriptor(ProcessingMode::Text, 0),
            CellCoord::new(4, 1),
            TileSize::new(9, 17),
            TileSize::new(9, 17),
            &ShiftTable::zeroed(),
            false,
        );
        let stops = vertical_stops(ProcessingMode::Text, 0);
        let at_x_top = map.scaled_y[stops[2]].unwrap();
        assert!(map.scaled_y[stops[2] - 1].unwrap() < at_x_top);
        let at_baseline = map.scaled_y[stops[3]].unwrap();
        assert!(map.scaled_y[stops[3] - 1].unwrap() < at_baseline);
    }

    #[test]
    fn test_subpixel_text_keeps_fractional_anchors() {
        // Glyph 9×17: x-height anchor 17 × 89 / 232 = 6.52, baseline 13.56.
        let build = |mode| {
            CoordinateMap::build(
                &descriptor(mode, 0),
                CellCoord::new(4, 1),
                TileSize::new(9, 17),
                TileSize::new(9, 17),
                &ShiftTable::zeroed(),
                false,
            )
        };
        let text = build(ProcessingMode::Text);
        let subpixel = build(ProcessingMode::TextSubpixel);
        assert_eq!(text.glyph, subpixel.glyph);
        assert_eq!(text.scaled_x, subpixel.scaled_x);

        let stops = vertical_stops(ProcessingMode::Text, 0);
        // Snapped: 6.52 → 7 and the baseline moves with it to 14.
        assert_eq!(text.scaled_y[stops[2]], Some(7));
        assert_eq!(text.scaled_y[stops[3]], Some(14));
        // Unsnapped anchors truncate.
        assert_eq!(subpixel.scaled_y[stops[2]], Some(6));
        assert_eq!(subpixel.scaled_y[stops[3]], Some(13));
        assert_ne!(text.scaled_y, subpixel.scaled_y);
    }

    #[test]
    fn test_shift_moves_interior_anchor() {
        let cell = CellCoord::new(0, 3);
        let desc = descriptor(ProcessingMode::Stretch, 0);
        let tile = TileSize::new(8, 8);
        let plain = CoordinateMap::build(&desc, cell, tile, tile, &ShiftTable::zeroed(), false);

        let mut shifts = ShiftTable::zeroed();
        shifts
            .slot_mut(cell, Axis::Horizontal, 8)
            .unwrap()
            .copy_from_slice(&[0, 0, 9]);
        let shifted = CoordinateMap::build(&desc, cell, tile, tile, &shifts, false);

        // Stop 50% moves from 4.0 to 4.9: source column 63 now maps further right.
        assert!(shifted.scaled_x[63] >= plain.scaled_x[63]);
        assert_ne!(shifted.scaled_x, plain.scaled_x);
        assert_eq!(shifted.scaled_x[0], 0);
    }

    #[test]
    fn test_oversized_glyph_uses_zero_shifts() {
        let cell = CellCoord::new(0, 3);
        let desc = descriptor(ProcessingMode::Stretch, 0);
        let tile = TileSize::new(90, 90);
        let map = CoordinateMap::build(&desc, cell, tile, tile, &ShiftTable::zeroed(), false);
        assert_eq!(map.glyph, tile);
        assert_eq!(*map.scaled_x.last().unwrap(), 89);
    }
}
