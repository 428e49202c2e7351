//! Tile engine: owns the atlas, cell table and shift table, and turns
//! cells into output tiles.

use log::debug;
use tilesmith_atlas::{CellCoord, CellDescriptor, CellTable, SourceAtlas, FULL_HEIGHT_WALL_TOP};

use crate::accumulator::Accumulator;
use crate::mapper::{CoordinateMap, TileSize};
use crate::raster;
use crate::shifts::ShiftTable;
use crate::surface::AtlasSurface;
use crate::synth::{self, WaveCounts};

/// The engine context: everything needed to rasterize tiles.
pub struct TileEngine {
    atlas: SourceAtlas,
    cells: CellTable,
    shifts: ShiftTable,
}

impl TileEngine {
    /// Inspect `atlas` and start with an uncalibrated shift table.
    pub fn new(atlas: SourceAtlas) -> Self {
        Self::with_shifts(atlas, ShiftTable::zeroed())
    }

    pub fn with_shifts(atlas: SourceAtlas, shifts: ShiftTable) -> Self {
        let cells = CellTable::inspect(&atlas);
        Self {
            atlas,
            cells,
            shifts,
        }
    }

    pub fn atlas(&self) -> &SourceAtlas {
        &self.atlas
    }

    pub fn cells(&self) -> &CellTable {
        &self.cells
    }

    pub fn descriptor(&self, cell: CellCoord) -> &CellDescriptor {
        self.cells.get(cell)
    }

    pub fn shifts(&self) -> &ShiftTable {
        &self.shifts
    }

    pub fn shifts_mut(&mut self) -> &mut ShiftTable {
        &mut self.shifts
    }

    pub fn set_shifts(&mut self, shifts: ShiftTable) {
        self.shifts = shifts;
    }

    /// Cells worth drawing: anything with ink, plus the procedural cells.
    pub fn is_drawable(&self, cell: CellCoord) -> bool {
        !self.cells.get(cell).is_empty || cell.is_procedural()
    }

    /// Rasterize one cell into its slot on `surface`.
    ///
    /// `fit` is the box the glyph must fit into (the base tile size); the
    /// surface's own tile size may be one pixel larger on either axis.
    /// Returns the blur score, which is only accumulated while
    /// `optimizing`.
    pub fn prepare_tile(
        &self,
        surface: &mut AtlasSurface,
        fit: TileSize,
        cell: CellCoord,
        optimizing: bool,
    ) -> f64 {
        let desc = self.cells.get(cell);
        let tile = surface.tile_size();
        let fit = fit.at_least_one();
        let mut acc = Accumulator::new(tile.width, tile.height);

        if !desc.is_empty {
            let map = CoordinateMap::build(desc, cell, fit, tile, &self.shifts, optimizing);
            raster::accumulate(&self.atlas, cell, &map, &mut acc);
        }

        if !optimizing {
            if cell.is_floor() && desc.is_empty && tile.width > 2 && tile.height > 2 {
                synth::add_floor_dust(&mut acc);
            }
            if cell.is_wall_top() {
                synth::add_wall_tops(&mut acc, WaveCounts::for_fit(fit), cell == FULL_HEIGHT_WALL_TOP);
            }
        }

        raster::resolve(&acc, surface, cell, desc.mode, optimizing)
    }

    /// Rasterize every cell at `tile` size, glyphs fitted into `fit`.
    ///
    /// `None` when `tile` has a zero dimension.
    pub fn render_atlas(&self, tile: TileSize, fit: TileSize) -> Option<AtlasSurface> {
        let mut surface = AtlasSurface::new(tile)?;
        for cell in CellCoord::all() {
            self.prepare_tile(&mut surface, fit, cell, false);
        }
        debug!(
            "Rendered atlas: tiles {}×{} (fit {}×{}), surface {}×{}",
            tile.width,
            tile.height,
            fit.width,
            fit.height,
            surface.width(),
            surface.height()
        );
        Some(surface)
    }
}

// ===================================================================
// Tests
// ===================================================================
