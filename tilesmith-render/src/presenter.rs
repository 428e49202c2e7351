//! Presenter: draws the screen grid through a [`RenderBackend`].
//!
//! ```text
//! on_output_resize(W, H) ──► base = (W / cols, H / rows)
//!                                 │ changed?
//!                                 ▼
//!                        TextureSet::rebuild()
//!
//! render_frame():
//!     clear(black)
//!     for each cell: fill_rect(bg)            (non-black only)
//!     for each cell: set_texture_tint(fg)
//!                    draw_texture(src, dest)  (drawable glyphs only)
//!     present()
//! ```

use log::info;
use thiserror::Error;
use tilesmith_atlas::CellCoord;
use tilesmith_raster::{TileEngine, TileSize};

use crate::backend::{BackendError, PixelRect, RenderBackend, TextureId};
use crate::grid::{GridSize, ScreenGrid, ScreenTile};
use crate::textures::TextureSet;

#[derive(Error, Debug)]
pub enum PresentError {
    #[error("Cell ({row}, {col}) is outside the {rows}×{cols} grid")]
    CellOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("Glyph {0} is outside the atlas")]
    GlyphOutOfRange(u16),
    #[error("Colour component {0}% is above 100%")]
    ColorOutOfRange(u8),
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Frame statistics returned after each render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Background fills issued.
    pub fills: u32,
    /// Tile blits issued.
    pub blits: u32,
    /// Cells skipped for having a zero-area rectangle.
    pub skipped: u32,
}

/// Owns the tile engine, the screen grid and the current texture set.
pub struct Presenter<B: RenderBackend> {
    engine: TileEngine,
    backend: B,
    grid: ScreenGrid,
    textures: TextureSet,
    output: (u32, u32),
}

impl<B: RenderBackend> Presenter<B> {
    pub fn new(engine: TileEngine, backend: B, grid: GridSize) -> Self {
        Self {
            engine,
            backend,
            grid: ScreenGrid::new(grid),
            textures: TextureSet::new(),
            output: (0, 0),
        }
    }

    pub fn engine(&self) -> &TileEngine {
        &self.engine
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn grid(&self) -> &ScreenGrid {
        &self.grid
    }

    pub fn textures(&self) -> &TextureSet {
        &self.textures
    }

    /// Current output size in pixels.
    pub fn output_size(&self) -> (u32, u32) {
        self.output
    }

    /// Base tile size for an output size.
    pub fn base_tile_size(&self, width: u32, height: u32) -> TileSize {
        let grid = self.grid.size();
        TileSize::new(
            width as usize / grid.cols.max(1),
            height as usize / grid.rows.max(1),
        )
    }

    /// Record the new output size, rebuilding textures when the base tile
    /// size changes. Returns whether a rebuild happened.
    pub fn on_output_resize(&mut self, width: u32, height: u32) -> Result<bool, BackendError> {
        self.output = (width, height);
        let base = self.base_tile_size(width, height);
        if self.textures.base() == Some(base) {
            return Ok(false);
        }
        info!(
            "Output resized to {width}×{height}, base tile {}×{}",
            base.width, base.height
        );
        self.textures.rebuild(&self.engine, &mut self.backend, base)?;
        Ok(true)
    }

    /// Set one cell: glyph index and foreground/background as percentages.
    pub fn set_cell(
        &mut self,
        row: usize,
        col: usize,
        glyph: u16,
        fg: [u8; 3],
        bg: [u8; 3],
    ) -> Result<(), PresentError> {
        let size = self.grid.size();
        let glyph = CellCoord::from_glyph(glyph).ok_or(PresentError::GlyphOutOfRange(glyph))?;
        if let Some(&pct) = fg.iter().chain(&bg).find(|&&c| c > 100) {
            return Err(PresentError::ColorOutOfRange(pct));
        }
        let tile = self.grid.get_mut(row, col).ok_or(PresentError::CellOutOfRange {
            row,
            col,
            rows: size.rows,
            cols: size.cols,
        })?;
        *tile = ScreenTile { glyph, fg, bg };
        Ok(())
    }

    /// Fill every cell with the same state.
    pub fn fill(&mut self, tile: ScreenTile) {
        self.grid.fill(tile);
    }

    /// The texture a `width × height` cell would be drawn from.
    pub fn get_texture(&self, width: usize, height: usize) -> Option<TextureId> {
        self.textures.get(width, height).map(|(id, _)| id)
    }

    /// Output rectangle of a cell.
    pub fn cell_rect(&self, row: usize, col: usize) -> PixelRect {
        let grid = self.grid.size();
        let (w, h) = (self.output.0 as u64, self.output.1 as u64);
        let (cols, rows) = (grid.cols.max(1) as u64, grid.rows.max(1) as u64);
        let (col, row) = (col as u64, row as u64);
        let x0 = col * w / cols;
        let x1 = (col + 1) * w / cols;
        let y0 = row * h / rows;
        let y1 = (row + 1) * h / rows;
        PixelRect::new(x0 as i32, y0 as i32, (x1 - x0) as u32, (y1 - y0) as u32)
    }

    /// Draw the whole grid and present it.
    pub fn render_frame(&mut self) -> Result<FrameStats, PresentError> {
        let mut stats = FrameStats::default();
        self.backend.clear([0, 0, 0]);

        // ── Backgrounds ──────────────────────────────────────────
        for (row, col, tile) in self.grid.iter() {
            let dest = self.cell_rect(row, col);
            if dest.is_empty() {
                stats.skipped += 1;
                continue;
            }
            let bg = tile.bg_rgb();
            if bg != [0, 0, 0] {
                self.backend.fill_rect(dest, bg);
                stats.fills += 1;
            }
        }

        // ── Foregrounds ──────────────────────────────────────────
        for (row, col, tile) in self.grid.iter() {
            let dest = self.cell_rect(row, col);
            if dest.is_empty() || !self.engine.is_drawable(tile.glyph) {
                continue;
            }
            let Some((id, size)) = self
                .textures
                .get(dest.width as usize, dest.height as usize)
            else {
                continue;
            };
            let src = PixelRect::new(
                (tile.glyph.col * size.width) as i32,
                (tile.glyph.row * size.height) as i32,
                size.width as u32,
                size.height as u32,
            );
            self.backend.set_texture_tint(id, tile.fg_rgb())?;
            self.backend.draw_texture(id, src, dest)?;
            stats.blits += 1;
        }

        self.backend.present()?;
        Ok(stats)
    }

    /// Drop all textures; the next resize rebuilds them.
    pub fn release_textures(&mut self) {
        self.textures.clear(&mut self.backend);
    }
}

/// Output size that gives exact `base` tiles on a `grid`.
pub fn output_for_base(base: TileSize, grid: GridSize) -> (u32, u32) {
    ((base.width * grid.cols) as u32, (base.height * grid.rows) as u32)
}

// ===================================================================
// Tests
// ===================================================================
