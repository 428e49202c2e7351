//! Application state: owns the presenter and the screen it shows.

use log::debug;
use tilesmith_atlas::{CellCoord, FLOOR_CELL, FULL_HEIGHT_WALL_TOP};
use tilesmith_raster::TileEngine;
use tilesmith_render::{
    BackendError, FrameStats, GpuBackend, GpuContext, GridSize, PresentError, Presenter,
    RenderBackend,
};

const WALL: CellCoord = FULL_HEIGHT_WALL_TOP;
const WALL_FG: [u8; 3] = [62, 56, 48];
const WALL_BG: [u8; 3] = [22, 19, 16];
const FLOOR_FG: [u8; 3] = [38, 38, 44];
const FLOOR_BG: [u8; 3] = [6, 6, 8];
const TITLE_FG: [u8; 3] = [100, 85, 30];
const HINT_FG: [u8; 3] = [60, 60, 60];

pub struct AppState {
    presenter: Presenter<GpuBackend>,
    frame_count: u64,
}

impl AppState {
    /// Build the presenter on `gpu` and size it to the current surface.
    pub fn new(engine: TileEngine, gpu: GpuContext, grid: GridSize) -> Result<Self, PresentError> {
        let (width, height) = gpu.surface_size();
        let mut presenter = Presenter::new(engine, GpuBackend::new(gpu), grid);
        demo_screen(&mut presenter)?;
        presenter.on_output_resize(width, height)?;
        Ok(Self {
            presenter,
            frame_count: 0,
        })
    }

    /// Follow a window resize. Zero sizes (minimized) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.presenter.backend_mut().resize(width, height);
        self.presenter.on_output_resize(width, height)?;
        Ok(())
    }

    pub fn render_frame(&mut self) -> Result<FrameStats, PresentError> {
        let stats = self.presenter.render_frame()?;
        self.frame_count += 1;
        debug!(
            "Frame {}: {} fills, {} blits, {} skipped",
            self.frame_count, stats.fills, stats.blits, stats.skipped
        );
        Ok(stats)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn presenter(&self) -> &Presenter<GpuBackend> {
        &self.presenter
    }
}

/// A walled room with a title line over the procedural floor.
pub fn demo_screen<B: RenderBackend>(presenter: &mut Presenter<B>) -> Result<(), PresentError> {
    let GridSize { cols, rows } = presenter.grid().size();
    for row in 0..rows {
        for col in 0..cols {
            let edge = row == 0 || col == 0 || row + 1 == rows || col + 1 == cols;
            if edge {
                presenter.set_cell(row, col, WALL.glyph(), WALL_FG, WALL_BG)?;
            } else {
                presenter.set_cell(row, col, FLOOR_CELL.glyph(), FLOOR_FG, FLOOR_BG)?;
            }
        }
    }
    write_text(presenter, 1, 2, "TILESMITH", TITLE_FG)?;
    if rows > 4 {
        write_text(presenter, rows - 2, 2, "Esc to quit", HINT_FG)?;
    }
    Ok(())
}

/// ASCII text on the room floor; clipped so the walls stay intact.
fn write_text<B: RenderBackend>(
    presenter: &mut Presenter<B>,
    row: usize,
    col: usize,
    text: &str,
    fg: [u8; 3],
) -> Result<(), PresentError> {
    let size = presenter.grid().size();
    if row == 0 || row + 1 >= size.rows {
        return Ok(());
    }
    for (i, byte) in text.bytes().enumerate() {
        let col = col + i;
        if col + 1 >= size.cols {
            break;
        }
        presenter.set_cell(row, col, byte as u16, fg, FLOOR_BG)?;
    }
    Ok(())
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tilesmith_atlas::SourceAtlas;
    use tilesmith_raster::AtlasSurface;
    use tilesmith_render::{PixelRect, TextureFilter, TextureId};

    struct NoopBackend;

    impl RenderBackend for NoopBackend {
        fn create_texture(&mut self, _: &AtlasSurface, _: TextureFilter) -> Result<TextureId, BackendError> {
            Ok(TextureId(1))
        }
        fn destroy_texture(&mut self, _: TextureId) {}
        fn set_texture_tint(&mut self, _: TextureId, _: [u8; 3]) -> Result<(), BackendError> {
            Ok(())
        }
        fn clear(&mut self, _: [u8; 3]) {}
        fn fill_rect(&mut self, _: PixelRect, _: [u8; 3]) {}
        fn draw_texture(&mut self, _: TextureId, _: PixelRect, _: PixelRect) -> Result<(), BackendError> {
            Ok(())
        }
        fn present(&mut self) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn presenter(grid: GridSize) -> Presenter<NoopBackend> {
        Presenter::new(TileEngine::new(SourceAtlas::blank()), NoopBackend, grid)
    }

    #[test]
    fn test_demo_screen_layout() {
        let mut p = presenter(GridSize::new(20, 6));
        demo_screen(&mut p).unwrap();
        let grid = p.grid();

        assert_eq!(grid.get(0, 0).unwrap().glyph, WALL);
        assert_eq!(grid.get(5, 19).unwrap().glyph, WALL);
        assert_eq!(grid.get(2, 5).unwrap().glyph, FLOOR_CELL);
        assert_eq!(grid.get(2, 5).unwrap().bg, FLOOR_BG);

        let title: String = (2..11)
            .map(|c| grid.get(1, c).unwrap().glyph.glyph() as u8 as char)
            .collect();
        assert_eq!(title, "TILESMITH");
        assert_eq!(grid.get(4, 2).unwrap().glyph, CellCoord::from_glyph(b'E' as u16).unwrap());
    }

    #[test]
    fn test_demo_text_clipped_to_room() {
        let mut p = presenter(GridSize::new(8, 3));
        demo_screen(&mut p).unwrap();
        let grid = p.grid();
        // "TILES" fits between the walls; the rest is dropped.
        assert_eq!(grid.get(1, 6).unwrap().glyph, CellCoord::from_glyph(b'S' as u16).unwrap());
        assert_eq!(grid.get(1, 7).unwrap().glyph, WALL);
    }

    #[test]
    fn test_demo_screen_tiny_grid() {
        let mut p = presenter(GridSize::new(2, 1));
        demo_screen(&mut p).unwrap();
        assert_eq!(p.grid().get(0, 1).unwrap().glyph, WALL);
    }
}
