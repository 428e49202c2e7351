//! RGBA output surface holding a whole atlas at one tile size.

use tilesmith_atlas::{CellCoord, TILE_COLS, TILE_ROWS};

use crate::mapper::TileSize;

/// `tile.width * TILE_COLS × tile.height * TILE_ROWS` RGBA8 pixels.
///
/// Every pixel is white; only the alpha channel carries the glyph.
#[derive(Clone, PartialEq, Eq)]
pub struct AtlasSurface {
    tile: TileSize,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for AtlasSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtlasSurface")
            .field("tile", &self.tile)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl AtlasSurface {
    /// Allocate a transparent surface. `None` when either tile dimension is 0.
    pub fn new(tile: TileSize) -> Option<Self> {
        if tile.is_empty() {
            return None;
        }
        let len = tile.width * TILE_COLS * tile.height * TILE_ROWS * 4;
        Some(Self {
            tile,
            pixels: vec![0; len],
        })
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile
    }

    pub fn width(&self) -> usize {
        self.tile.width * TILE_COLS
    }

    pub fn height(&self) -> usize {
        self.tile.height * TILE_ROWS
    }

    /// Raw RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Alpha of a pixel inside a cell's tile.
    pub fn tile_alpha(&self, cell: CellCoord, x: usize, y: usize) -> u8 {
        self.pixels[self.offset(cell, x, y) + 3]
    }

    /// All alpha values of one cell's tile, row-major.
    pub fn tile_alphas(&self, cell: CellCoord) -> Vec<u8> {
        (0..self.tile.height)
            .flat_map(|y| (0..self.tile.width).map(move |x| (x, y)))
            .map(|(x, y)| self.tile_alpha(cell, x, y))
            .collect()
    }

    /// Write one white pixel with the given alpha.
    pub fn put(&mut self, cell: CellCoord, x: usize, y: usize, alpha: u8) {
        let at = self.offset(cell, x, y);
        self.pixels[at..at + 4].copy_from_slice(&[255, 255, 255, alpha]);
    }

    fn offset(&self, cell: CellCoord, x: usize, y: usize) -> usize {
        let px = cell.col * self.tile.width + x;
        let py = cell.row * self.tile.height + y;
        (py * self.width() + px) * 4
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sized_surface_is_none() {
        assert!(AtlasSurface::new(TileSize::new(0, 10)).is_none());
        assert!(AtlasSurface::new(TileSize::new(10, 0)).is_none());
    }

    #[test]
    fn test_surface_dimensions() {
        let s = AtlasSurface::new(TileSize::new(10, 18)).unwrap();
        assert_eq!(s.width(), 160);
        assert_eq!(s.height(), 432);
        assert_eq!(s.pixels().len(), 160 * 432 * 4);
    }

    #[test]
    fn test_put_addresses_cell() {
        let mut s = AtlasSurface::new(TileSize::new(4, 5)).unwrap();
        let cell = CellCoord::new(2, 3);
        s.put(cell, 1, 2, 99);
        assert_eq!(s.tile_alpha(cell, 1, 2), 99);
        let at = ((2 * 5 + 2) * s.width() + 3 * 4 + 1) * 4;
        assert_eq!(&s.pixels()[at..at + 4], &[255, 255, 255, 99]);
        assert_eq!(s.tile_alphas(cell).iter().filter(|&&a| a != 0).count(), 1);
    }
}
