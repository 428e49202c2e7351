//! Screen tile grid: per-cell display state set by the caller between
//! frames.

use tilesmith_atlas::CellCoord;

/// Grid dimensions in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub cols: usize,
    pub rows: usize,
}

impl GridSize {
    pub const fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(100, 34)
    }
}

/// Percentage (0–100) to an 8-bit channel, truncating.
pub fn percent_to_channel(pct: u8) -> u8 {
    (pct as u32 * 255 / 100) as u8
}

/// One screen cell. Colours are percentages, 0–100 per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenTile {
    pub glyph: CellCoord,
    pub fg: [u8; 3],
    pub bg: [u8; 3],
}

impl Default for ScreenTile {
    fn default() -> Self {
        Self {
            // ' '
            glyph: CellCoord::new(2, 0),
            fg: [0; 3],
            bg: [0; 3],
        }
    }
}

impl ScreenTile {
    pub fn fg_rgb(&self) -> [u8; 3] {
        self.fg.map(percent_to_channel)
    }

    pub fn bg_rgb(&self) -> [u8; 3] {
        self.bg.map(percent_to_channel)
    }
}

/// Row-major grid of [`ScreenTile`]s.
#[derive(Clone, Debug)]
pub struct ScreenGrid {
    size: GridSize,
    tiles: Vec<ScreenTile>,
}

impl ScreenGrid {
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            tiles: vec![ScreenTile::default(); size.cell_count()],
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&ScreenTile> {
        self.index(row, col).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut ScreenTile> {
        self.index(row, col).map(|i| &mut self.tiles[i])
    }

    /// `(row, col, tile)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &ScreenTile)> + '_ {
        let cols = self.size.cols.max(1);
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, t)| (i / cols, i % cols, t))
    }

    pub fn fill(&mut self, tile: ScreenTile) {
        self.tiles.fill(tile);
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.size.rows && col < self.size.cols).then(|| row * self.size.cols + col)
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_size() {
        assert_eq!(GridSize::default(), GridSize::new(100, 34));
        assert_eq!(GridSize::default().cell_count(), 3400);
    }

    #[test]
    fn test_percent_conversion() {
        assert_eq!(percent_to_channel(0), 0);
        assert_eq!(percent_to_channel(50), 127);
        assert_eq!(percent_to_channel(100), 255);
    }

    #[test]
    fn test_grid_bounds() {
        let mut grid = ScreenGrid::new(GridSize::new(3, 2));
        assert!(grid.get(1, 2).is_some());
        assert!(grid.get(2, 0).is_none());
        assert!(grid.get(0, 3).is_none());
        grid.get_mut(1, 2).unwrap().fg = [100, 0, 0];
        assert_eq!(grid.get(1, 2).unwrap().fg_rgb(), [255, 0, 0]);
    }

    #[test]
    fn test_iter_row_major() {
        let grid = ScreenGrid::new(GridSize::new(3, 2));
        let coords: Vec<(usize, usize)> = grid.iter().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }
}
