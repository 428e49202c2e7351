//! Atlas geometry and per-cell processing modes.
//!
//! The source spritesheet is a 16 × 24 grid of 128 × 232 px cells. Glyph
//! index `n` lives at row `n / 16`, column `n % 16`, so printable ASCII
//! characters index the atlas directly.

/// Width (px) of a single cell in the source atlas.
pub const TILE_WIDTH: usize = 128;
/// Height (px) of a single cell in the source atlas.
pub const TILE_HEIGHT: usize = 232;
/// Number of cell rows in the source atlas.
pub const TILE_ROWS: usize = 24;
/// Number of cell columns in the source atlas.
pub const TILE_COLS: usize = 16;

/// Width (px) of the whole source atlas.
pub const ATLAS_WIDTH: usize = TILE_COLS * TILE_WIDTH;
/// Height (px) of the whole source atlas.
pub const ATLAS_HEIGHT: usize = TILE_ROWS * TILE_HEIGHT;

/// Height (px) of the 'x' outline in text cells.
pub const TEXT_X_HEIGHT: usize = 96;
/// Height (px) of the blank space below the 'x' outline.
pub const TEXT_BASELINE: usize = 47;

/// Largest output tile width or height with calibrated shifts.
pub const MAX_TILE_SIZE: usize = 64;

/// Deepest padding the inspector will report.
pub const MAX_PADDING: usize = TILE_HEIGHT / 4;

/// How a source cell is scaled down to an output tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessingMode {
    /// Fill the output tile exactly.
    Stretch,
    /// Keep the aspect ratio, allowing up to 20% distortion.
    Fit,
    /// Line characters up on a shared baseline (up to 40% distortion).
    Text,
    /// Like `Text`, without snapping the baseline to whole pixels.
    TextSubpixel,
}

impl ProcessingMode {
    /// Parse a processing table code (`s`, `f`, `t`, `#`).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b's' => Some(Self::Stretch),
            b'f' => Some(Self::Fit),
            b't' => Some(Self::Text),
            b'#' => Some(Self::TextSubpixel),
            _ => None,
        }
    }

    /// Table code for this mode.
    pub fn code(self) -> u8 {
        match self {
            Self::Stretch => b's',
            Self::Fit => b'f',
            Self::Text => b't',
            Self::TextSubpixel => b'#',
        }
    }

    /// Both text modes share the baseline-driven vertical stops.
    pub fn is_text(self) -> bool {
        matches!(self, Self::Text | Self::TextSubpixel)
    }
}

/// Processing codes, one string per atlas row.
const PROCESSING: [&[u8; TILE_COLS]; TILE_ROWS] = [
    b"ffffffffffffffff", b"ffffffffffffffff", b"#t##########t#t#", b"tttttttttttt###t",
    b"#ttttttttttttttt", b"ttttttttttt#####", b"#ttttttttttttttt", b"ttttttttttt#####",
    b"################", b"################", b"################", b"################",
    b"tttttttttttttttt", b"ttttttt#tttttttt", b"tttttttttttttttt", b"ttttttt#tttttttt",
    b"ffsfsfsffsssssss", b"ssfsfsffffffffff", b"fffffffffffffsff", b"ffffffffffffffff",
    b"fsssfffffffffffs", b"fsffffffffffffff", b"ffffssssffssffff", b"ffffsfffffssssff",
];

/// Position of a cell in the atlas grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Cell holding glyph `index`, or `None` past the end of the atlas.
    pub fn from_glyph(index: u16) -> Option<Self> {
        let index = index as usize;
        (index < TILE_ROWS * TILE_COLS).then(|| Self::new(index / TILE_COLS, index % TILE_COLS))
    }

    /// Inverse of [`CellCoord::from_glyph`].
    pub fn glyph(self) -> u16 {
        (self.row * TILE_COLS + self.col) as u16
    }

    /// Processing mode assigned to this cell.
    pub fn mode(self) -> ProcessingMode {
        // The table only contains valid codes.
        ProcessingMode::from_code(PROCESSING[self.row][self.col]).unwrap_or(ProcessingMode::Fit)
    }

    /// Floor cell that receives procedural dust when blank.
    pub fn is_floor(self) -> bool {
        self == FLOOR_CELL
    }

    /// Cells that receive procedural wall-top waves.
    pub fn is_wall_top(self) -> bool {
        WALL_TOP_CELLS.contains(&self)
    }

    /// Cells whose content is (partly) synthesized at raster time.
    pub fn is_procedural(self) -> bool {
        self.is_floor() || self.is_wall_top()
    }

    /// Iterate every cell in row-major order.
    pub fn all() -> impl Iterator<Item = CellCoord> {
        (0..TILE_ROWS).flat_map(|row| (0..TILE_COLS).map(move |col| CellCoord::new(row, col)))
    }
}

/// Floor tile that gets procedural dust.
pub const FLOOR_CELL: CellCoord = CellCoord::new(20, 2);

/// Wall-top tiles that get procedural diagonal waves.
pub const WALL_TOP_CELLS: [CellCoord; 3] = [
    CellCoord::new(16, 2),
    CellCoord::new(21, 1),
    CellCoord::new(22, 4),
];

/// Wall-top variant whose waves cover the full tile height.
pub const FULL_HEIGHT_WALL_TOP: CellCoord = CellCoord::new(21, 1);

// ===================================================================
// Tests
// ===================================================================
