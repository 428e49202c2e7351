//! # tilesmith-atlas
//!
//! Source spritesheet model for the Tilesmith tile engine. Holds the
//! fixed atlas layout, the single-channel source pixel buffer, and the
//! per-cell inspection (emptiness, vertical padding, processing mode).
//!
//! ## Architecture
//!
//! ```text
//! tiles.png (decoded RGBA, 2048 × 5568)
//!     │
//!     ▼
//! SourceAtlas::from_rgba() ──► one luminance byte per pixel
//!     │
//!     ▼
//! CellTable::inspect() ──► CellDescriptor { is_empty, padding, mode }
//! ```
//!
//! - **`layout`**: compile-time atlas geometry and the processing table.
//! - **`atlas`**: the immutable source pixel buffer.
//! - **`inspect`**: empty-cell and padding detection.

pub mod atlas;
pub mod inspect;
pub mod layout;

// Re-exports for ergonomic use.
pub use atlas::{AtlasError, SourceAtlas};
pub use inspect::{is_cell_empty, measure_padding, CellDescriptor, CellTable};
pub use layout::{
    CellCoord, ProcessingMode, ATLAS_HEIGHT, ATLAS_WIDTH, FLOOR_CELL, FULL_HEIGHT_WALL_TOP, MAX_PADDING,
    MAX_TILE_SIZE, TEXT_BASELINE, TEXT_X_HEIGHT, TILE_COLS, TILE_HEIGHT, TILE_ROWS,
    TILE_WIDTH, WALL_TOP_CELLS,
};
