//! # tilesmith-raster
//!
//! Tile rasterization for Tilesmith: scales source atlas cells to
//! arbitrary output tile sizes while keeping text baselines and glyph
//! centres aligned, and calibrates per-size sub-pixel shifts.
//!
//! ## Pipeline
//!
//! ```text
//! CellDescriptor + fit box + ShiftTable
//!     │
//!     ▼
//! CoordinateMap::build() ──► scaled_x / scaled_y lookup tables
//!     │
//!     ▼
//! raster::accumulate() ──► Accumulator (count, Σ v²)
//!     │                         ▲
//!     │            synth::add_floor_dust / add_wall_tops
//!     ▼
//! raster::resolve() ──► AtlasSurface (white RGBA, alpha = glyph)
//! ```
//!
//! The optimizer drives the same pipeline in `optimizing` mode to score
//! candidate shifts; the cache persists its result.
//!
//! - **`mapper`**: glyph sizing and stop-based coordinate mapping.
//! - **`accumulator`**: per-tile linear-light accumulator.
//! - **`raster`**: accumulation and gamma conversion.
//! - **`synth`**: floor dust and wall-top waves.
//! - **`shifts`**: the calibrated shift table.
//! - **`optimizer`**: coordinate-descent shift search.
//! - **`cache`**: shift table persistence.
//! - **`engine`**: the context object tying it together.

pub mod accumulator;
pub mod cache;
pub mod engine;
pub mod mapper;
pub mod optimizer;
pub mod raster;
pub mod shifts;
pub mod surface;
pub mod synth;

// Re-exports for ergonomic use.
pub use cache::{CacheError, CacheOutcome, FileShiftStore, MemoryShiftStore, ShiftStore};
pub use engine::TileEngine;
pub use mapper::{CoordinateMap, TileSize};
pub use optimizer::{optimize, CalibrationProgress, OptimizerConfig};
pub use shifts::{Axis, ShiftError, ShiftTable, SHIFT_TABLE_LEN};
pub use surface::AtlasSurface;
