//! # tilesmith-render
//!
//! Presentation for Tilesmith: keeps the precomputed tile textures in step
//! with the output size and draws the screen grid through a rendering
//! backend.
//!
//! ## Architecture
//!
//! ```text
//!  TileEngine (tilesmith-raster)
//!       │  render_atlas() per variant
//!       ▼
//!  TextureSet ◀── Presenter.on_output_resize(W, H)
//!       │
//!       ▼
//!  Presenter.render_frame()  ── ScreenGrid (set_cell)
//!       │
//!       ▼
//!  RenderBackend ── GpuBackend (wgpu) │ any other implementation
//! ```
//!
//! ## Crate modules
//!
//! - [`backend`]: the backend trait and its handle/rect types
//! - [`grid`]: screen grid state
//! - [`textures`]: the four size variants
//! - [`presenter`]: per-frame orchestration
//! - [`context`]: GPU device/queue/surface initialisation
//! - [`vertex`]: vertex, instance, and camera data types
//! - [`pipelines`]: wgpu render pipelines (rect, tile)
//! - [`gpu`]: the wgpu backend

pub mod backend;
pub mod context;
pub mod gpu;
pub mod grid;
pub mod pipelines;
pub mod presenter;
pub mod textures;
pub mod vertex;

// Re-exports for convenience
pub use backend::{BackendError, PixelRect, RenderBackend, TextureFilter, TextureId};
pub use context::{GpuContext, GpuError};
pub use gpu::{FlushStats, GpuBackend};
pub use grid::{GridSize, ScreenGrid, ScreenTile};
pub use presenter::{output_for_base, FrameStats, PresentError, Presenter};
pub use textures::TextureSet;
