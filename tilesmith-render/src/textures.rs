//! Texture set: the precomputed atlas variants for one output geometry.
//!
//! Cell rectangles computed as `x * W / cols` are either `W / cols` or one
//! pixel wider, and likewise vertically, so four variants cover every
//! cell exactly:
//!
//! ```text
//! index 0: base_w     × base_h
//! index 1: base_w + 1 × base_h
//! index 2: base_w     × base_h + 1
//! index 3: base_w + 1 × base_h + 1
//! ```
//!
//! All four share the base size as their fit box, so glyphs keep the same
//! shape; the extra pixel is margin. Above [`MAX_TILE_SIZE`] a single
//! smoothed texture replaces the four.

use log::{debug, info};
use tilesmith_atlas::MAX_TILE_SIZE;
use tilesmith_raster::{TileEngine, TileSize};

use crate::backend::{BackendError, RenderBackend, TextureFilter, TextureId};

pub const VARIANT_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Variant {
    id: TextureId,
    tile: TileSize,
}

/// Up to four textures, one per tile-size variant.
#[derive(Debug, Default)]
pub struct TextureSet {
    /// `None` until the first build and after `clear`.
    base: Option<TileSize>,
    variants: [Option<Variant>; VARIANT_COUNT],
    smoothed: bool,
}

/// Tile size of variant `index` for a base size.
pub fn variant_size(base: TileSize, index: usize) -> TileSize {
    TileSize::new(base.width + (index & 1), base.height + ((index >> 1) & 1))
}

impl TextureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base tile size the set was last built for.
    pub fn base(&self) -> Option<TileSize> {
        self.base
    }

    /// Whether the single smoothed fallback is in use.
    pub fn is_smoothed(&self) -> bool {
        self.smoothed
    }

    /// Number of live textures.
    pub fn len(&self) -> usize {
        self.variants.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release every texture.
    pub fn clear<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        for variant in self.variants.iter_mut().filter_map(Option::take) {
            backend.destroy_texture(variant.id);
        }
        self.smoothed = false;
        self.base = None;
    }

    /// Destroy the current textures and build the variants for `base`.
    pub fn rebuild<B: RenderBackend + ?Sized>(
        &mut self,
        engine: &TileEngine,
        backend: &mut B,
        base: TileSize,
    ) -> Result<(), BackendError> {
        self.clear(backend);
        self.base = Some(base);

        if base.width > MAX_TILE_SIZE || base.height > MAX_TILE_SIZE {
            let tile = TileSize::new(base.width.min(MAX_TILE_SIZE), base.height.min(MAX_TILE_SIZE));
            if let Some(surface) = engine.render_atlas(tile, tile) {
                let id = backend.create_texture(&surface, TextureFilter::Linear)?;
                self.variants[0] = Some(Variant { id, tile });
                self.smoothed = true;
            }
            info!(
                "Built smoothed tile texture at {}×{} for base {}×{}",
                tile.width, tile.height, base.width, base.height
            );
            return Ok(());
        }

        for (index, slot) in self.variants.iter_mut().enumerate() {
            let tile = variant_size(base, index);
            let Some(surface) = engine.render_atlas(tile, base) else {
                debug!("Skipping empty variant {index} ({}×{})", tile.width, tile.height);
                continue;
            };
            let id = backend.create_texture(&surface, TextureFilter::Nearest)?;
            *slot = Some(Variant { id, tile });
        }
        info!(
            "Built {} tile textures for base {}×{}",
            self.len(),
            base.width,
            base.height
        );
        Ok(())
    }

    /// Texture and its tile size for a requested cell size.
    ///
    /// Each axis independently picks the `+1` variant when the request
    /// exceeds the base on that axis.
    pub fn get(&self, width: usize, height: usize) -> Option<(TextureId, TileSize)> {
        let base = self.base?;
        let index = if self.smoothed {
            0
        } else {
            usize::from(width > base.width) + 2 * usize::from(height > base.height)
        };
        self.variants[index].map(|v| (v.id, v.tile))
    }
}

// ===================================================================
// Tests
// ===================================================================
