//! Rendering backend contract.
//!
//! The presenter only ever talks to a [`RenderBackend`]: it uploads
//! prepared atlas surfaces as textures, then per frame clears, fills cell
//! backgrounds and blits tinted tiles. The wgpu implementation lives in
//! [`crate::gpu`]; tests use a recording mock.

use thiserror::Error;
use tilesmith_raster::AtlasSurface;

/// Opaque handle to a backend texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Axis-aligned rectangle in output or texture pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Sampling used when a texture is drawn at a size other than its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    /// Pixel-exact; the precomputed variants are drawn 1:1.
    Nearest,
    /// Smoothed; used for the single large-tile fallback.
    Linear,
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to create {width}×{height} texture: {reason}")]
    TextureCreation {
        width: u32,
        height: u32,
        reason: String,
    },
    #[error("Unknown texture {0:?}")]
    UnknownTexture(TextureId),
    #[error("Present failed: {0}")]
    Present(String),
}

/// What the presenter needs from a rendering backend.
pub trait RenderBackend {
    /// Upload a prepared atlas as a new texture.
    fn create_texture(
        &mut self,
        surface: &AtlasSurface,
        filter: TextureFilter,
    ) -> Result<TextureId, BackendError>;

    /// Release a texture. Unknown ids are ignored.
    fn destroy_texture(&mut self, id: TextureId);

    /// Colour multiplied into subsequent draws of `id`.
    fn set_texture_tint(&mut self, id: TextureId, rgb: [u8; 3]) -> Result<(), BackendError>;

    /// Start a frame filled with `rgb`.
    fn clear(&mut self, rgb: [u8; 3]);

    /// Opaque fill, no blending.
    fn fill_rect(&mut self, rect: PixelRect, rgb: [u8; 3]);

    /// Alpha-blended blit of `src` (texture pixels) into `dest` (output pixels).
    fn draw_texture(
        &mut self,
        id: TextureId,
        src: PixelRect,
        dest: PixelRect,
    ) -> Result<(), BackendError>;

    /// Finish the frame.
    fn present(&mut self) -> Result<(), BackendError>;
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_rect_empty() {
        assert!(PixelRect::new(5, 5, 0, 10).is_empty());
        assert!(PixelRect::new(5, 5, 10, 0).is_empty());
        assert!(!PixelRect::new(-1, -1, 1, 1).is_empty());
    }

    #[test]
    fn test_backend_error_messages() {
        let e = BackendError::UnknownTexture(TextureId(7));
        assert_eq!(e.to_string(), "Unknown texture TextureId(7)");
        let e = BackendError::TextureCreation {
            width: 9000,
            height: 10,
            reason: "too large".into(),
        };
        assert!(e.to_string().contains("9000×10"));
    }
}
