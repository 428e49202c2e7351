//! Source atlas: the immutable single-channel spritesheet.
//!
//! The decoded image is reduced to one intensity byte per pixel (the first
//! channel of each RGBA pixel). All later stages read cells through
//! [`SourceAtlas::cell_row`], which hands out one scanline of a cell.

use thiserror::Error;

use crate::layout::{ATLAS_HEIGHT, ATLAS_WIDTH, TILE_HEIGHT, TILE_WIDTH};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AtlasError {
    #[error("atlas must be {expected_width}×{expected_height} px, got {width}×{height}")]
    Dimensions {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferLength { expected: usize, actual: usize },
}

/// CPU-side source atlas (`ATLAS_WIDTH × ATLAS_HEIGHT`, 1 byte/pixel).
#[derive(Clone)]
pub struct SourceAtlas {
    pixels: Vec<u8>,
}

impl std::fmt::Debug for SourceAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.pixels.iter().filter(|&&p| p != 0).count();
        f.debug_struct("SourceAtlas")
            .field("width", &ATLAS_WIDTH)
            .field("height", &ATLAS_HEIGHT)
            .field("lit", &lit)
            .finish()
    }
}

impl SourceAtlas {
    /// An all-zero atlas. Useful for assembling synthetic atlases.
    pub fn blank() -> Self {
        Self {
            pixels: vec![0u8; ATLAS_WIDTH * ATLAS_HEIGHT],
        }
    }

    /// Wrap a single-channel buffer of exactly the atlas size.
    pub fn from_luminance(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, AtlasError> {
        check_dimensions(width, height)?;
        if pixels.len() != width * height {
            return Err(AtlasError::BufferLength {
                expected: width * height,
                actual: pixels.len(),
            });
        }
        Ok(Self { pixels })
    }

    /// Take the first channel of an RGBA buffer.
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8]) -> Result<Self, AtlasError> {
        check_dimensions(width, height)?;
        let expected = width * height * 4;
        if rgba.len() != expected {
            return Err(AtlasError::BufferLength {
                expected,
                actual: rgba.len(),
            });
        }
        let pixels = rgba.chunks_exact(4).map(|px| px[0]).collect();
        Ok(Self { pixels })
    }

    /// Intensity at absolute atlas coordinates.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * ATLAS_WIDTH + x]
    }

    /// Scanline `y` (0..TILE_HEIGHT) of the cell at `row`, `col`.
    pub fn cell_row(&self, row: usize, col: usize, y: usize) -> &[u8] {
        let start = (row * TILE_HEIGHT + y) * ATLAS_WIDTH + col * TILE_WIDTH;
        &self.pixels[start..start + TILE_WIDTH]
    }

    /// Fill a rectangle (cell-local, end-exclusive) inside one cell.
    ///
    /// Coordinates are clamped to the cell bounds.
    pub fn fill_cell_rect(
        &mut self,
        row: usize,
        col: usize,
        (x0, y0): (usize, usize),
        (x1, y1): (usize, usize),
        value: u8,
    ) {
        let x1 = x1.min(TILE_WIDTH);
        let y1 = y1.min(TILE_HEIGHT);
        for y in y0..y1 {
            let start = (row * TILE_HEIGHT + y) * ATLAS_WIDTH + col * TILE_WIDTH;
            for x in x0..x1 {
                self.pixels[start + x] = value;
            }
        }
    }

    /// Raw single-channel pixels.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<(), AtlasError> {
    if width != ATLAS_WIDTH || height != ATLAS_HEIGHT {
        return Err(AtlasError::Dimensions {
            expected_width: ATLAS_WIDTH,
            expected_height: ATLAS_HEIGHT,
            width,
            height,
        });
    }
    Ok(())
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_summarizes_pixels() {
        let mut atlas = SourceAtlas::blank();
        atlas.fill_cell_rect(0, 0, (0, 0), (2, 3), 255);
        let text = format!("{atlas:?}");
        assert!(text.starts_with("SourceAtlas"));
        assert!(text.contains("lit: 6"));
        assert!(text.len() < 100);
    }

    #[test]
    fn test_blank_atlas() {
        let atlas = SourceAtlas::blank();
        assert_eq!(atlas.as_bytes().len(), ATLAS_WIDTH * ATLAS_HEIGHT);
        assert!(atlas.as_bytes().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_wrong_dimensions_rejected() {
        let err = SourceAtlas::from_luminance(100, 100, vec![0; 10_000]).err();
        assert!(matches!(err, Some(AtlasError::Dimensions { width: 100, .. })));
    }

    #[test]
    fn test_wrong_buffer_length_rejected() {
        let err = SourceAtlas::from_luminance(ATLAS_WIDTH, ATLAS_HEIGHT, vec![0; 16]).err();
        assert!(matches!(err, Some(AtlasError::BufferLength { actual: 16, .. })));
    }

    #[test]
    fn test_from_rgba_uses_first_channel() {
        let mut rgba = vec![0u8; ATLAS_WIDTH * ATLAS_HEIGHT * 4];
        rgba[0] = 200;
        rgba[1] = 17; // ignored
        rgba[(ATLAS_WIDTH + 1) * 4] = 9;
        let atlas = SourceAtlas::from_rgba(ATLAS_WIDTH, ATLAS_HEIGHT, &rgba).unwrap();
        assert_eq!(atlas.pixel(0, 0), 200);
        assert_eq!(atlas.pixel(1, 0), 0);
        assert_eq!(atlas.pixel(1, 1), 9);
    }

    #[test]
    fn test_fill_cell_rect_stays_in_cell() {
        let mut atlas = SourceAtlas::blank();
        atlas.fill_cell_rect(3, 5, (10, 20), (1000, 30), 255);
        assert_eq!(atlas.cell_row(3, 5, 20)[10], 255);
        assert_eq!(atlas.cell_row(3, 5, 20)[TILE_WIDTH - 1], 255);
        assert_eq!(atlas.cell_row(3, 5, 19)[10], 0);
        assert_eq!(atlas.cell_row(3, 6, 20)[0], 0);
        assert_eq!(atlas.pixel(5 * TILE_WIDTH + 10, 3 * TILE_HEIGHT + 29), 255);
    }
}
