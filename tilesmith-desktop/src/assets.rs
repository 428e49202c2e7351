//! Asset loading: decodes the tile atlas image.

use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tilesmith_atlas::{AtlasError, SourceAtlas};

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{path} is not a tile atlas: {source}")]
    Atlas {
        path: PathBuf,
        #[source]
        source: AtlasError,
    },
}

/// Load the source atlas from an image file.
///
/// Any format is accepted as long as it decodes to exactly
/// `ATLAS_WIDTH × ATLAS_HEIGHT`; only the red channel is kept.
pub fn load_atlas(path: &Path) -> Result<SourceAtlas, AssetError> {
    let decoded = image::ImageReader::open(path)
        .map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .decode()
        .map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    let atlas = SourceAtlas::from_rgba(width as usize, height as usize, decoded.as_raw())
        .map_err(|source| AssetError::Atlas {
            path: path.to_path_buf(),
            source,
        })?;
    info!("Loaded {width}×{height} tile atlas from {}", path.display());
    Ok(atlas)
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use tempfile::tempdir;
    use tilesmith_atlas::{ATLAS_HEIGHT, ATLAS_WIDTH, TILE_HEIGHT, TILE_WIDTH};

    #[test]
    fn test_load_atlas_keeps_intensity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tiles.png");
        let mut img = GrayImage::new(ATLAS_WIDTH as u32, ATLAS_HEIGHT as u32);
        // Centre of cell (1, 3).
        let (x, y) = (3 * TILE_WIDTH + 64, TILE_HEIGHT + 100);
        img.put_pixel(x as u32, y as u32, Luma([200]));
        img.save(&path).unwrap();

        let atlas = load_atlas(&path).unwrap();
        assert_eq!(atlas.pixel(x, y), 200);
        assert_eq!(atlas.pixel(0, 0), 0);
    }

    #[test]
    fn test_wrong_size_is_atlas_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("small.png");
        GrayImage::new(16, 16).save(&path).unwrap();

        let err = load_atlas(&path).unwrap_err();
        assert!(matches!(
            err,
            AssetError::Atlas {
                source: AtlasError::Dimensions { width: 16, height: 16, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_atlas(&dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert!(err.to_string().contains("absent.png"));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tiles.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(matches!(load_atlas(&path), Err(AssetError::Decode { .. })));
    }
}
