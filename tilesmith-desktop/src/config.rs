//! Desktop configuration: a small JSON file, every field optional.
//!
//! ```json
//! {
//!   "data_dir": "/usr/share/tilesmith",
//!   "window_size": [1600, 900],
//!   "grid": { "cols": 100, "rows": 34 },
//!   "recalibrate": false
//! }
//! ```

use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tilesmith_atlas::MAX_TILE_SIZE;
use tilesmith_render::GridSize;

/// Monitor size assumed when the platform does not report one.
const FALLBACK_MONITOR: (u32, u32) = (1920, 1080);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("grid must have at least one column and one row, got {cols}×{rows}")]
    EmptyGrid { cols: usize, rows: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cols: usize,
    pub rows: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        let size = GridSize::default();
        Self {
            cols: size.cols,
            rows: size.rows,
        }
    }
}

impl From<GridConfig> for GridSize {
    fn from(grid: GridConfig) -> Self {
        GridSize::new(grid.cols, grid.rows)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    /// Directory holding `assets/`.
    pub data_dir: PathBuf,
    /// Initial inner size in physical pixels; `None` sizes from the monitor.
    pub window_size: Option<[u32; 2]>,
    pub grid: GridConfig,
    /// Ignore the shift cache and calibrate again on start-up.
    pub recalibrate: bool,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            window_size: None,
            grid: GridConfig::default(),
            recalibrate: false,
        }
    }
}

impl DesktopConfig {
    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.cols == 0 || self.grid.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                cols: self.grid.cols,
                rows: self.grid.rows,
            });
        }
        Ok(())
    }

    pub fn grid_size(&self) -> GridSize {
        self.grid.into()
    }

    /// Source atlas image.
    pub fn atlas_path(&self) -> PathBuf {
        self.data_dir.join("assets").join("tiles.png")
    }

    /// Shift table cache.
    pub fn shift_cache_path(&self) -> PathBuf {
        self.data_dir.join("assets").join("tiles.bin")
    }

    /// Initial window geometry for a monitor of the given size.
    pub fn window_plan(&self, monitor: Option<(u32, u32)>) -> WindowPlan {
        WindowPlan::new(self.window_size, monitor, self.grid_size())
    }
}

/// Initial window size and mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowPlan {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl WindowPlan {
    /// 70% of the monitor unless requested, capped at what the largest
    /// tiles can fill. A window covering the monitor becomes fullscreen.
    pub fn new(requested: Option<[u32; 2]>, monitor: Option<(u32, u32)>, grid: GridSize) -> Self {
        let (mw, mh) = monitor.unwrap_or(FALLBACK_MONITOR);
        let [width, height] = requested.unwrap_or([mw * 7 / 10, mh * 7 / 10]);

        let width = width.min((MAX_TILE_SIZE * grid.cols) as u32).max(1);
        let height = height.min((MAX_TILE_SIZE * grid.rows) as u32).max(1);

        if width >= mw && height >= mh {
            return Self {
                width: mw,
                height: mh,
                fullscreen: true,
            };
        }
        Self {
            width,
            height,
            fullscreen: false,
        }
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = DesktopConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, DesktopConfig::default());
        assert_eq!(config.grid_size(), GridSize::new(100, 34));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tilesmith.json");
        std::fs::write(&path, r#"{ "data_dir": "/opt/ts", "grid": { "rows": 40 } }"#).unwrap();

        let config = DesktopConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/opt/ts"));
        assert_eq!(config.grid_size(), GridSize::new(100, 40));
        assert_eq!(config.window_size, None);
        assert!(!config.recalibrate);
        assert_eq!(config.atlas_path(), PathBuf::from("/opt/ts/assets/tiles.png"));
        assert_eq!(config.shift_cache_path(), PathBuf::from("/opt/ts/assets/tiles.bin"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tilesmith.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(DesktopConfig::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_empty_grid_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tilesmith.json");
        std::fs::write(&path, r#"{ "grid": { "cols": 0 } }"#).unwrap();
        assert!(matches!(
            DesktopConfig::load(&path),
            Err(ConfigError::EmptyGrid { cols: 0, rows: 34 })
        ));
    }

    #[test]
    fn test_window_defaults_to_seventy_percent() {
        let plan = WindowPlan::new(None, Some((1920, 1080)), GridSize::default());
        assert_eq!(
            plan,
            WindowPlan {
                width: 1344,
                height: 756,
                fullscreen: false
            }
        );
    }

    #[test]
    fn test_window_capped_by_largest_tiles() {
        // 64 × 10 = 640, 64 × 5 = 320
        let plan = WindowPlan::new(Some([5000, 5000]), Some((8000, 8000)), GridSize::new(10, 5));
        assert_eq!((plan.width, plan.height), (640, 320));
        assert!(!plan.fullscreen);
    }

    #[test]
    fn test_window_covering_monitor_goes_fullscreen() {
        let plan = WindowPlan::new(Some([1920, 1200]), Some((1920, 1080)), GridSize::default());
        assert_eq!(
            plan,
            WindowPlan {
                width: 1920,
                height: 1080,
                fullscreen: true
            }
        );
    }
}
