use std::io;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageReader};
use thiserror::Error;
use tracing::{info, warn};

use crate::camera::TileSize;
use crate::config::TilesetConfig;
use crate::export::{ExportTile, TilesetCatalog};
use crate::overlay::Rgba;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("failed to open tileset image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode tileset image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("tileset image {path} is smaller than one {width}x{height} tile")]
    TooSmall {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}

/// RGBA atlas sliced row by row into equally sized tiles. Tile index `n` is
/// the `n`th cell counting left to right, then top to bottom.
#[derive(Debug, Clone)]
pub struct TileAtlas {
    name: String,
    tile_size: TileSize,
    columns: u32,
    rows: u32,
    width: u32,
    rgba: Vec<u8>,
}

impl TileAtlas {
    pub fn load(config: &TilesetConfig) -> Result<Self, AtlasError> {
        let path = config.path.as_path();
        let reader = ImageReader::open(path).map_err(|source| AtlasError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = reader.decode().map_err(|source| AtlasError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let image = decoded.to_rgba8();
        let (width, height) = (image.width(), image.height());
        Self::from_rgba(tileset_name(path), width, height, image.into_raw(), config.tile_size)
            .ok_or_else(|| AtlasError::TooSmall {
                path: path.to_path_buf(),
                width: config.tile_size.width,
                height: config.tile_size.height,
            })
    }

    /// `None` unless the buffer holds at least one whole tile.
    pub fn from_rgba(
        name: String,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
        tile_size: TileSize,
    ) -> Option<Self> {
        if tile_size.width == 0 || tile_size.height == 0 {
            return None;
        }
        if rgba.len() != width as usize * height as usize * 4 {
            return None;
        }
        let columns = width / tile_size.width;
        let rows = height / tile_size.height;
        if columns == 0 || rows == 0 {
            return None;
        }
        Some(Self {
            name,
            tile_size,
            columns,
            rows,
            width,
            rgba,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    pub fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// Top-left pixel of `tile` within the atlas image.
    pub fn tile_origin(&self, tile: i32) -> Option<(u32, u32)> {
        let index = u32::try_from(tile).ok()?;
        if index >= self.tile_count() {
            return None;
        }
        Some((
            (index % self.columns) * self.tile_size.width,
            (index / self.columns) * self.tile_size.height,
        ))
    }

    /// Nearest-neighbour lookup at normalized `(u, v)` in `[0, 1)` within a tile.
    pub fn sample(&self, tile: i32, u: f32, v: f32) -> Option<Rgba> {
        let (left, top) = self.tile_origin(tile)?;
        let local_x = ((u * self.tile_size.width as f32) as u32).min(self.tile_size.width - 1);
        let local_y = ((v * self.tile_size.height as f32) as u32).min(self.tile_size.height - 1);
        let row = (top + local_y) as usize;
        let column = (left + local_x) as usize;
        let offset = (row * self.width as usize + column) * 4;
        let mut color = [0u8; 4];
        color.copy_from_slice(self.rgba.get(offset..offset + 4)?);
        Some(color)
    }
}

fn tileset_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// The configured tileset, whether or not its image could be loaded.
#[derive(Debug, Clone, Default)]
pub enum TilesetSlot {
    #[default]
    Unconfigured,
    Loaded(TileAtlas),
    /// Configured but unreadable; exports fail until it is fixed.
    Missing { name: String },
}

impl TilesetSlot {
    /// Falls back to [`TilesetSlot::Missing`] when the image cannot be loaded.
    pub fn load(config: Option<&TilesetConfig>) -> Self {
        let Some(config) = config else {
            return Self::Unconfigured;
        };
        match TileAtlas::load(config) {
            Ok(atlas) => {
                info!(
                    tileset = atlas.name(),
                    tile_count = atlas.tile_count(),
                    "tileset_loaded"
                );
                Self::Loaded(atlas)
            }
            Err(error) => {
                warn!(error = %error, "tileset_load_failed_using_fallback");
                Self::Missing {
                    name: tileset_name(&config.path),
                }
            }
        }
    }

    pub fn atlas(&self) -> Option<&TileAtlas> {
        match self {
            Self::Loaded(atlas) => Some(atlas),
            Self::Unconfigured | Self::Missing { .. } => None,
        }
    }
}

impl TilesetCatalog for TilesetSlot {
    fn tileset_names(&self) -> Vec<String> {
        match self {
            Self::Unconfigured => Vec::new(),
            Self::Loaded(atlas) => vec![atlas.name.clone()],
            Self::Missing { name } => vec![name.clone()],
        }
    }

    fn tileset_start_index(&self, name: &str) -> Option<u32> {
        self.atlas().filter(|atlas| atlas.name == name).map(|_| 0)
    }

    fn tiles(&self) -> Vec<ExportTile> {
        let Some(atlas) = self.atlas() else {
            return Vec::new();
        };
        (0..atlas.tile_count())
            .map(|index| ExportTile {
                tileset: atlas.name.clone(),
                x: (index % atlas.columns) * atlas.tile_size.width,
                y: (index / atlas.columns) * atlas.tile_size.height,
                width: atlas.tile_size.width,
                height: atlas.tile_size.height,
            })
            .collect()
    }
}
