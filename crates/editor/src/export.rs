use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::atomic_io::write_text_atomic;
use crate::session::EditorSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportDocument {
    pub map: ExportMap,
    pub tilesets: Vec<ExportTileset>,
    pub tiles: Vec<ExportTile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportMap {
    pub layers: Vec<ExportLayer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    /// Row-major tile indices.
    pub data: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTileset {
    pub name: String,
    /// Position of this tileset's first tile in the packed tile list.
    pub tile_index: u32,
}

/// Source rectangle of one packed tile within its tileset image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTile {
    pub tileset: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Tileset assets known to the editor.
pub trait TilesetCatalog {
    fn tileset_names(&self) -> Vec<String>;
    /// `None` when the tileset's asset cannot be found.
    fn tileset_start_index(&self, name: &str) -> Option<u32>;
    fn tiles(&self) -> Vec<ExportTile>;
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("tileset '{name}' has no asset data")]
    MissingTileset { name: String },
    #[error("unknown layer '{name}'")]
    UnknownLayer { name: String },
    #[error("layer '{name}' has no tile grid")]
    MissingGrid { name: String },
    #[error("failed to serialize export document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write export to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn build_export_document(
    session: &EditorSession,
    catalog: &dyn TilesetCatalog,
) -> Result<ExportDocument, ExportError> {
    let mut layers = Vec::with_capacity(session.layers().len());
    for layer in session.layers().iter() {
        let grid = session
            .tilemap()
            .grid(layer.id)
            .ok_or_else(|| ExportError::MissingGrid {
                name: layer.name.clone(),
            })?;
        layers.push(ExportLayer {
            name: layer.name.clone(),
            width: grid.width(),
            height: grid.height(),
            x: grid.origin().x,
            y: grid.origin().y,
            data: grid.tiles().to_vec(),
        });
    }

    let tilesets = catalog
        .tileset_names()
        .into_iter()
        .map(|name| match catalog.tileset_start_index(&name) {
            Some(tile_index) => Ok(ExportTileset { name, tile_index }),
            None => Err(ExportError::MissingTileset { name }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExportDocument {
        map: ExportMap { layers },
        tilesets,
        tiles: catalog.tiles(),
    })
}

pub fn export_json(
    session: &EditorSession,
    catalog: &dyn TilesetCatalog,
) -> Result<String, ExportError> {
    let document = build_export_document(session, catalog)?;
    Ok(serde_json::to_string(&document)?)
}

/// One line per row, comma separated.
pub fn export_layer_csv(session: &EditorSession, name: &str) -> Result<String, ExportError> {
    let layer = session
        .layers()
        .get(name)
        .ok_or_else(|| ExportError::UnknownLayer {
            name: name.to_string(),
        })?;
    let grid = session
        .tilemap()
        .grid(layer.id)
        .ok_or_else(|| ExportError::MissingGrid {
            name: name.to_string(),
        })?;
    Ok(grid.to_string())
}

pub fn write_export(path: &Path, text: &str) -> Result<(), ExportError> {
    write_text_atomic(path, text).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = text.len(), "export_written");
    Ok(())
}
