use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::camera::TileSize;
use crate::session::SessionConfig;

pub const CONFIG_ENV_VAR: &str = "MAPSTUDIO_CONFIG";
pub const EXPORT_PATH_ENV_VAR: &str = "MAPSTUDIO_EXPORT_PATH";
pub const TILESET_ENV_VAR: &str = "MAPSTUDIO_TILESET";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub window: WindowConfig,
    pub session: SessionConfig,
    pub export_path: PathBuf,
    pub tileset: Option<TilesetConfig>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            session: SessionConfig::default(),
            export_path: PathBuf::from("map.json"),
            tileset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Map Studio".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Atlas image sliced into `tile_size` cells, row by row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub tile_size: TileSize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}{location}: {source}")]
    Parse {
        path: PathBuf,
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Defaults, then the JSON file named by `MAPSTUDIO_CONFIG`, then the
/// `MAPSTUDIO_EXPORT_PATH` and `MAPSTUDIO_TILESET` overrides.
pub fn load_config() -> Result<EditorConfig, ConfigError> {
    let mut config = match read_env_var(CONFIG_ENV_VAR)? {
        Some(path) => {
            let path = PathBuf::from(path);
            let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let config = parse_config(&raw, path.clone())?;
            info!(path = %path.display(), "config_loaded");
            config
        }
        None => EditorConfig::default(),
    };

    let export_path = read_env_var(EXPORT_PATH_ENV_VAR)?;
    let tileset = read_env_var(TILESET_ENV_VAR)?;
    apply_overrides(&mut config, export_path, tileset);
    config.session.camera = config.session.camera.normalized();
    Ok(config)
}

pub fn parse_config(raw: &str, path: PathBuf) -> Result<EditorConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, EditorConfig>(&mut deserializer).map_err(|error| {
        let location = error.path().to_string();
        let location = if location.is_empty() || location == "." {
            String::new()
        } else {
            format!(" at {location}")
        };
        ConfigError::Parse {
            path,
            location,
            source: error.into_inner(),
        }
    })
}

fn apply_overrides(
    config: &mut EditorConfig,
    export_path: Option<String>,
    tileset: Option<String>,
) {
    if let Some(path) = export_path.filter(|value| !value.trim().is_empty()) {
        config.export_path = PathBuf::from(path);
    }
    if let Some(path) = tileset.filter(|value| !value.trim().is_empty()) {
        let tile_size = config
            .tileset
            .as_ref()
            .map(|tileset| tileset.tile_size)
            .unwrap_or(config.session.default_tile_size);
        config.tileset = Some(TilesetConfig {
            path: PathBuf::from(path),
            tile_size,
        });
    }
}

fn read_env_var(var: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(var) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(ConfigError::EnvVar { var, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::PanOverrideRestore;

    fn parse(raw: &str) -> Result<EditorConfig, ConfigError> {
        parse_config(raw, PathBuf::from("editor.json"))
    }

    #[test]
    fn empty_object_yields_defaults() {
        assert_eq!(parse("{}").expect("config"), EditorConfig::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = parse(
            r#"{
                "window": { "title": "Dungeon" },
                "session": {
                    "layer_width": 16,
                    "camera": { "max_zoom": 4.0 },
                    "pan_override_restore": "default_tool"
                },
                "tileset": { "path": "assets/terrain.png" }
            }"#,
        )
        .expect("config");

        assert_eq!(config.window.title, "Dungeon");
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.session.layer_width, 16);
        assert_eq!(config.session.layer_height, 64);
        assert!((config.session.camera.max_zoom - 4.0).abs() < f32::EPSILON);
        assert_eq!(
            config.session.pan_override_restore,
            PanOverrideRestore::DefaultTool
        );
        let tileset = config.tileset.expect("tileset");
        assert_eq!(tileset.path, PathBuf::from("assets/terrain.png"));
        assert_eq!(tileset.tile_size, TileSize::default());
    }

    #[test]
    fn parse_error_reports_field_path() {
        let error = parse(r#"{ "session": { "layer_width": "wide" } }"#).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("session.layer_width"), "{message}");
        assert!(message.contains("editor.json"), "{message}");
    }

    #[test]
    fn env_overrides_replace_export_and_tileset() {
        let mut config = EditorConfig::default();
        config.session.default_tile_size = TileSize::new(16, 16);
        apply_overrides(
            &mut config,
            Some("out/level.json".to_string()),
            Some("tiles.png".to_string()),
        );

        assert_eq!(config.export_path, PathBuf::from("out/level.json"));
        assert_eq!(
            config.tileset,
            Some(TilesetConfig {
                path: PathBuf::from("tiles.png"),
                tile_size: TileSize::new(16, 16),
            })
        );
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut config = EditorConfig::default();
        apply_overrides(&mut config, Some("  ".to_string()), None);
        assert_eq!(config, EditorConfig::default());
    }
}
