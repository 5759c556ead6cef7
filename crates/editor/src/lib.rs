pub mod app;
mod atomic_io;
pub mod camera;
pub mod config;
pub mod export;
pub mod layers;
pub mod overlay;
pub mod session;
mod surface;
pub mod tilemap;
pub mod tools;

pub use app::{run_app, AppError, AtlasError, TileAtlas, TilesetSlot};
pub use camera::{
    tile_position_on_click, tile_to_screen, Camera, CameraConfig, PointerCoords, TileCoord,
    TileSize, Vec2, CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN, CAMERA_ZOOM_STEP,
};
pub use config::{
    load_config, parse_config, ConfigError, EditorConfig, TilesetConfig, WindowConfig,
    CONFIG_ENV_VAR, EXPORT_PATH_ENV_VAR, TILESET_ENV_VAR,
};
pub use export::{
    build_export_document, export_json, export_layer_csv, write_export, ExportDocument,
    ExportError, ExportLayer, ExportMap, ExportTile, ExportTileset, TilesetCatalog,
};
pub use layers::{Layer, LayerChange, LayerCommand, LayerId, LayerRegistry};
pub use overlay::{
    compute_grid_geometry, DashPattern, DrawSurface, GridExtent, GridGeometry, GridOverlay,
    LineSegment, RectPx, Rgba,
};
pub use session::{ChangeNotifier, EditorEvent, EditorSession, SessionConfig, Subscription};
pub use surface::FrameSurface;
pub use tilemap::{TileGrid, TilemapError, TilemapStore, EMPTY_TILE};
pub use tools::{
    EditContext, EditorInput, EditorKey, Modifiers, PanOverrideRestore, PointerButton,
    PointerEvent, Tool, ToolController, ToolEffect,
};
