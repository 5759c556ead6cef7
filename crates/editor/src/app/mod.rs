mod input;
mod loop_runner;
mod rendering;

pub use loop_runner::{run_app, AppError};
pub use rendering::{AtlasError, Renderer, TileAtlas, TilesetSlot};
