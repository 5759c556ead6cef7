mod atlas;
mod renderer;

pub use atlas::{AtlasError, TileAtlas, TilesetSlot};
pub use renderer::Renderer;
