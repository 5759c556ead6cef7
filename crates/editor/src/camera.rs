use serde::{Deserialize, Serialize};

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.1;
pub const CAMERA_ZOOM_MAX: f32 = 10.0;
pub const CAMERA_ZOOM_STEP: f32 = 0.1;
pub const CAMERA_WHEEL_ZOOM_PER_UNIT: f32 = 0.001;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Base tile dimensions in screen pixels at zoom 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for TileSize {
    fn default() -> Self {
        Self::new(32, 32)
    }
}

/// A pointer position in client space together with the client-space
/// position of the canvas top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerCoords {
    pub client: Vec2,
    pub canvas_origin: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_step: f32,
    pub wheel_zoom_per_unit: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: CAMERA_ZOOM_MIN,
            max_zoom: CAMERA_ZOOM_MAX,
            zoom_step: CAMERA_ZOOM_STEP,
            wheel_zoom_per_unit: CAMERA_WHEEL_ZOOM_PER_UNIT,
        }
    }
}

impl CameraConfig {
    /// Replaces unusable bounds with the defaults so that the clamp range is
    /// always a non-empty interval of positive zoom levels.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let min_zoom = positive_or(self.min_zoom, defaults.min_zoom);
        let max_zoom = positive_or(self.max_zoom, defaults.max_zoom).max(min_zoom);
        Self {
            min_zoom,
            max_zoom,
            zoom_step: positive_or(self.zoom_step, defaults.zoom_step),
            wheel_zoom_per_unit: positive_or(
                self.wheel_zoom_per_unit,
                defaults.wheel_zoom_per_unit,
            ),
        }
    }
}

/// Pan/zoom transform between screen pixels and tile space.
///
/// `position` is the pan offset in screen pixels, applied before the zoomed
/// tile size divides the pointer position into tiles.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec2,
    zoom: f32,
    anchor: Option<Vec2>,
    config: CameraConfig,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        let config = config.normalized();
        Self {
            position: Vec2::ZERO,
            zoom: CAMERA_ZOOM_DEFAULT.clamp(config.min_zoom, config.max_zoom),
            anchor: None,
            config,
        }
    }

    pub fn config(&self) -> CameraConfig {
        self.config
    }

    pub fn zoom_level(&self) -> f32 {
        self.zoom
    }

    pub fn drag_anchor(&self) -> Option<Vec2> {
        self.anchor
    }

    /// Starts a pan gesture. Always overwrites the previous anchor.
    pub fn set_origin(&mut self, x: f32, y: f32) {
        self.anchor = Some(Vec2 { x, y });
    }

    /// Accumulates the pointer delta since the last recorded position.
    ///
    /// `(0,0)` is what an uninitialized drag event reports and is ignored.
    pub fn move_to(&mut self, x: f32, y: f32) -> bool {
        if x == 0.0 && y == 0.0 {
            return false;
        }
        let next = Vec2 { x, y };
        let Some(anchor) = self.anchor.replace(next) else {
            return false;
        };

        let dx = x - anchor.x;
        let dy = y - anchor.y;
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        self.position.x += dx;
        self.position.y += dy;
        true
    }

    pub fn end_drag(&mut self) {
        self.anchor = None;
    }

    pub fn increment_zoom(&mut self) -> bool {
        self.set_zoom_clamped(self.zoom + self.config.zoom_step)
    }

    pub fn decrement_zoom(&mut self) -> bool {
        self.set_zoom_clamped(self.zoom - self.config.zoom_step)
    }

    /// Continuous zoom from a scroll wheel. Positive `delta_y` zooms out.
    pub fn apply_zoom(&mut self, delta_y: f32) -> bool {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return false;
        }
        self.set_zoom_clamped(self.zoom - delta_y * self.config.wheel_zoom_per_unit)
    }

    pub fn set_zoom_clamped(&mut self, zoom: f32) -> bool {
        let next = clamp_zoom(zoom, &self.config);
        if next == self.zoom {
            return false;
        }
        self.zoom = next;
        true
    }

    pub fn scaled_tile_size(&self, tile_size: TileSize) -> Vec2 {
        Vec2 {
            x: tile_size.width as f32 * self.zoom,
            y: tile_size.height as f32 * self.zoom,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

fn clamp_zoom(zoom: f32, config: &CameraConfig) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT.clamp(config.min_zoom, config.max_zoom);
    }
    zoom.clamp(config.min_zoom, config.max_zoom)
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Maps a pointer position to the tile under it.
///
/// `scaled_tile_size` must already include the zoom factor. Returns `None`
/// when either scaled dimension is not a positive finite number.
pub fn tile_position_on_click(
    pointer: PointerCoords,
    scaled_tile_size: Vec2,
    camera_position: Vec2,
) -> Option<TileCoord> {
    if !is_positive_finite(scaled_tile_size.x) || !is_positive_finite(scaled_tile_size.y) {
        return None;
    }

    let local_x = pointer.client.x - pointer.canvas_origin.x - camera_position.x;
    let local_y = pointer.client.y - pointer.canvas_origin.y - camera_position.y;
    let tile_x = (local_x / scaled_tile_size.x).floor();
    let tile_y = (local_y / scaled_tile_size.y).floor();
    if !tile_x.is_finite() || !tile_y.is_finite() {
        return None;
    }

    Some(TileCoord {
        x: tile_x as i32,
        y: tile_y as i32,
    })
}

/// Canvas-local position of the top-left corner of `tile`.
pub fn tile_to_screen(tile: TileCoord, scaled_tile_size: Vec2, camera_position: Vec2) -> Vec2 {
    Vec2 {
        x: camera_position.x + tile.x as f32 * scaled_tile_size.x,
        y: camera_position.y + tile.y as f32 * scaled_tile_size.y,
    }
}

fn is_positive_finite(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
