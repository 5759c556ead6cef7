use std::ops::Range;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::camera::{tile_to_screen, Camera, TileCoord, Vec2};
use crate::overlay::{GridOverlay, Rgba};
use crate::session::EditorSession;
use crate::surface::{write_pixel_rgba_clipped, FrameSurface};
use crate::tilemap::{TileGrid, EMPTY_TILE};

use super::atlas::TileAtlas;

const CLEAR_COLOR: Rgba = [20, 22, 28, 255];
const FALLBACK_PALETTE: [Rgba; 8] = [
    [74, 112, 56, 255],
    [112, 83, 58, 255],
    [64, 104, 160, 255],
    [150, 150, 150, 255],
    [190, 170, 90, 255],
    [120, 70, 130, 255],
    [60, 140, 120, 255],
    [170, 80, 70, 255],
];

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
    grid_overlay: GridOverlay,
    overlay_surface: FrameSurface,
}

impl Renderer {
    pub fn new(window: Arc<Window>, session: &mut EditorSession) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
            grid_overlay: GridOverlay::new(session),
            overlay_surface: FrameSurface::new(size.width, size.height),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        self.overlay_surface.resize(width, height);
        self.grid_overlay.mark_dirty();
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    /// Tiles are redrawn every frame; the grid overlay only when it is dirty.
    pub fn render(
        &mut self,
        session: &EditorSession,
        atlas: Option<&TileAtlas>,
    ) -> Result<(), Error> {
        self.grid_overlay.redraw_if_dirty(session, &mut self.overlay_surface);

        let frame = self.pixels.frame_mut();
        draw_layers(frame, (self.width, self.height), session, atlas);
        self.overlay_surface.composite_onto(frame);
        self.pixels.render()
    }
}

/// Clears `frame` and paints every visible layer in registry order, so later
/// layers cover earlier ones.
pub(crate) fn draw_layers(
    frame: &mut [u8],
    viewport: (u32, u32),
    session: &EditorSession,
    atlas: Option<&TileAtlas>,
) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&CLEAR_COLOR);
    }

    let camera = session.camera();
    for layer in session.layers().iter().filter(|layer| layer.visible) {
        let Some(grid) = session.tilemap().grid(layer.id) else {
            continue;
        };
        let scaled = camera.scaled_tile_size(layer.tile_size);
        let Some((columns, rows)) = visible_cells(grid, scaled, camera, viewport) else {
            continue;
        };

        for row in rows {
            for column in columns.clone() {
                let tile = TileCoord::new(
                    grid.origin().x + column as i32,
                    grid.origin().y + row as i32,
                );
                let value = grid.get(tile);
                if value == EMPTY_TILE {
                    continue;
                }
                let top_left = tile_to_screen(tile, scaled, camera.position);
                draw_tile(frame, viewport, top_left, scaled, value, atlas);
            }
        }
    }
}

/// Column and row ranges of `grid` cells that overlap the viewport.
fn visible_cells(
    grid: &TileGrid,
    scaled: Vec2,
    camera: &Camera,
    viewport: (u32, u32),
) -> Option<(Range<u32>, Range<u32>)> {
    if !(scaled.x > 0.0 && scaled.y > 0.0) {
        return None;
    }
    let columns = visible_axis(
        grid.origin().x,
        grid.width(),
        scaled.x,
        camera.position.x,
        viewport.0,
    )?;
    let rows = visible_axis(
        grid.origin().y,
        grid.height(),
        scaled.y,
        camera.position.y,
        viewport.1,
    )?;
    Some((columns, rows))
}

fn visible_axis(
    origin: i32,
    cells: u32,
    scaled: f32,
    offset: f32,
    extent: u32,
) -> Option<Range<u32>> {
    let first = ((-offset) / scaled).floor() - origin as f32;
    let last = ((extent as f32 - offset) / scaled).ceil() - origin as f32;
    if !first.is_finite() || !last.is_finite() {
        return None;
    }
    let start = first.clamp(0.0, cells as f32) as u32;
    let end = last.clamp(0.0, cells as f32) as u32;
    (start < end).then_some(start..end)
}

fn draw_tile(
    frame: &mut [u8],
    viewport: (u32, u32),
    top_left: Vec2,
    scaled: Vec2,
    value: i32,
    atlas: Option<&TileAtlas>,
) {
    let (width, height) = viewport;
    let left = top_left.x.floor().max(0.0);
    let top = top_left.y.floor().max(0.0);
    let right = (top_left.x + scaled.x).ceil().min(width as f32);
    let bottom = (top_left.y + scaled.y).ceil().min(height as f32);
    if left >= right || top >= bottom {
        return;
    }

    let atlas = atlas.filter(|atlas| atlas.tile_origin(value).is_some());
    for y in top as i32..bottom as i32 {
        let v = (y as f32 + 0.5 - top_left.y) / scaled.y;
        for x in left as i32..right as i32 {
            let color = match atlas {
                Some(atlas) => {
                    let u = (x as f32 + 0.5 - top_left.x) / scaled.x;
                    match atlas.sample(value, u.clamp(0.0, 1.0), v.clamp(0.0, 1.0)) {
                        Some(color) if color[3] > 0 => color,
                        _ => continue,
                    }
                }
                None => fallback_tile_color(value),
            };
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn fallback_tile_color(value: i32) -> Rgba {
    FALLBACK_PALETTE[value.unsigned_abs() as usize % FALLBACK_PALETTE.len()]
}
