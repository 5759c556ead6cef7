use crate::camera::{tile_to_screen, Camera, TileCoord, TileSize, Vec2};
use crate::session::{EditorEvent, EditorSession, Subscription};
use crate::tilemap::TileGrid;

pub type Rgba = [u8; 4];

const GRID_LINE_COLOR: Rgba = [255, 255, 255, 40];
const OUTLINE_COLOR: Rgba = [255, 210, 70, 255];
const OUTLINE_DASH: DashPattern = DashPattern { on: 4, off: 4 };

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectPx {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectPx {
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Pixels drawn then skipped, repeating along a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashPattern {
    pub on: u32,
    pub off: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub from: Vec2,
    pub to: Vec2,
}

/// Drawing primitives the grid overlay needs from whatever it draws on.
pub trait DrawSurface {
    fn size(&self) -> (u32, u32);
    fn clear(&mut self, rect: RectPx);
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Rgba, dash: Option<DashPattern>);
    fn stroke_rect(&mut self, rect: RectPx, color: Rgba, dash: Option<DashPattern>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridExtent {
    pub origin: TileCoord,
    pub width: u32,
    pub height: u32,
}

impl From<&TileGrid> for GridExtent {
    fn from(grid: &TileGrid) -> Self {
        Self {
            origin: grid.origin(),
            width: grid.width(),
            height: grid.height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    pub vertical: Vec<LineSegment>,
    pub horizontal: Vec<LineSegment>,
    /// Full layer bounds in canvas pixels; may extend past the viewport.
    pub outline: RectPx,
}

/// Cell boundary lines of a layer that fall inside the viewport, plus the
/// layer outline. `None` when nothing can be drawn.
pub fn compute_grid_geometry(
    camera: &Camera,
    tile_size: TileSize,
    extent: GridExtent,
    viewport: (u32, u32),
) -> Option<GridGeometry> {
    let (view_width, view_height) = (viewport.0 as f32, viewport.1 as f32);
    if viewport.0 == 0 || viewport.1 == 0 {
        return None;
    }
    let scaled = camera.scaled_tile_size(tile_size);
    if !(scaled.x > 0.0 && scaled.y > 0.0 && scaled.x.is_finite() && scaled.y.is_finite()) {
        return None;
    }

    let top_left = tile_to_screen(extent.origin, scaled, camera.position);
    let outline = RectPx {
        x: top_left.x,
        y: top_left.y,
        width: extent.width as f32 * scaled.x,
        height: extent.height as f32 * scaled.y,
    };

    let span_top = outline.y.max(0.0);
    let span_bottom = outline.bottom().min(view_height);
    let span_left = outline.x.max(0.0);
    let span_right = outline.right().min(view_width);

    let mut vertical = Vec::new();
    if span_top < span_bottom {
        let (first, last) = visible_boundaries(outline.x, scaled.x, extent.width, view_width);
        for column in first..=last {
            let x = outline.x + column as f32 * scaled.x;
            vertical.push(LineSegment {
                from: Vec2 { x, y: span_top },
                to: Vec2 { x, y: span_bottom },
            });
        }
    }

    let mut horizontal = Vec::new();
    if span_left < span_right {
        let (first, last) = visible_boundaries(outline.y, scaled.y, extent.height, view_height);
        for row in first..=last {
            let y = outline.y + row as f32 * scaled.y;
            horizontal.push(LineSegment {
                from: Vec2 { x: span_left, y },
                to: Vec2 { x: span_right, y },
            });
        }
    }

    Some(GridGeometry {
        vertical,
        horizontal,
        outline,
    })
}

/// Boundary indices `0..=count` whose position lies in `[0, view_extent]`.
/// An empty range is returned as `(1, 0)`.
fn visible_boundaries(start: f32, step: f32, count: u32, view_extent: f32) -> (i64, i64) {
    let first = ((0.0 - start) / step).ceil().max(0.0);
    let last = ((view_extent - start) / step).floor().min(count as f32);
    if !first.is_finite() || !last.is_finite() || first > last {
        return (1, 0);
    }
    (first as i64, last as i64)
}

/// Redraws the selected layer's grid whenever the camera or the selected
/// layer changes. Mutators only publish events; drawing happens in
/// [`GridOverlay::redraw_if_dirty`] on the next frame.
#[derive(Debug)]
pub struct GridOverlay {
    subscription: Subscription,
    dirty: bool,
    geometry: Option<GridGeometry>,
}

impl GridOverlay {
    pub fn new(session: &mut EditorSession) -> Self {
        Self {
            subscription: session.subscribe(),
            dirty: true,
            geometry: None,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Drains pending notifications and reports whether a redraw is due.
    pub fn poll(&mut self) -> bool {
        for event in self.subscription.drain() {
            match event {
                EditorEvent::CameraChanged
                | EditorEvent::SelectedLayerChanged
                | EditorEvent::LayersChanged => self.dirty = true,
                EditorEvent::TilesChanged { .. } | EditorEvent::ToolChanged(_) => {}
            }
        }
        self.dirty
    }

    pub fn geometry(&self) -> Option<&GridGeometry> {
        self.geometry.as_ref()
    }

    pub fn redraw_if_dirty(
        &mut self,
        session: &EditorSession,
        surface: &mut dyn DrawSurface,
    ) -> bool {
        if !self.poll() {
            return false;
        }
        self.dirty = false;

        let (width, height) = surface.size();
        surface.clear(RectPx::from_size(width, height));
        self.geometry = selected_layer_geometry(session, (width, height));

        if let Some(geometry) = &self.geometry {
            for line in geometry.vertical.iter().chain(&geometry.horizontal) {
                surface.draw_line(line.from, line.to, GRID_LINE_COLOR, None);
            }
            surface.stroke_rect(geometry.outline, OUTLINE_COLOR, Some(OUTLINE_DASH));
        }
        true
    }
}

fn selected_layer_geometry(session: &EditorSession, viewport: (u32, u32)) -> Option<GridGeometry> {
    let layer = session.selected_layer()?;
    if !layer.visible {
        return None;
    }
    let grid = session.tilemap().grid(layer.id)?;
    compute_grid_geometry(session.camera(), layer.tile_size, grid.into(), viewport)
}
