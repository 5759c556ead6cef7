use crate::camera::Vec2;
use crate::overlay::{DashPattern, DrawSurface, RectPx, Rgba};

/// RGBA8 pixel buffer implementing [`DrawSurface`]. All writes are clipped.
#[derive(Debug, Clone, Default)]
pub struct FrameSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        *self = Self::new(width, height);
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(color)
    }

    /// Alpha-blends this surface over `frame`, which must have the same size.
    pub fn composite_onto(&self, frame: &mut [u8]) {
        for (dst, src) in frame.chunks_exact_mut(4).zip(self.pixels.chunks_exact(4)) {
            let alpha = u32::from(src[3]);
            if alpha == 0 {
                continue;
            }
            for channel in 0..3 {
                let source = u32::from(src[channel]) * alpha;
                let backdrop = u32::from(dst[channel]) * (255 - alpha);
                dst[channel] = ((source + backdrop) / 255) as u8;
            }
            dst[3] = 255;
        }
    }

    pub fn write_pixel_clipped(&mut self, x: i32, y: i32, color: Rgba) {
        write_pixel_rgba_clipped(&mut self.pixels, self.width as usize, x, y, color);
    }

    /// Axis-aligned span from `start` to `end`, clipped to the surface before
    /// iterating. The dash phase is measured from `start`.
    fn draw_axis_span(
        &mut self,
        start: i32,
        end: i32,
        to_point: impl Fn(i32) -> (i32, i32),
        color: Rgba,
        dash: Option<DashPattern>,
    ) {
        let limit = self.width.max(self.height) as i32;
        let low = start.min(end).max(0);
        let high = start.max(end).min(limit - 1);
        for along in low..=high {
            if is_dash_on(along.abs_diff(start), dash) {
                let (x, y) = to_point(along);
                self.write_pixel_clipped(x, y, color);
            }
        }
    }
}

impl DrawSurface for FrameSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, rect: RectPx) {
        let left = rect.x.floor().max(0.0) as i64;
        let top = rect.y.floor().max(0.0) as i64;
        let right = rect.right().ceil().min(self.width as f32) as i64;
        let bottom = rect.bottom().ceil().min(self.height as f32) as i64;
        for y in top..bottom {
            for x in left..right {
                self.write_pixel_clipped(x as i32, y as i32, [0, 0, 0, 0]);
            }
        }
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Rgba, dash: Option<DashPattern>) {
        let (x0, y0) = (from.x.round() as i32, from.y.round() as i32);
        let (x1, y1) = (to.x.round() as i32, to.y.round() as i32);
        if y0 == y1 {
            self.draw_axis_span(x0, x1, |along| (along, y0), color, dash);
            return;
        }
        if x0 == x1 {
            self.draw_axis_span(y0, y1, |along| (x0, along), color, dash);
            return;
        }

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let step_x = if x0 < x1 { 1 } else { -1 };
        let step_y = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y) = (x0, y0);
        let mut error = dx + dy;
        let mut travelled = 0u32;

        loop {
            if is_dash_on(travelled, dash) {
                self.write_pixel_clipped(x, y, color);
            }
            if x == x1 && y == y1 {
                break;
            }
            let doubled = 2 * error;
            if doubled >= dy {
                error += dy;
                x += step_x;
            }
            if doubled <= dx {
                error += dx;
                y += step_y;
            }
            travelled = travelled.wrapping_add(1);
        }
    }

    fn stroke_rect(&mut self, rect: RectPx, color: Rgba, dash: Option<DashPattern>) {
        let right = rect.right() - 1.0;
        let bottom = rect.bottom() - 1.0;
        let corners = [
            Vec2 { x: rect.x, y: rect.y },
            Vec2 { x: right, y: rect.y },
            Vec2 { x: right, y: bottom },
            Vec2 { x: rect.x, y: bottom },
        ];
        for index in 0..corners.len() {
            let next = corners[(index + 1) % corners.len()];
            self.draw_line(corners[index], next, color, dash);
        }
    }
}

fn is_dash_on(travelled: u32, dash: Option<DashPattern>) -> bool {
    match dash {
        Some(DashPattern { on, off }) if on > 0 => travelled % (on + off) < on,
        _ => true,
    }
}

pub(crate) fn write_pixel_rgba_clipped(
    frame: &mut [u8],
    width: usize,
    x: i32,
    y: i32,
    color: Rgba,
) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
