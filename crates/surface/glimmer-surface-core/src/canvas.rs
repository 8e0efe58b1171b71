//! Drawing surface handed to renderers for one frame.

use glimmer_api_core::{Rect, Rgba};

/// Immediate-mode canvas with a save/restore stack of transform and clip state.
///
/// Transforms are limited to scale and translation, which is all layer rendering needs.
pub trait Canvas: Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Push the current state; returns the stack depth before the push.
    fn save(&mut self) -> usize;
    fn restore(&mut self);
    /// Pop states until the stack depth equals `count`.
    fn restore_to_count(&mut self, count: usize);
    fn save_count(&self) -> usize;

    fn translate(&mut self, dx: f32, dy: f32);
    fn scale(&mut self, sx: f32, sy: f32);
    /// Intersect the clip with `rect`, in local coordinates.
    fn clip_rect(&mut self, rect: Rect);

    /// Fill the whole canvas, ignoring transform and clip.
    fn clear(&mut self, color: Rgba);
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    /// Fill `rect`, asking `shader` for the colour at each normalized position inside it.
    fn fill_rect_with(&mut self, rect: Rect, shader: &dyn Fn(f32, f32) -> Rgba);

    /// Row-major pixels, `width * height` long.
    fn pixels(&self) -> &[Rgba];
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct CanvasState {
    sx: f32,
    sy: f32,
    tx: f32,
    ty: f32,
    clip: Rect,
}

/// CPU canvas used by [`SoftwareContext`](crate::SoftwareContext).
pub struct SoftwareCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
    state: CanvasState,
    stack: Vec<CanvasState>,
}

impl SoftwareCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        let bounds = Rect::new(0.0, 0.0, width as f32, height as f32);
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
            state: CanvasState {
                sx: 1.0,
                sy: 1.0,
                tx: 0.0,
                ty: 0.0,
                clip: bounds,
            },
            stack: Vec::new(),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    fn to_device(&self, rect: Rect) -> Rect {
        let s = &self.state;
        let x0 = rect.x * s.sx + s.tx;
        let y0 = rect.y * s.sy + s.ty;
        let x1 = rect.right() * s.sx + s.tx;
        let y1 = rect.bottom() * s.sy + s.ty;
        Rect::new(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs())
    }

    /// Pixel index range covered by `device`, using pixel-centre sampling.
    fn pixel_span(&self, device: Rect) -> Option<(u32, u32, u32, u32)> {
        let area = device.intersect(&self.state.clip);
        if area.is_empty() {
            return None;
        }
        let x0 = (area.x - 0.5).ceil().max(0.0) as u32;
        let y0 = (area.y - 0.5).ceil().max(0.0) as u32;
        let x1 = ((area.right() - 0.5).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((area.bottom() - 0.5).ceil().max(0.0) as u32).min(self.height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgba) {
        let idx = (y * self.width + x) as usize;
        if let Some(px) = self.pixels.get_mut(idx) {
            *px = color.over(*px);
        }
    }
}

impl Canvas for SoftwareCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn save(&mut self) -> usize {
        let depth = self.stack.len();
        self.stack.push(self.state);
        depth
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn restore_to_count(&mut self, count: usize) {
        while self.stack.len() > count {
            self.restore();
        }
    }

    fn save_count(&self) -> usize {
        self.stack.len()
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.tx += dx * self.state.sx;
        self.state.ty += dy * self.state.sy;
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.state.sx *= sx;
        self.state.sy *= sy;
    }

    fn clip_rect(&mut self, rect: Rect) {
        let device = self.to_device(rect);
        self.state.clip = self.state.clip.intersect(&device);
    }

    fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let Some((x0, y0, x1, y1)) = self.pixel_span(self.to_device(rect)) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color);
            }
        }
    }

    fn fill_rect_with(&mut self, rect: Rect, shader: &dyn Fn(f32, f32) -> Rgba) {
        let device = self.to_device(rect);
        let Some((x0, y0, x1, y1)) = self.pixel_span(device) else {
            return;
        };
        for y in y0..y1 {
            let v = (y as f32 + 0.5 - device.y) / device.height;
            for x in x0..x1 {
                let u = (x as f32 + 0.5 - device.x) / device.width;
                let color = shader(u, v);
                self.blend(x, y, color);
            }
        }
    }

    fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }
}
