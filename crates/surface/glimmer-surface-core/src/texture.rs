//! The frame texture and the led group that samples it.

use glimmer_api_core::{Rect, Rgba, Vec2};

use crate::canvas::Canvas;
use crate::context::GraphicsContext;
use crate::device::{Device, DeviceId, LedColor};
use crate::error::SurfaceError;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextureSize {
    pub width: u32,
    pub height: u32,
    /// Scale actually applied, lower than requested when the surface would not fit.
    pub scale: f32,
}

/// Size the texture for `bounds`: sides rounded up to even numbers, multiplied by
/// `render_scale`, at least one pixel and at most `max` pixels. Surfaces too large for `max`
/// are downscaled as a whole so every led stays on the texture.
pub fn texture_size(bounds: Rect, render_scale: f32, max: u32) -> TextureSize {
    let even = |v: f32| {
        let v = v.max(0.0).ceil();
        if v % 2.0 != 0.0 {
            v + 1.0
        } else {
            v
        }
    };
    let (w, h) = (even(bounds.width), even(bounds.height));
    let max_f = max as f32;
    let mut scale = render_scale;
    if w * scale > max_f {
        scale = max_f / w;
    }
    if h * scale > max_f {
        scale = max_f / h;
    }
    let side = |v: f32| ((v * scale).round() as u32).clamp(1, max);
    TextureSize {
        width: side(w),
        height: side(h),
        scale,
    }
}

pub struct Texture {
    canvas: Box<dyn Canvas>,
    pixels: Vec<Rgba>,
    size: TextureSize,
    origin: Vec2,
}

impl Texture {
    pub fn new(
        context: &dyn GraphicsContext,
        bounds: Rect,
        render_scale: f32,
    ) -> Result<Self, SurfaceError> {
        let size = texture_size(bounds, render_scale, context.max_texture_size());
        let canvas = context.create_canvas(size.width, size.height)?;
        Ok(Self {
            canvas,
            pixels: vec![Rgba::BLACK; size.width as usize * size.height as usize],
            size,
            origin: Vec2::new(bounds.x, bounds.y),
        })
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn scale(&self) -> f32 {
        self.size.scale
    }

    /// Surface-space position of the top-left pixel.
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub(crate) fn canvas_mut(&mut self) -> &mut dyn Canvas {
        self.canvas.as_mut()
    }

    /// Pixels as of the last completed frame.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.size.width as usize + x as usize)
            .copied()
    }

    pub(crate) fn copy_pixels(&mut self) {
        let src = self.canvas.pixels();
        if src.len() == self.pixels.len() {
            self.pixels.copy_from_slice(src);
        }
    }

    /// Average colour of the texture under a surface-space rectangle. Rectangles smaller than a
    /// pixel take the pixel under their centre.
    pub fn sample(&self, rect: Rect) -> Rgba {
        let scale = self.size.scale;
        let area = rect
            .translated(-self.origin.x, -self.origin.y)
            .scaled(scale);
        let x0 = (area.x - 0.5).ceil().max(0.0) as u32;
        let y0 = (area.y - 0.5).ceil().max(0.0) as u32;
        let x1 = ((area.right() - 0.5).ceil().max(0.0) as u32).min(self.size.width);
        let y1 = ((area.bottom() - 0.5).ceil().max(0.0) as u32).min(self.size.height);

        if x0 >= x1 || y0 >= y1 {
            let cx = (area.x + area.width / 2.0).floor().max(0.0) as u32;
            let cy = (area.y + area.height / 2.0).floor().max(0.0) as u32;
            return self.pixel(cx, cy).unwrap_or(Rgba::BLACK);
        }

        let mut sum = [0u32; 4];
        let mut count = 0u32;
        for y in y0..y1 {
            for x in x0..x1 {
                if let Some(p) = self.pixel(x, y) {
                    sum[0] += p.r as u32;
                    sum[1] += p.g as u32;
                    sum[2] += p.b as u32;
                    sum[3] += p.a as u32;
                    count += 1;
                }
            }
        }
        if count == 0 {
            return Rgba::BLACK;
        }
        Rgba::from_channels(sum.map(|c| c as f32 / count as f32))
    }
}

/// Every led of the enabled devices, sampled together once per frame.
#[derive(Clone, Debug, Default)]
pub struct LedGroup {
    targets: Vec<(DeviceId, String, Rect)>,
}

impl LedGroup {
    pub fn new(devices: &[Device]) -> Self {
        let targets = devices
            .iter()
            .filter(|d| d.enabled)
            .flat_map(|d| {
                d.leds
                    .iter()
                    .map(move |l| (d.id.clone(), l.id.clone(), l.rect))
            })
            .collect();
        Self { targets }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn sample(&self, texture: &Texture) -> Vec<LedColor> {
        self.targets
            .iter()
            .map(|(device, led, rect)| LedColor {
                device: device.clone(),
                led: led.clone(),
                color: texture.sample(*rect),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SoftwareContext;

    #[test]
    fn it_should_round_up_to_even_sides() {
        let size = texture_size(Rect::new(0.0, 0.0, 101.0, 21.0), 0.5, 4096);
        assert_eq!((size.width, size.height), (51, 11));
        let size = texture_size(Rect::default(), 0.5, 4096);
        assert_eq!((size.width, size.height), (1, 1));
    }

    #[test]
    fn it_should_downscale_oversized_surfaces() {
        let size = texture_size(Rect::new(0.0, 0.0, 10000.0, 100.0), 1.0, 4096);
        assert_eq!(size.width, 4096);
        assert_eq!(size.height, 41);
        assert!((size.scale - 0.4096).abs() < 1e-6);
    }

    #[test]
    fn it_should_average_led_areas() {
        let devices = vec![Device::new("strip", "Strip")
            .with_led("left", Rect::new(10.0, 0.0, 10.0, 10.0))
            .with_led("right", Rect::new(20.0, 0.0, 10.0, 10.0))];
        let bounds = crate::device::surface_bounds(&devices);
        let mut texture = Texture::new(&SoftwareContext, bounds, 1.0).unwrap();
        {
            let canvas = texture.canvas_mut();
            canvas.clear(Rgba::BLACK);
            canvas.translate(-10.0, 0.0);
            canvas.fill_rect(Rect::new(10.0, 0.0, 10.0, 10.0), Rgba::opaque(255, 0, 0));
            canvas.fill_rect(Rect::new(20.0, 0.0, 5.0, 10.0), Rgba::opaque(0, 0, 200));
        }
        texture.copy_pixels();

        let colors = LedGroup::new(&devices).sample(&texture);
        assert_eq!(colors[0].color, Rgba::opaque(255, 0, 0));
        assert_eq!(colors[1].color, Rgba::opaque(0, 0, 100));
    }
}
