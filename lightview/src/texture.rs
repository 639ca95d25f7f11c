use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::geometry::Size;

#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    image: RgbaImage,
    smooth: bool,
}

impl Texture {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            smooth: false,
        }
    }

    pub fn blank(size: Size) -> Self {
        let width = size.width.max(0) as u32;
        let height = size.height.max(0) as u32;
        Self::new(RgbaImage::new(width, height))
    }

    pub fn with_smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    pub fn set_smooth(&mut self, smooth: bool) {
        self.smooth = smooth;
    }

    pub fn is_smooth(&self) -> bool {
        self.smooth
    }

    pub fn size(&self) -> Size {
        Size::new(self.image.width() as i32, self.image.height() as i32)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image.get_pixel_checked(x, y).map(|pixel| Color::from(*pixel))
    }

    /// Samples at continuous texel coordinates (pixel centers sit on `.5`),
    /// bilinear when smooth, nearest otherwise. Edges clamp.
    pub fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        if self.image.width() == 0 || self.image.height() == 0 {
            return [0.0; 4];
        }

        if !self.smooth {
            return self.texel(u.floor() as i64, v.floor() as i64);
        }

        let x = u - 0.5;
        let y = v - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top_left = self.texel(x0, y0);
        let top_right = self.texel(x0 + 1, y0);
        let bottom_left = self.texel(x0, y0 + 1);
        let bottom_right = self.texel(x0 + 1, y0 + 1);

        let mut out = [0.0; 4];
        for channel in 0..4 {
            let top = top_left[channel] + (top_right[channel] - top_left[channel]) * fx;
            let bottom =
                bottom_left[channel] + (bottom_right[channel] - bottom_left[channel]) * fx;
            out[channel] = top + (bottom - top) * fy;
        }
        out
    }

    fn texel(&self, x: i64, y: i64) -> [f32; 4] {
        let x = x.clamp(0, i64::from(self.image.width()) - 1) as u32;
        let y = y.clamp(0, i64::from(self.image.height()) - 1) as u32;
        Color::from(*self.image.get_pixel(x, y)).to_unit()
    }
}

/// Radial light bubble of `2 * bubble_radius` pixels: opaque white whose alpha
/// falls off with the square of the normalized distance from the center.
pub fn generate_light_texture(
    bubble_radius: u16,
    brightness_intensity: f32,
    center_factor: f32,
) -> Texture {
    let radius = f32::from(bubble_radius);
    let center_radius = (radius * center_factor).floor();
    let span = radius - center_radius;
    let diameter = u32::from(bubble_radius) * 2;

    let image = RgbaImage::from_fn(diameter, diameter, |x, y| {
        let dx = radius - x as f32;
        let dy = radius - y as f32;
        let distance = (dx * dx + dy * dy).sqrt();
        let intensity = if span > 0.0 {
            ((radius - distance) / span).clamp(0.0, 1.0)
        } else if distance <= radius {
            1.0
        } else {
            0.0
        };

        // inverse-square falloff
        let alpha = (intensity * intensity * brightness_intensity).clamp(0.0, 1.0) * 255.0;
        Rgba([0xff, 0xff, 0xff, alpha as u8])
    });

    Texture::new(image).with_smooth(true)
}

/// Opaque white square with a one pixel transparent border.
pub fn generate_shade_texture(diameter: u16) -> Texture {
    let size = u32::from(diameter);
    let image = RgbaImage::from_fn(size, size, |x, y| {
        let border = x == 0 || y == 0 || x + 1 == size || y + 1 == size;
        Rgba([0xff, 0xff, 0xff, if border { 0 } else { 0xff }])
    });

    Texture::new(image).with_smooth(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha(texture: &Texture, x: u32, y: u32) -> u8 {
        texture.pixel(x, y).expect("pixel in range").a
    }

    #[test]
    fn light_bubble_peaks_at_center() {
        let texture = generate_light_texture(32, 1.2, 0.0);
        assert_eq!(texture.size(), Size::new(64, 64));
        assert_eq!(alpha(&texture, 32, 32), 255);
        assert!(texture.is_smooth());
    }

    #[test]
    fn light_bubble_fades_outwards_and_clamps() {
        let texture = generate_light_texture(32, 1.0, 0.0);
        let mut previous = alpha(&texture, 32, 32);
        for x in 33..64 {
            let current = alpha(&texture, x, 32);
            assert!(current <= previous, "alpha rose at x={x}: {previous} -> {current}");
            previous = current;
        }
        assert!(alpha(&texture, 40, 32) < alpha(&texture, 34, 32));
        // distance == radius on the row through the center
        assert_eq!(alpha(&texture, 0, 32), 0);
        // corners lie outside the bubble
        assert_eq!(alpha(&texture, 0, 0), 0);
        assert_eq!(alpha(&texture, 63, 63), 0);
    }

    #[test]
    fn light_bubble_pixels_are_white() {
        let texture = generate_light_texture(8, 1.2, 0.0);
        let pixel = texture.pixel(3, 5).expect("pixel");
        assert_eq!((pixel.r, pixel.g, pixel.b), (255, 255, 255));
    }

    #[test]
    fn center_factor_widens_the_core() {
        let texture = generate_light_texture(32, 1.0, 0.5);
        assert_eq!(alpha(&texture, 32 + 10, 32), 255);
        assert_eq!(alpha(&texture, 0, 32), 0);
    }

    #[test]
    fn shade_has_transparent_border_and_opaque_interior() {
        let texture = generate_shade_texture(6);
        for y in 0..6 {
            for x in 0..6 {
                let border = x == 0 || y == 0 || x == 5 || y == 5;
                let expected = if border { 0 } else { 255 };
                assert_eq!(alpha(&texture, x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn nearest_and_bilinear_sampling() {
        let mut texture = generate_shade_texture(4).with_smooth(false);
        assert_eq!(texture.sample(0.5, 0.5)[3], 0.0);
        assert_eq!(texture.sample(1.5, 1.5)[3], 1.0);

        texture.set_smooth(true);
        let edge = texture.sample(1.0, 1.5)[3];
        assert!(edge > 0.0 && edge < 1.0, "bilinear edge sample was {edge}");
    }
}
