use std::cmp::Ordering;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};
use crate::metrics::TILE_PIXELS;

/// Intensity and palette color of an emitter, or of the whole scene when used
/// as the global ambient light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Light {
    pub intensity: u8,
    pub color: u8,
}

impl Light {
    pub const fn new(intensity: u8, color: u8) -> Self {
        Self { intensity, color }
    }
}

// Source shaping tuneables:
// - RADIUS_PER_INTENSITY: tiles of reach per intensity step.
// - BRIGHT/DIM: the two brightness levels a source can take.
const RADIUS_PER_INTENSITY: f32 = 1.2;
const BRIGHT: f32 = 1.0;
const DIM: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    pub pos: Point,
    pub color: u8,
    pub radius: u16,
    pub brightness: f32,
}

impl LightSource {
    pub fn from_light(pos: Point, light: Light, scale_factor: f32) -> Self {
        let radius = f32::from(light.intensity)
            * RADIUS_PER_INTENSITY
            * TILE_PIXELS as f32
            * scale_factor;
        Self {
            pos,
            color: light.color,
            radius: radius as u16,
            brightness: if light.intensity > 1 { BRIGHT } else { DIM },
        }
    }

    /// Brightness first, palette color second. Stronger sources sort last so
    /// they land on top of weaker ones in the same floor pass.
    pub fn draw_order(&self, other: &Self) -> Ordering {
        self.brightness
            .total_cmp(&other.brightness)
            .then_with(|| self.color.cmp(&other.color))
    }

    pub fn draw_rect(&self) -> Rect {
        let radius = i32::from(self.radius);
        Rect::from_parts(
            self.pos - Point::new(radius, radius),
            Size::new(radius * 2, radius * 2),
        )
    }
}

/// One slot per visible tile cell. `floor` is `None` until a shade is set,
/// and again once the compositor has stamped it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShadeBlock {
    pub floor: Option<u8>,
    pub pos: Point,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(brightness: f32, color: u8) -> LightSource {
        LightSource {
            pos: Point::default(),
            color,
            radius: 10,
            brightness,
        }
    }

    #[test]
    fn radius_and_brightness_follow_intensity() {
        let bright = LightSource::from_light(Point::new(5, 5), Light::new(2, 30), 1.0);
        assert_eq!(bright.radius, 76);
        assert_eq!(bright.brightness, 1.0);

        let dim = LightSource::from_light(Point::new(5, 5), Light::new(1, 30), 0.5);
        assert_eq!(dim.radius, 19);
        assert_eq!(dim.brightness, 0.1);
    }

    #[test]
    fn equal_brightness_orders_by_color() {
        let a = source(0.1, 5);
        let b = source(0.1, 9);
        assert_eq!(a.draw_order(&b), Ordering::Less);
        assert_eq!(b.draw_order(&a), Ordering::Greater);
    }

    #[test]
    fn brightness_dominates_color() {
        let dim = source(0.1, 9);
        let bright = source(1.0, 1);
        assert_eq!(dim.draw_order(&bright), Ordering::Less);

        let mut lights = vec![bright, dim];
        lights.sort_by(LightSource::draw_order);
        assert_eq!(lights, vec![dim, bright]);
    }

    #[test]
    fn identical_sources_compare_equal() {
        let a = source(1.0, 4);
        assert_eq!(a.draw_order(&a), Ordering::Equal);
    }

    #[test]
    fn draw_rect_is_centered() {
        let light = source(1.0, 1);
        assert_eq!(light.draw_rect(), Rect::new(-10, -10, 20, 20));
    }
}
