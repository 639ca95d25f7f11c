use std::sync::Arc;

use crate::color::Color;
use crate::config::LightingConfig;
use crate::draw::{BlendEquation, CompositionMode, DrawCommand, DrawSink};
use crate::geometry::{Point, Rect, Size};
use crate::light::{Light, LightSource};
use crate::metrics::{ViewMetrics, clamp_floor};
use crate::registry::LightRegistry;
use crate::texture::{Texture, generate_light_texture, generate_shade_texture};

/// Owns the procedural light and shade stamps and turns a filled registry into
/// a light buffer.
#[derive(Clone, Debug)]
pub struct Compositor {
    light_texture: Arc<Texture>,
    shade_texture: Arc<Texture>,
    shade_scale: f32,
}

impl Compositor {
    pub fn new(config: &LightingConfig) -> Self {
        Self {
            light_texture: Arc::new(generate_light_texture(
                config.bubble_radius,
                config.brightness_intensity,
                config.center_factor,
            )),
            shade_texture: Arc::new(generate_shade_texture(config.shade_diameter)),
            shade_scale: config.shade_scale,
        }
    }

    pub fn light_texture(&self) -> &Arc<Texture> {
        &self.light_texture
    }

    pub fn shade_texture(&self) -> &Arc<Texture> {
        &self.shade_texture
    }

    /// Paints one frame of lighting into `target`.
    ///
    /// The buffer is first filled with the ambient color. Floors are then
    /// walked from the deepest visible one up to the topmost: every shade
    /// registered for the floor dims its tile back to ambient, after which the
    /// floor's lights are stamped dimmest first. Consumed shades are reset and
    /// every light list (visible or not) is empty afterwards.
    pub fn draw_lights(
        &self,
        target: &mut dyn DrawSink,
        global: Light,
        buffer_size: Size,
        registry: &mut LightRegistry,
        metrics: &dyn ViewMetrics,
    ) {
        let ambient = Color::from_8bit(global.color, f32::from(global.intensity) / 255.0);
        target.submit(
            DrawCommand::filled_rect(Rect::from_size(buffer_size), ambient)
                .with_mode(CompositionMode::Replace),
        );

        let tile_size = metrics.tile_size();
        let range = metrics.floor_range();
        // floors past the table share its last slot; visit that slot once
        let floors = clamp_floor(*range.start())..=clamp_floor(*range.end());
        for floor in floors.rev() {
            let (shades, lights) = registry.floor_parts(floor);

            for shade in shades.iter_mut().filter(|shade| shade.floor == Some(floor)) {
                shade.floor = None;
                target.submit(self.stamp(
                    self.shade_rect(shade.pos, tile_size),
                    &self.shade_texture,
                    ambient,
                ));
            }

            lights.sort_by(LightSource::draw_order);
            for light in lights.drain(..) {
                let tint = Color::from_8bit(light.color, light.brightness);
                target.submit(self.stamp(light.draw_rect(), &self.light_texture, tint));
            }
        }

        registry.clear_lights();
    }

    fn shade_rect(&self, pos: Point, tile_size: i32) -> Rect {
        let tile = tile_size as f32;
        let offset = (tile / self.shade_scale) as i32;
        let extent = (tile * self.shade_scale) as i32;
        Rect::from_parts(pos - Point::new(offset, offset), Size::new(extent, extent))
    }

    fn stamp(&self, dest: Rect, texture: &Arc<Texture>, tint: Color) -> DrawCommand {
        DrawCommand::textured_rect(dest, Arc::clone(texture), tint)
            .with_mode(CompositionMode::Normal)
            .with_equation(BlendEquation::Add)
    }
}
