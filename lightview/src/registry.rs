use crate::geometry::Point;
use crate::light::{Light, LightSource, ShadeBlock};
use crate::metrics::{MAX_FLOOR, ViewMetrics, clamp_floor};

const FLOOR_SLOTS: usize = MAX_FLOOR as usize + 1;

/// Lights and shades submitted by the scene traversal for the current frame.
#[derive(Clone, Debug)]
pub struct LightRegistry {
    shades: Vec<ShadeBlock>,
    lights: [Vec<LightSource>; FLOOR_SLOTS],
}

impl Default for LightRegistry {
    fn default() -> Self {
        Self {
            shades: Vec::new(),
            lights: std::array::from_fn(|_| Vec::new()),
        }
    }
}

impl LightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards every shade and allocates `slots` empty ones.
    pub fn resize_shades(&mut self, slots: usize) {
        self.shades.clear();
        self.shades.resize(slots, ShadeBlock::default());
    }

    pub fn add_light_source(
        &mut self,
        floor: u8,
        pos: Point,
        light: Light,
        metrics: &dyn ViewMetrics,
    ) {
        let source = LightSource::from_light(pos, light, metrics.scale_factor());
        self.lights[usize::from(clamp_floor(floor))].push(source);
    }

    /// Marks the tile under `pos` as covered by `floor`. Positions outside
    /// the shade table are ignored.
    pub fn set_shade(&mut self, floor: u8, pos: Point, metrics: &dyn ViewMetrics) {
        let Some(index) = shade_index(pos, metrics) else {
            return;
        };
        if let Some(slot) = self.shades.get_mut(index) {
            *slot = ShadeBlock {
                floor: Some(clamp_floor(floor)),
                pos,
            };
        }
    }

    pub fn lights_on(&self, floor: u8) -> &[LightSource] {
        &self.lights[usize::from(clamp_floor(floor))]
    }

    pub fn shades(&self) -> &[ShadeBlock] {
        &self.shades
    }

    pub fn shade_count(&self) -> usize {
        self.shades.len()
    }

    pub fn pending_lights(&self) -> usize {
        self.lights.iter().map(Vec::len).sum()
    }

    pub fn clear_lights(&mut self) {
        for floor in &mut self.lights {
            floor.clear();
        }
    }

    pub(crate) fn floor_parts(&mut self, floor: u8) -> (&mut [ShadeBlock], &mut Vec<LightSource>) {
        (
            &mut self.shades,
            &mut self.lights[usize::from(clamp_floor(floor))],
        )
    }
}

fn shade_index(pos: Point, metrics: &dyn ViewMetrics) -> Option<usize> {
    let tile_size = metrics.tile_size();
    if tile_size <= 0 || pos.x < 0 || pos.y < 0 {
        return None;
    }
    let width = metrics.draw_dimension().width.max(0) as usize;
    let column = (pos.x / tile_size) as usize;
    let row = (pos.y / tile_size) as usize;
    Some(width * row + column)
}

/// Scene traversal handle for one floor. Everything submitted through it is
/// attributed to that floor.
pub struct FloorSession<'a> {
    registry: &'a mut LightRegistry,
    metrics: &'a dyn ViewMetrics,
    floor: u8,
}

impl<'a> FloorSession<'a> {
    pub(crate) fn new(
        registry: &'a mut LightRegistry,
        metrics: &'a dyn ViewMetrics,
        floor: u8,
    ) -> Self {
        Self {
            registry,
            metrics,
            floor: clamp_floor(floor),
        }
    }

    pub fn floor(&self) -> u8 {
        self.floor
    }

    pub fn add_light_source(&mut self, pos: Point, light: Light) {
        self.registry
            .add_light_source(self.floor, pos, light, self.metrics);
    }

    pub fn set_shade(&mut self, pos: Point) {
        self.registry.set_shade(self.floor, pos, self.metrics);
    }
}

#[cfg(test)]
mod tests {
    use std::ops::RangeInclusive;

    use super::*;
    use crate::geometry::Size;

    struct Grid;

    impl ViewMetrics for Grid {
        fn scale_factor(&self) -> f32 {
            1.0
        }

        fn tile_size(&self) -> i32 {
            32
        }

        fn floor_range(&self) -> RangeInclusive<u8> {
            0..=7
        }

        fn draw_dimension(&self) -> Size {
            Size::new(4, 3)
        }
    }

    fn registry() -> LightRegistry {
        let mut registry = LightRegistry::new();
        registry.resize_shades(Grid.draw_dimension().area());
        registry
    }

    #[test]
    fn set_shade_writes_row_major_slot() {
        let mut registry = registry();
        registry.set_shade(7, Point::new(70, 40), &Grid);
        assert_eq!(
            registry.shades()[4 + 2],
            ShadeBlock {
                floor: Some(7),
                pos: Point::new(70, 40),
            }
        );
    }

    #[test]
    fn out_of_range_shade_is_dropped() {
        let mut registry = registry();
        let before = registry.shades().to_vec();

        registry.set_shade(7, Point::new(0, 3 * 32), &Grid);
        registry.set_shade(7, Point::new(-1, 0), &Grid);
        registry.set_shade(7, Point::new(5000, 5000), &Grid);

        assert_eq!(registry.shades(), before.as_slice());
    }

    #[test]
    fn session_attributes_to_its_floor() {
        let mut registry = registry();
        {
            let mut session = FloorSession::new(&mut registry, &Grid, 6);
            session.add_light_source(Point::new(10, 10), Light::new(3, 215));
            session.set_shade(Point::new(0, 0));
        }

        assert_eq!(registry.lights_on(6).len(), 1);
        assert_eq!(registry.lights_on(7).len(), 0);
        assert_eq!(registry.shades()[0].floor, Some(6));
    }

    #[test]
    fn floors_past_the_table_are_clamped() {
        let mut registry = registry();
        registry.add_light_source(200, Point::default(), Light::new(1, 1), &Grid);
        assert_eq!(registry.lights_on(MAX_FLOOR).len(), 1);
        assert_eq!(FloorSession::new(&mut registry, &Grid, 99).floor(), MAX_FLOOR);
    }

    #[test]
    fn resize_discards_shades() {
        let mut registry = registry();
        registry.set_shade(1, Point::new(0, 0), &Grid);
        registry.resize_shades(20);
        assert_eq!(registry.shade_count(), 20);
        assert!(registry.shades().iter().all(|shade| shade.floor.is_none()));
    }
}
