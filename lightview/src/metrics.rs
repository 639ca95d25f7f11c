use std::ops::RangeInclusive;

use crate::geometry::Size;

/// Unscaled edge length of one map tile, in pixels.
pub const TILE_PIXELS: i32 = 32;

/// Highest floor index the per-floor light table can address.
pub const MAX_FLOOR: u8 = 15;

/// Read-only view of the map view the lighting is drawn for.
pub trait ViewMetrics {
    fn scale_factor(&self) -> f32;

    /// Edge length of one tile in frame pixels.
    fn tile_size(&self) -> i32;

    /// Visible floors, topmost (lowest index) first.
    fn floor_range(&self) -> RangeInclusive<u8>;

    /// Visible area in tiles.
    fn draw_dimension(&self) -> Size;

    /// Pixel size of the cached tile frame the light buffer must match.
    fn frame_size(&self) -> Size {
        let tiles = self.draw_dimension();
        let tile_size = self.tile_size();
        Size::new(tiles.width * tile_size, tiles.height * tile_size)
    }
}

pub(crate) fn clamp_floor(floor: u8) -> u8 {
    floor.min(MAX_FLOOR)
}
