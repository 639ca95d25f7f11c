use std::ops::RangeInclusive;

use lightview::{
    Canvas, Color, CompositionMode, DrawCommand, DrawSink, FrameBuffer, Light, LightView, Point,
    Rect, Size, ViewMetrics, TILE_PIXELS,
};

use crate::core::{tile_seed, viewport_centered, MapSize, TileKind, TileMap};

// Scene tuneables:
// - DEFAULT_FLOOR_DEPTH: floors below the camera that stay visible.
// - DEPTH_DIM: brightness kept per floor of depth below the camera.
// - LIGHT_MARGIN: tiles outside the window still scanned for emitters.
const DEFAULT_FLOOR_DEPTH: u8 = 2;
const DEPTH_DIM: f32 = 0.6;
const LIGHT_MARGIN: i32 = 4;

/// A light that does not come from a tile, such as a carried torch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedLight {
    pub floor: u8,
    pub x: u16,
    pub y: u16,
    pub light: Light,
}

/// Camera over a [`TileMap`]: which tiles and floors are visible and how
/// large one tile is in frame pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapView {
    view_tiles: MapSize,
    scale_factor: f32,
    floor_depth: u8,
    camera_floor: u8,
    deepest_floor: u8,
    start_x: u16,
    start_y: u16,
}

impl MapView {
    pub fn new(view_tiles: MapSize, scale_factor: f32) -> Self {
        Self {
            view_tiles,
            scale_factor,
            floor_depth: DEFAULT_FLOOR_DEPTH,
            camera_floor: 0,
            deepest_floor: 0,
            start_x: 0,
            start_y: 0,
        }
    }

    pub fn with_floor_depth(mut self, floor_depth: u8) -> Self {
        self.floor_depth = floor_depth;
        self
    }

    /// Centers the window on `(x, y)` and looks down from `floor`.
    pub fn focus(&mut self, map: &TileMap, x: u16, y: u16, floor: u8) {
        let (start_x, start_y) = viewport_centered(
            x,
            y,
            map.size(),
            self.view_tiles.width,
            self.view_tiles.height,
        );
        self.start_x = start_x;
        self.start_y = start_y;
        self.deepest_floor = map.floor_count().saturating_sub(1);
        self.camera_floor = floor.min(self.deepest_floor);
    }

    pub fn set_view_tiles(&mut self, view_tiles: MapSize) {
        self.view_tiles = view_tiles;
    }

    pub fn view_tiles(&self) -> MapSize {
        self.view_tiles
    }

    pub fn camera_floor(&self) -> u8 {
        self.camera_floor
    }

    pub fn origin(&self) -> (u16, u16) {
        (self.start_x, self.start_y)
    }

    /// Window column and row of a map tile, if it is visible.
    pub fn visible_cell(&self, x: u16, y: u16) -> Option<(u16, u16)> {
        let col = x.checked_sub(self.start_x)?;
        let row = y.checked_sub(self.start_y)?;
        (col < self.view_tiles.width && row < self.view_tiles.height).then_some((col, row))
    }

    /// Frame pixel at the center of a map tile. Tiles outside the window
    /// map outside the frame.
    pub fn tile_center(&self, x: u16, y: u16) -> Point {
        let tile = self.tile_size();
        self.cell_origin(
            i32::from(x) - i32::from(self.start_x),
            i32::from(y) - i32::from(self.start_y),
        ) + Point::new(tile / 2, tile / 2)
    }

    fn cell_origin(&self, col: i32, row: i32) -> Point {
        let tile = self.tile_size();
        Point::new(col * tile, row * tile)
    }

    /// Paints the visible floors into `canvas`, deepest first, and feeds
    /// the light view the shades and lights of each floor.
    pub fn draw_scene<F: FrameBuffer>(
        &self,
        map: &TileMap,
        canvas: &mut Canvas,
        light_view: &mut LightView<F>,
        extra_lights: &[PlacedLight],
    ) {
        canvas.clear(Color::BLACK);
        let tile = self.tile_size();
        let cols = i32::from(self.view_tiles.width);
        let rows = i32::from(self.view_tiles.height);

        for z in self.floor_range().rev() {
            let dim = DEPTH_DIM.powi(i32::from(z - self.camera_floor));
            let mut session = light_view.set_floor(z, self);

            for row in -LIGHT_MARGIN..rows + LIGHT_MARGIN {
                for col in -LIGHT_MARGIN..cols + LIGHT_MARGIN {
                    let x = i32::from(self.start_x) + col;
                    let y = i32::from(self.start_y) + row;
                    let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
                        continue;
                    };
                    let kind = map.tile_kind(z, x, y);
                    if kind.is_void() {
                        continue;
                    }

                    let origin = self.cell_origin(col, row);
                    let visible = (0..cols).contains(&col) && (0..rows).contains(&row);
                    if visible {
                        canvas.submit(
                            DrawCommand::filled_rect(
                                Rect::from_parts(origin, Size::new(tile, tile)),
                                tile_color(kind, x, y, dim),
                            )
                            .with_mode(CompositionMode::Replace),
                        );
                        session.set_shade(origin);
                    }
                    if let Some(light) = kind.light() {
                        session.add_light_source(origin + Point::new(tile / 2, tile / 2), light);
                    }
                }
            }

            for placed in extra_lights.iter().filter(|placed| placed.floor == z) {
                session.add_light_source(self.tile_center(placed.x, placed.y), placed.light);
            }
        }
    }
}

impl ViewMetrics for MapView {
    fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    fn tile_size(&self) -> i32 {
        ((TILE_PIXELS as f32 * self.scale_factor).round() as i32).max(1)
    }

    fn floor_range(&self) -> RangeInclusive<u8> {
        let last = self
            .camera_floor
            .saturating_add(self.floor_depth)
            .min(self.deepest_floor);
        self.camera_floor..=last
    }

    fn draw_dimension(&self) -> Size {
        Size::new(
            i32::from(self.view_tiles.width),
            i32::from(self.view_tiles.height),
        )
    }
}

fn tile_color(kind: TileKind, x: u16, y: u16, dim: f32) -> Color {
    let (r, g, b) = match kind {
        TileKind::Void => (0, 0, 0),
        TileKind::Floor => (112, 108, 100),
        TileKind::Grass => (70, 132, 78),
        TileKind::Water => (28, 70, 150),
        TileKind::Wall => (58, 56, 60),
        TileKind::Torch => (224, 168, 80),
        TileKind::Lava => (210, 72, 30),
    };
    // +-6 per tile so large areas do not look flat
    let jitter = (tile_seed(x, y) % 13) as f32 - 6.0;
    let channel = |value: u8| ((f32::from(value) + jitter) * dim).clamp(0.0, 255.0) as u8;
    Color::rgb(channel(r), channel(g), channel(b))
}
