pub use crate::core::{
    tile_seed, viewport_centered, CoreError, FloorGrid, MapSize, TileKind, TileMap,
};
pub use crate::parse::{
    parse_char_grid, parse_floors, Legend, LegendBuilder, ParseError, ParseOptions, TrimMode,
    FLOOR_SEPARATOR,
};
pub use crate::view::{MapView, PlacedLight};

#[cfg(feature = "ratatui")]
pub use crate::render::{blit_half_blocks, BlitLayout};
