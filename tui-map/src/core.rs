use lightview::Light;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Nothing on this floor; the floors below show through.
    #[default]
    Void,
    Floor,
    Grass,
    Water,
    Wall,
    Torch,
    Lava,
}

// Emitter tuneables (8-bit palette colors):
// - TORCH_LIGHT: warm orange, three intensity steps.
// - LAVA_LIGHT: deep red, two steps.
const TORCH_LIGHT: Light = Light::new(3, 198);
const LAVA_LIGHT: Light = Light::new(2, 186);

impl TileKind {
    /// Light emitted by the tile itself, if any.
    pub fn light(self) -> Option<Light> {
        match self {
            TileKind::Torch => Some(TORCH_LIGHT),
            TileKind::Lava => Some(LAVA_LIGHT),
            _ => None,
        }
    }

    pub fn is_walkable(self) -> bool {
        matches!(self, TileKind::Floor | TileKind::Grass)
    }

    pub fn is_void(self) -> bool {
        self == TileKind::Void
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapSize {
    pub width: u16,
    pub height: u16,
}

impl MapSize {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn tile_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("map has no floors")]
    NoFloors,
    #[error("floor {floor} is {actual:?}, expected {expected:?}")]
    FloorSizeMismatch {
        floor: usize,
        expected: MapSize,
        actual: MapSize,
    },
    #[error("map has {0} floors, at most 16 are supported")]
    TooManyFloors(usize),
}

/// One floor of tiles in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FloorGrid {
    pub size: MapSize,
    pub tiles: Vec<TileKind>,
}

impl FloorGrid {
    pub fn new(size: MapSize, tiles: Vec<TileKind>) -> Result<Self, CoreError> {
        let expected = size.tile_count();
        let actual = tiles.len();
        if expected != actual {
            return Err(CoreError::TileCountMismatch { expected, actual });
        }
        Ok(Self { size, tiles })
    }

    pub fn filled(size: MapSize, tile: TileKind) -> Self {
        Self {
            size,
            tiles: vec![tile; size.tile_count()],
        }
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some(y as usize * self.size.width as usize + x as usize)
    }

    pub fn tile_at(&self, x: u16, y: u16) -> Option<TileKind> {
        let idx = self.index(x, y)?;
        self.tiles.get(idx).copied()
    }

    pub fn set(&mut self, x: u16, y: u16, tile: TileKind) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.tiles[idx] = tile;
                true
            }
            None => false,
        }
    }
}

/// A stack of equally sized floors. Floor 0 is the topmost; higher indices
/// lie deeper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    pub name: String,
    size: MapSize,
    floors: Vec<FloorGrid>,
}

impl TileMap {
    pub const MAX_FLOORS: usize = lightview::MAX_FLOOR as usize + 1;

    pub fn new(name: impl Into<String>, floors: Vec<FloorGrid>) -> Result<Self, CoreError> {
        let first = floors.first().ok_or(CoreError::NoFloors)?;
        if floors.len() > Self::MAX_FLOORS {
            return Err(CoreError::TooManyFloors(floors.len()));
        }
        let size = first.size;
        if let Some((floor, grid)) = floors
            .iter()
            .enumerate()
            .find(|(_, grid)| grid.size != size)
        {
            return Err(CoreError::FloorSizeMismatch {
                floor,
                expected: size,
                actual: grid.size,
            });
        }
        Ok(Self {
            name: name.into(),
            size,
            floors,
        })
    }

    pub fn size(&self) -> MapSize {
        self.size
    }

    pub fn floor_count(&self) -> u8 {
        self.floors.len() as u8
    }

    pub fn floor(&self, z: u8) -> Option<&FloorGrid> {
        self.floors.get(z as usize)
    }

    /// Tile at `(x, y)` on floor `z`; everything outside the map is void.
    pub fn tile_kind(&self, z: u8, x: u16, y: u16) -> TileKind {
        self.floor(z)
            .and_then(|grid| grid.tile_at(x, y))
            .unwrap_or(TileKind::Void)
    }

    /// First tile of floor `z` in row-major order matching `predicate`.
    pub fn find(&self, z: u8, predicate: impl Fn(TileKind) -> bool) -> Option<(u16, u16)> {
        let grid = self.floor(z)?;
        let idx = grid.tiles.iter().position(|tile| predicate(*tile))?;
        let width = grid.size.width as usize;
        Some(((idx % width) as u16, (idx / width) as u16))
    }
}

pub fn viewport_centered(
    focus_x: u16,
    focus_y: u16,
    map: MapSize,
    view_cols: u16,
    view_rows: u16,
) -> (u16, u16) {
    if map.width == 0 || map.height == 0 || view_cols == 0 || view_rows == 0 {
        return (0, 0);
    }

    let half_cols = view_cols / 2;
    let half_rows = view_rows / 2;
    let max_x = map.width.saturating_sub(view_cols);
    let max_y = map.height.saturating_sub(view_rows);
    let start_x = focus_x.saturating_sub(half_cols).min(max_x);
    let start_y = focus_y.saturating_sub(half_rows).min(max_y);
    (start_x, start_y)
}

/// Stable per-tile hash used for texture variation.
pub fn tile_seed(x: u16, y: u16) -> u32 {
    let mut n = x as u32;
    n = n
        .wrapping_mul(374_761_393)
        .wrapping_add((y as u32).wrapping_mul(668_265_263));
    n ^= n >> 13;
    n = n.wrapping_mul(1_274_126_177);
    n ^= n >> 16;
    n
}
