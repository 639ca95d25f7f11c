use std::collections::HashMap;

use crate::core::{CoreError, FloorGrid, MapSize, TileKind, TileMap};

/// Line that separates two floors in a multi-floor map; the topmost floor
/// comes first.
pub const FLOOR_SEPARATOR: &str = "---";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrimMode {
    PreserveRightWhitespace,
    TrimBoth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    pub trim_mode: TrimMode,
    pub default_char: char,
    pub default_tile: TileKind,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            trim_mode: TrimMode::PreserveRightWhitespace,
            default_char: ' ',
            default_tile: TileKind::Void,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Legend {
    map: HashMap<char, TileKind>,
}

impl Legend {
    pub fn builder() -> LegendBuilder {
        LegendBuilder::default()
    }

    pub fn tile_for(&self, ch: char) -> Option<TileKind> {
        self.map.get(&ch).copied()
    }
}

impl Default for Legend {
    /// `.` floor, `"` grass, `~` water, `#` wall, `t` torch, `l` lava; blanks are void.
    fn default() -> Self {
        let mut map = HashMap::new();
        map.insert(' ', TileKind::Void);
        map.insert('.', TileKind::Floor);
        map.insert('"', TileKind::Grass);
        map.insert('~', TileKind::Water);
        map.insert('#', TileKind::Wall);
        map.insert('t', TileKind::Torch);
        map.insert('l', TileKind::Lava);
        Self { map }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LegendBuilder {
    entries: HashMap<char, TileKind>,
}

impl LegendBuilder {
    pub fn entry(mut self, ch: char, tile: TileKind) -> Self {
        self.entries.insert(ch, tile);
        self
    }

    pub fn build(self) -> Result<Legend, ParseError> {
        if self.entries.is_empty() {
            return Err(ParseError::EmptyLegend);
        }

        if self.entries.keys().any(|ch| *ch == '\0') {
            return Err(ParseError::InvalidLegendChar);
        }

        Ok(Legend { map: self.entries })
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("legend must contain at least one entry")]
    EmptyLegend,
    #[error("legend contains an invalid character")]
    InvalidLegendChar,
    #[error("floor {floor}, row {row}: unknown legend key {ch:?}")]
    UnknownLegendKey { ch: char, floor: usize, row: usize },
    #[error("map text contains no tiles")]
    EmptyMap,
    #[error(transparent)]
    Map(#[from] CoreError),
}

/// Parses a single floor. Rows shorter than the widest one are padded with
/// the default tile; blank lines before and after the grid are ignored.
pub fn parse_char_grid(
    map_text: &str,
    legend: &Legend,
    options: &ParseOptions,
) -> Result<FloorGrid, ParseError> {
    let lines: Vec<&str> = map_text.lines().collect();
    let rows = section_rows(&lines, options);
    let size = MapSize::new(grid_width(&rows) as u16, rows.len() as u16);
    build_floor(0, &rows, size, legend, options)
}

/// Parses floors separated by [`FLOOR_SEPARATOR`] lines into one map. Every
/// floor is padded to the size of the largest one.
pub fn parse_floors(
    map_name: &str,
    map_text: &str,
    legend: &Legend,
    options: &ParseOptions,
) -> Result<TileMap, ParseError> {
    let lines: Vec<&str> = map_text.lines().collect();
    let sections: Vec<Vec<Vec<char>>> = lines
        .split(|line| line.trim() == FLOOR_SEPARATOR)
        .map(|section| section_rows(section, options))
        .collect();

    let width = sections.iter().map(|rows| grid_width(rows)).max().unwrap_or(0);
    let height = sections.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 || height == 0 {
        return Err(ParseError::EmptyMap);
    }

    let size = MapSize::new(width as u16, height as u16);
    let floors = sections
        .iter()
        .enumerate()
        .map(|(floor, rows)| build_floor(floor, rows, size, legend, options))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TileMap::new(map_name, floors)?)
}

fn section_rows(lines: &[&str], options: &ParseOptions) -> Vec<Vec<char>> {
    let trimmed: Vec<&str> = lines
        .iter()
        .map(|line| match options.trim_mode {
            TrimMode::TrimBoth => line.trim(),
            TrimMode::PreserveRightWhitespace => line.trim_end(),
        })
        .collect();

    let first = trimmed.iter().position(|line| !line.is_empty());
    let last = trimmed.iter().rposition(|line| !line.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => trimmed[first..=last]
            .iter()
            .map(|line| line.chars().collect())
            .collect(),
        _ => Vec::new(),
    }
}

fn grid_width(rows: &[Vec<char>]) -> usize {
    rows.iter().map(Vec::len).max().unwrap_or(0)
}

fn build_floor(
    floor: usize,
    rows: &[Vec<char>],
    size: MapSize,
    legend: &Legend,
    options: &ParseOptions,
) -> Result<FloorGrid, ParseError> {
    let mut tiles = Vec::with_capacity(size.tile_count());
    for row in 0..size.height as usize {
        let chars = rows.get(row).map(Vec::as_slice).unwrap_or_default();
        for x in 0..size.width as usize {
            let ch = chars.get(x).copied().unwrap_or(options.default_char);
            let tile = if let Some(tile) = legend.tile_for(ch) {
                tile
            } else if ch == options.default_char {
                options.default_tile
            } else {
                return Err(ParseError::UnknownLegendKey { ch, floor, row });
            };
            tiles.push(tile);
        }
    }

    Ok(FloorGrid::new(size, tiles)?)
}
