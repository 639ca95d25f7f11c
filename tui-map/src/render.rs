use lightview::Canvas;
use ratatui::{buffer::Buffer, layout::Rect, style::Color};

use crate::core::MapSize;

const UPPER_HALF_BLOCK: &str = "▀";

/// Placement of a map window inside a terminal area. Every tile covers
/// `cols_per_tile` x `rows_per_tile` cells; each cell shows two square
/// pixels stacked vertically, so tiles are twice as wide in cells as tall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlitLayout {
    pub origin_x: u16,
    pub origin_y: u16,
    pub view_tiles: MapSize,
    pub cols_per_tile: u16,
    pub rows_per_tile: u16,
}

impl BlitLayout {
    /// Fits as many whole tiles as possible into `area` and centers them.
    pub fn fit(area: Rect, rows_per_tile: u16) -> Self {
        let rows_per_tile = rows_per_tile.max(1);
        let cols_per_tile = rows_per_tile * 2;
        let view_tiles = MapSize::new(area.width / cols_per_tile, area.height / rows_per_tile);
        let used_cols = view_tiles.width * cols_per_tile;
        let used_rows = view_tiles.height * rows_per_tile;
        Self {
            origin_x: area.x + (area.width - used_cols) / 2,
            origin_y: area.y + (area.height - used_rows) / 2,
            view_tiles,
            cols_per_tile,
            rows_per_tile,
        }
    }

    pub fn area(&self) -> Rect {
        Rect::new(
            self.origin_x,
            self.origin_y,
            self.view_tiles.width * self.cols_per_tile,
            self.view_tiles.height * self.rows_per_tile,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.view_tiles.width == 0 || self.view_tiles.height == 0
    }

    pub fn marker_cell(&self, col: u16, row: u16) -> Option<(u16, u16)> {
        if col >= self.view_tiles.width || row >= self.view_tiles.height {
            return None;
        }
        Some((
            self.origin_x + col * self.cols_per_tile + self.cols_per_tile / 2,
            self.origin_y + row * self.rows_per_tile + self.rows_per_tile / 2,
        ))
    }
}

/// Draws `canvas` into `area` with upper half blocks: the foreground is the
/// top pixel of a cell, the background the bottom one. Each terminal pixel is
/// the box-filtered average of the canvas pixels it covers.
pub fn blit_half_blocks(canvas: &Canvas, buf: &mut Buffer, area: Rect) {
    let size = canvas.size();
    if area.width == 0 || area.height == 0 || size.is_empty() {
        return;
    }

    let pixel_rows = u32::from(area.height) * 2;
    for row in 0..area.height {
        for col in 0..area.width {
            let top = average(
                canvas,
                area.width.into(),
                pixel_rows,
                col.into(),
                2 * u32::from(row),
            );
            let bottom = average(
                canvas,
                area.width.into(),
                pixel_rows,
                col.into(),
                2 * u32::from(row) + 1,
            );
            if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                cell.set_symbol(UPPER_HALF_BLOCK).set_fg(top).set_bg(bottom);
            }
        }
    }
}

fn average(canvas: &Canvas, cols: u32, rows: u32, col: u32, row: u32) -> Color {
    let size = canvas.size();
    let (width, height) = (size.width as u32, size.height as u32);
    let x0 = col * width / cols;
    let x1 = ((col + 1) * width / cols).max(x0 + 1).min(width);
    let y0 = row * height / rows;
    let y1 = ((row + 1) * height / rows).max(y0 + 1).min(height);

    let image = canvas.image();
    let mut sum = [0u32; 3];
    let mut count = 0u32;
    for y in y0..y1 {
        for x in x0..x1 {
            let pixel = image.get_pixel(x, y);
            sum[0] += u32::from(pixel[0]);
            sum[1] += u32::from(pixel[1]);
            sum[2] += u32::from(pixel[2]);
            count += 1;
        }
    }
    if count == 0 {
        return Color::Rgb(0, 0, 0);
    }
    Color::Rgb(
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    )
}
