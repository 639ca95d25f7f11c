use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tui_map::render::BlitLayout;

use crate::scene::{Marker, ROWS_PER_TILE, Scene};
use crate::state::{AppState, GameMode};

const BG: Color = Color::Rgb(16, 18, 24);
const FG: Color = Color::Rgb(230, 228, 218);
const MUTED: Color = Color::Rgb(146, 148, 154);
const ACCENT: Color = Color::Rgb(233, 199, 104);
const PLAYER: Color = Color::Rgb(255, 252, 244);

const FOOTER_HEIGHT: u16 = 5;

fn split(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(FOOTER_HEIGHT)])
        .split(area);
    (chunks[0], chunks[1])
}

fn map_block(state: &AppState) -> Block<'static> {
    let title = format!("Lightline  {}", state.map.name);
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().bg(BG).fg(FG))
}

/// Where the map window lands for a terminal of `area`. The frame loop needs
/// this before drawing so the scene can be sized ahead of the map pass.
pub fn map_layout(area: Rect) -> BlitLayout {
    let (map_area, _) = split(area);
    let inner = Block::default().borders(Borders::ALL).inner(map_area);
    BlitLayout::fit(inner, ROWS_PER_TILE)
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, scene: &Scene) {
    let (map_area, footer_area) = split(area);

    let block = map_block(state);
    let map_inner = block.inner(map_area);
    frame.render_widget(block, map_area);

    if map_layout(area).is_empty() {
        let warning = Paragraph::new("Resize for map view.")
            .style(Style::default().fg(MUTED))
            .alignment(Alignment::Center);
        frame.render_widget(warning, map_inner);
    } else {
        let buf = frame.buffer_mut();
        scene.blit(buf);
        draw_markers(buf, &scene.markers());
    }

    let mut status = scene.status_lines().into_iter();
    let mut lines = Vec::new();
    if let Some(first) = status.next() {
        lines.push(Line::from(Span::styled(
            first,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )));
    }
    lines.extend(status.map(|line| Line::from(Span::styled(line, Style::default().fg(FG)))));
    lines.push(Line::from(Span::styled(
        controls_line(state.mode),
        Style::default().fg(MUTED),
    )));
    let footer = Paragraph::new(lines).alignment(Alignment::Left);

    frame.render_widget(footer, footer_area);
}

fn controls_line(mode: GameMode) -> &'static str {
    match mode {
        GameMode::Exploration => {
            "Move: WASD/arrows  Floor: </>  Torch: T  Respawn: R  Pause: Esc  Quit: Q"
        }
        GameMode::Pause => "Paused: Esc to resume  Quit: Q",
    }
}

fn draw_markers(buf: &mut Buffer, markers: &[Marker]) {
    for marker in markers {
        if let Some(cell) = buf.cell_mut((marker.x, marker.y)) {
            cell.set_char(marker.glyph)
                .set_style(Style::default().fg(PLAYER).add_modifier(Modifier::BOLD));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightview::{DrawPoolType, LightingConfig, MapWidget};
    use ratatui::{Terminal, backend::TestBackend};
    use tui_map::core::{FloorGrid, MapSize, TileKind, TileMap};

    fn state() -> AppState {
        let ground = FloorGrid::filled(MapSize::new(16, 10), TileKind::Floor);
        AppState::new(TileMap::new("yard", vec![ground]).expect("map"), 0, 10)
    }

    #[test]
    fn layout_sits_inside_the_border() {
        let layout = map_layout(Rect::new(0, 0, 42, 20));
        // 40x13 inner area, two rows and four columns per tile
        assert_eq!(layout.view_tiles, MapSize::new(10, 6));
        assert_eq!((layout.origin_x, layout.origin_y), (1, 1));
    }

    #[test]
    fn render_shows_map_marker_and_status() {
        let state = state();
        let scene = Scene::new(&LightingConfig::default());
        let area = Rect::new(0, 0, 42, 20);
        scene.set_input(state.clone(), map_layout(area));
        for pool in [DrawPoolType::Map, DrawPoolType::Text, DrawPoolType::ForegroundTile] {
            scene.draw_self(pool);
        }

        let mut terminal = Terminal::new(TestBackend::new(42, 20)).expect("terminal");
        terminal
            .draw(|frame| render(frame, area, &state, &scene))
            .expect("draw");

        let buffer = terminal.backend().buffer();
        let marker = scene.markers()[0];
        assert_eq!(buffer.cell((marker.x, marker.y)).expect("cell").symbol(), "@");
        assert_eq!(buffer.cell((1, 2)).expect("cell").symbol(), "▀");

        let footer: String = (0..42)
            .map(|x| buffer.cell((x, 15)).expect("cell").symbol().to_string())
            .collect();
        assert!(footer.starts_with("Floor 1/1"));
    }

    #[test]
    fn tiny_terminal_asks_for_more_room() {
        let state = state();
        let scene = Scene::new(&LightingConfig::default());
        assert!(map_layout(Rect::new(0, 0, 3, 14)).is_empty());

        let mut terminal = Terminal::new(TestBackend::new(3, 14)).expect("terminal");
        terminal
            .draw(|frame| render(frame, frame.area(), &state, &scene))
            .expect("draw");
        assert!(scene.markers().is_empty());
    }
}
