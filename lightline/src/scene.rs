use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lightview::{
    Canvas, DARKNESS_THRESHOLD, DrawPoolType, LightView, LightingConfig, MapWidget, Rect,
    SoftFrameBuffer, ViewMetrics,
};
use ratatui::buffer::Buffer;
use tui_map::core::MapSize;
use tui_map::render::{BlitLayout, blit_half_blocks};
use tui_map::view::{MapView, PlacedLight};

use crate::state::{AppState, TORCH_LIGHT};

/// Frame pixels per map tile are `TILE_PIXELS * SCALE_FACTOR`.
pub const SCALE_FACTOR: f32 = 0.25;
pub const ROWS_PER_TILE: u16 = 2;

/// What a frame is drawn from: a snapshot of the store and the terminal
/// placement of the map window.
#[derive(Debug)]
pub struct FrameInput {
    pub state: AppState,
    pub layout: BlitLayout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marker {
    pub x: u16,
    pub y: u16,
    pub glyph: char,
}

struct MapLayer {
    view: MapView,
    lights: LightView,
    canvas: Canvas,
}

/// The lit map panel. Each draw pool paints into its own slot so the text and
/// foreground passes can run on a worker while the map pass runs on the UI
/// thread.
pub struct Scene {
    input: Mutex<Option<Arc<FrameInput>>>,
    map: Mutex<MapLayer>,
    text: Mutex<Vec<String>>,
    markers: Mutex<Vec<Marker>>,
    pending_repaint: AtomicBool,
}

impl Scene {
    pub fn new(config: &LightingConfig) -> Self {
        let view = MapView::new(MapSize::default(), SCALE_FACTOR);
        let lights = LightView::new(SoftFrameBuffer::new(), config, &view);
        let canvas = Canvas::new(view.frame_size());
        Self {
            input: Mutex::new(None),
            map: Mutex::new(MapLayer {
                view,
                lights,
                canvas,
            }),
            text: Mutex::new(Vec::new()),
            markers: Mutex::new(Vec::new()),
            pending_repaint: AtomicBool::new(false),
        }
    }

    pub fn set_input(&self, state: AppState, layout: BlitLayout) {
        *lock(&self.input) = Some(Arc::new(FrameInput { state, layout }));
    }

    /// Requests a light buffer recomposite on the next map pass. The request
    /// is applied after that pass has set the ambient light, so it survives a
    /// transition from day to night.
    pub fn schedule_painting(&self) {
        self.pending_repaint.store(true, Ordering::Release);
    }

    /// Copies the last map pass into the layout area of `buf`.
    pub fn blit(&self, buf: &mut Buffer) {
        let Some(input) = self.input() else {
            return;
        };
        let area = input.layout.area().intersection(buf.area);
        let layer = lock(&self.map);
        blit_half_blocks(&layer.canvas, buf, area);
    }

    pub fn status_lines(&self) -> Vec<String> {
        lock(&self.text).clone()
    }

    pub fn markers(&self) -> Vec<Marker> {
        lock(&self.markers).clone()
    }

    fn input(&self) -> Option<Arc<FrameInput>> {
        lock(&self.input).clone()
    }

    fn draw_map(&self, input: &FrameInput) {
        let state = &input.state;
        let mut guard = lock(&self.map);
        let layer = &mut *guard;

        if layer.view.view_tiles() != input.layout.view_tiles {
            layer.view.set_view_tiles(input.layout.view_tiles);
            layer.lights.resize(&layer.view);
            layer.canvas.resize(layer.view.frame_size());
        }

        layer
            .view
            .focus(&state.map, state.player.x, state.player.y, state.player.floor);
        layer.lights.set_global_light(state.global_light());
        if self.pending_repaint.swap(false, Ordering::AcqRel) {
            layer.lights.schedule_painting();
        }

        let torch = state.player.torch_lit.then_some(PlacedLight {
            floor: state.player.floor,
            x: state.player.x,
            y: state.player.y,
            light: TORCH_LIGHT,
        });
        layer.view.draw_scene(
            &state.map,
            &mut layer.canvas,
            &mut layer.lights,
            torch.as_slice(),
        );

        let frame = Rect::from_size(layer.view.frame_size());
        layer.lights.draw(&mut layer.canvas, &layer.view, frame, frame);
    }

    fn draw_text(&self, input: &FrameInput) {
        let state = &input.state;
        let (hours, minutes) = state.clock.hours_minutes();
        let ambient = state.global_light();
        let phase = if ambient.intensity < DARKNESS_THRESHOLD {
            "night"
        } else {
            "day"
        };

        let lines = vec![
            format!(
                "Floor {}/{}  {:02}:{:02} ({phase})  Ambient {}",
                state.player.floor + 1,
                state.map.floor_count(),
                hours,
                minutes,
                ambient.intensity,
            ),
            format!(
                "Torch {}  Steps {}  Ground {:?}",
                if state.player.torch_lit { "lit" } else { "out" },
                state.player.steps,
                state.tile_under_player(),
            ),
            state
                .last_status
                .clone()
                .unwrap_or_else(|| "Wander the undercroft until dawn.".to_string()),
        ];
        *lock(&self.text) = lines;
    }

    fn draw_foreground(&self, input: &FrameInput) {
        let state = &input.state;
        let mut view = MapView::new(input.layout.view_tiles, SCALE_FACTOR);
        view.focus(&state.map, state.player.x, state.player.y, state.player.floor);

        let markers = view
            .visible_cell(state.player.x, state.player.y)
            .and_then(|(col, row)| input.layout.marker_cell(col, row))
            .map(|(x, y)| Marker { x, y, glyph: '@' })
            .into_iter()
            .collect();
        *lock(&self.markers) = markers;
    }
}

impl MapWidget for Scene {
    fn draw_self(&self, pool: DrawPoolType) {
        let Some(input) = self.input() else {
            return;
        };
        match pool {
            DrawPoolType::Map => self.draw_map(&input),
            DrawPoolType::Text => self.draw_text(&input),
            DrawPoolType::ForegroundTile => self.draw_foreground(&input),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightview::{Color, FrameBuffer};
    use ratatui::layout::Rect as TermRect;
    use tui_map::core::{FloorGrid, TileKind, TileMap};

    fn room() -> TileMap {
        let mut ground = FloorGrid::filled(MapSize::new(12, 8), TileKind::Floor);
        ground.set(0, 0, TileKind::Wall);
        TileMap::new("room", vec![ground]).expect("map")
    }

    fn scene() -> Scene {
        Scene::new(&LightingConfig {
            min_update_interval_ms: 0,
            ..LightingConfig::default()
        })
    }

    fn layout() -> BlitLayout {
        BlitLayout::fit(TermRect::new(0, 0, 40, 12), ROWS_PER_TILE)
    }

    fn midnight() -> AppState {
        AppState::new(room(), 0, 10)
    }

    fn player_pixel(scene: &Scene, state: &AppState) -> Color {
        let layer = lock(&scene.map);
        let center = layer.view.tile_center(state.player.x, state.player.y);
        layer.canvas.pixel(center.x, center.y).expect("pixel")
    }

    #[test]
    fn map_pass_sizes_the_frame_to_the_layout() {
        let scene = scene();
        scene.set_input(midnight(), layout());
        scene.draw_self(DrawPoolType::Map);

        let layer = lock(&scene.map);
        assert_eq!(layer.view.view_tiles(), MapSize::new(10, 6));
        assert_eq!(layer.canvas.size(), lightview::Size::new(80, 48));
        assert_eq!(layer.lights.buffer().size(), lightview::Size::new(80, 48));
    }

    #[test]
    fn torch_is_only_repainted_when_scheduled() {
        let scene = scene();
        let lit = midnight();
        scene.set_input(lit.clone(), layout());
        scene.draw_self(DrawPoolType::Map);
        let with_torch = player_pixel(&scene, &lit);

        let mut dark = lit.clone();
        dark.player.torch_lit = false;
        scene.set_input(dark.clone(), layout());
        scene.draw_self(DrawPoolType::Map);
        assert_eq!(player_pixel(&scene, &dark), with_torch);

        scene.schedule_painting();
        scene.draw_self(DrawPoolType::Map);
        let without_torch = player_pixel(&scene, &dark);
        assert!(without_torch.r < with_torch.r);
    }

    #[test]
    fn repaint_requested_at_nightfall_is_applied() {
        let scene = scene();
        let mut state = midnight();
        scene.set_input(state.clone(), layout());
        scene.draw_self(DrawPoolType::Map);
        let with_torch = player_pixel(&scene, &state);

        state.clock.minute = 12 * 60;
        scene.set_input(state.clone(), layout());
        scene.draw_self(DrawPoolType::Map);

        // the request arrives with the state that turns the scene dark again
        state.clock.minute = 0;
        state.player.torch_lit = false;
        scene.set_input(state.clone(), layout());
        scene.schedule_painting();
        scene.draw_self(DrawPoolType::Map);
        assert!(player_pixel(&scene, &state).r < with_torch.r);
    }

    #[test]
    fn text_pass_reports_clock_and_torch() {
        let scene = scene();
        scene.set_input(midnight(), layout());
        scene.draw_self(DrawPoolType::Text);

        let lines = scene.status_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Floor 1/1  00:00 (night)"));
        assert!(lines[1].starts_with("Torch lit  Steps 0"));
    }

    #[test]
    fn foreground_pass_marks_the_player() {
        let scene = scene();
        let state = midnight();
        scene.set_input(state, layout());
        scene.draw_self(DrawPoolType::ForegroundTile);

        // player spawns at (1, 0) and the window is clamped to the map corner
        assert_eq!(
            scene.markers(),
            vec![Marker {
                x: 6,
                y: 1,
                glyph: '@'
            }]
        );
    }

    #[test]
    fn nothing_is_drawn_without_input() {
        let scene = scene();
        scene.draw_self(DrawPoolType::Text);
        scene.draw_self(DrawPoolType::Map);
        assert!(scene.status_lines().is_empty());
        assert!(scene.markers().is_empty());
    }
}
