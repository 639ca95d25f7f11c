mod action;
mod effect;
mod reducer;
mod scene;
mod state;
mod ui;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use lightview::{DrawPoolType, FrameOrchestrator, LightingConfig};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use tokio::runtime::Runtime;
use tracing::info;
use tui_dispatch::EffectStore;
use tui_map::core::TileMap;
use tui_map::parse::{Legend, ParseOptions, parse_floors};

use crate::action::Action;
use crate::effect::Effect;
use crate::scene::Scene;
use crate::state::{AppState, Direction, GameMode};

const BUILTIN_MAP: &str = include_str!("../maps/undercroft.txt");

#[derive(Parser, Debug)]
#[command(name = "lightline")]
#[command(about = "Multi-floor tile map with a day/night cycle and dynamic lights")]
struct Args {
    /// Lighting config (JSON). Missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Map file with floors separated by `---` lines, topmost first.
    #[arg(long)]
    map: Option<PathBuf>,
    /// Start time in minutes after midnight.
    #[arg(long, default_value_t = 19 * 60 + 30)]
    time: u16,
    #[arg(long, default_value_t = 2)]
    minutes_per_tick: u16,
    #[arg(long, default_value = "lightline.log")]
    log_file: PathBuf,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let config = match &args.config {
        Some(path) => LightingConfig::load(path).map_err(io::Error::other)?,
        None => LightingConfig::default(),
    };
    let map = load_map(args.map.as_deref())?;
    info!(map = %map.name, floors = map.floor_count(), "starting");
    let state = AppState::new(map, args.time, args.minutes_per_tick);
    let runtime = Runtime::new()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &runtime, &config, state);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_map(path: Option<&Path>) -> io::Result<TileMap> {
    let (name, text) = match path {
        Some(path) => {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "map".to_string());
            (name, fs::read_to_string(path)?)
        }
        None => ("undercroft".to_string(), BUILTIN_MAP.to_string()),
    };
    parse_floors(&name, &text, &Legend::default(), &ParseOptions::default())
        .map_err(io::Error::other)
}

struct App {
    store: EffectStore<AppState, Action, Effect>,
    scene: Arc<Scene>,
    orchestrator: FrameOrchestrator<Scene>,
    overlay_stale: bool,
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    runtime: &Runtime,
    config: &LightingConfig,
    state: AppState,
) -> io::Result<()> {
    let mut app = App {
        store: EffectStore::new(state, reducer::reducer),
        scene: Arc::new(Scene::new(config)),
        orchestrator: FrameOrchestrator::new(runtime.handle().clone()),
        overlay_stale: true,
    };
    app.dispatch(Action::Init);

    let mut last_layout = None;
    loop {
        let size = terminal.size()?;
        let layout = ui::map_layout(Rect::new(0, 0, size.width, size.height));
        if last_layout != Some(layout) {
            last_layout = Some(layout);
            app.overlay_stale = true;
        }
        app.scene.set_input(app.store.state().clone(), layout);
        app.draw_passes();

        terminal.draw(|frame| ui::render(frame, frame.area(), app.store.state(), &app.scene))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if app.handle_key(key.code) {
                        break;
                    }
                }
                _ => {}
            }
        }

        app.dispatch(Action::Tick);
    }

    Ok(())
}

impl App {
    fn draw_passes(&mut self) {
        if std::mem::take(&mut self.overlay_stale) {
            self.orchestrator.pool(DrawPoolType::Text).request_repaint();
            self.orchestrator
                .pool(DrawPoolType::ForegroundTile)
                .request_repaint();
        }

        // fire and forget: a late overlay shows up on the next frame
        let scene = Arc::clone(&self.scene);
        drop(
            self.orchestrator
                .draw_foreground_tile(true, move || Some(scene)),
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        let mode = self.store.state().mode;

        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.dispatch(Action::Quit);
                true
            }
            KeyCode::Esc => {
                if mode == GameMode::Pause {
                    self.dispatch(Action::PauseClose);
                } else {
                    self.dispatch(Action::PauseOpen);
                }
                false
            }
            _ if mode != GameMode::Exploration => false,
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
                self.dispatch(Action::Move(Direction::Up));
                false
            }
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
                self.dispatch(Action::Move(Direction::Down));
                false
            }
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                self.dispatch(Action::Move(Direction::Left));
                false
            }
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                self.dispatch(Action::Move(Direction::Right));
                false
            }
            KeyCode::Char('<') | KeyCode::PageUp => {
                self.dispatch(Action::Climb);
                false
            }
            KeyCode::Char('>') | KeyCode::PageDown => {
                self.dispatch(Action::Descend);
                false
            }
            KeyCode::Char('t') | KeyCode::Char('T') => {
                self.dispatch(Action::ToggleTorch);
                false
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.dispatch(Action::Init);
                false
            }
            _ => false,
        }
    }

    fn dispatch(&mut self, action: Action) {
        let result = self.store.dispatch(action);
        if result.changed {
            self.overlay_stale = true;
        }
        for effect in result.effects {
            self.handle_effect(effect);
        }
    }

    fn handle_effect(&mut self, effect: Effect) {
        match effect {
            Effect::SchedulePainting => self.scene.schedule_painting(),
        }
    }
}
