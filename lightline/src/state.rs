use lightview::Light;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_map::core::{TileKind, TileMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum GameMode {
    Exploration,
    Pause,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

// Day cycle tunables (minutes since midnight):
// - DAWN..SUNRISE ramps the ambient up, SUNSET..DUSK ramps it down.
// - NIGHT_LIGHT/DAY_LIGHT are the two plateaus.
// - COOL_BELOW: ambient intensity under which the sky turns blue.
pub const MINUTES_PER_DAY: u16 = 24 * 60;
const DAWN: u16 = 5 * 60;
const SUNRISE: u16 = 7 * 60;
const SUNSET: u16 = 18 * 60;
const DUSK: u16 = 20 * 60;
const NIGHT_LIGHT: u8 = 40;
const DAY_LIGHT: u8 = 255;
const COOL_BELOW: u8 = 128;
const WARM_WHITE: u8 = 215;
const MOONLIGHT: u8 = 173;

/// Hand-held torch: two intensity steps, yellow.
pub const TORCH_LIGHT: Light = Light::new(2, 206);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerState {
    pub x: u16,
    pub y: u16,
    pub floor: u8,
    pub torch_lit: bool,
    pub steps: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockState {
    pub minute: u16,
    pub minutes_per_tick: u16,
}

impl ClockState {
    pub fn advance(&mut self) {
        let next = u32::from(self.minute) + u32::from(self.minutes_per_tick);
        self.minute = (next % u32::from(MINUTES_PER_DAY)) as u16;
    }

    pub fn hours_minutes(self) -> (u16, u16) {
        (self.minute / 60, self.minute % 60)
    }

    /// Ambient light for the current time of day.
    pub fn global_light(self) -> Light {
        let intensity = ambient_intensity(self.minute);
        let color = if intensity < COOL_BELOW {
            MOONLIGHT
        } else {
            WARM_WHITE
        };
        Light::new(intensity, color)
    }
}

fn ambient_intensity(minute: u16) -> u8 {
    let ramp = |from: u16, to: u16, rising: bool| {
        let t = f32::from(minute - from) / f32::from(to - from);
        let t = if rising { t } else { 1.0 - t };
        let span = f32::from(DAY_LIGHT - NIGHT_LIGHT);
        (f32::from(NIGHT_LIGHT) + span * t).round() as u8
    };

    match minute {
        m if m < DAWN || m >= DUSK => NIGHT_LIGHT,
        m if m < SUNRISE => ramp(DAWN, SUNRISE, true),
        m if m < SUNSET => DAY_LIGHT,
        _ => ramp(SUNSET, DUSK, false),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppState {
    pub mode: GameMode,
    pub map: TileMap,
    pub player: PlayerState,
    pub clock: ClockState,
    pub last_status: Option<String>,
}

impl AppState {
    pub fn new(map: TileMap, start_minute: u16, minutes_per_tick: u16) -> Self {
        let (x, y, floor) = spawn_point(&map);
        Self {
            mode: GameMode::Exploration,
            map,
            player: PlayerState {
                x,
                y,
                floor,
                torch_lit: true,
                steps: 0,
            },
            clock: ClockState {
                minute: start_minute % MINUTES_PER_DAY,
                minutes_per_tick,
            },
            last_status: None,
        }
    }

    pub fn global_light(&self) -> Light {
        self.clock.global_light()
    }

    pub fn player_pos(&self) -> (u16, u16) {
        (self.player.x, self.player.y)
    }

    pub fn tile_under_player(&self) -> TileKind {
        self.map
            .tile_kind(self.player.floor, self.player.x, self.player.y)
    }

    pub fn is_walkable(&self, floor: u8, x: u16, y: u16) -> bool {
        self.map.tile_kind(floor, x, y).is_walkable()
    }
}

/// First walkable tile, searching from the top floor down.
pub fn spawn_point(map: &TileMap) -> (u16, u16, u8) {
    (0..map.floor_count())
        .find_map(|floor| {
            map.find(floor, TileKind::is_walkable)
                .map(|(x, y)| (x, y, floor))
        })
        .unwrap_or((0, 0, 0))
}
