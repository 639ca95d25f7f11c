use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::state::{AppState, Direction, GameMode, spawn_point};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            let (x, y, floor) = spawn_point(&state.map);
            state.player.x = x;
            state.player.y = y;
            state.player.floor = floor;
            state.player.steps = 0;
            state.mode = GameMode::Exploration;
            state.last_status = Some(format!("Entered {}.", state.map.name));
            DispatchResult::changed_with(Effect::SchedulePainting)
        }
        Action::Move(direction) => handle_move(state, direction),
        Action::Climb => change_floor(state, -1),
        Action::Descend => change_floor(state, 1),
        Action::ToggleTorch => {
            if state.mode != GameMode::Exploration {
                return DispatchResult::unchanged();
            }
            state.player.torch_lit = !state.player.torch_lit;
            state.last_status = Some(
                if state.player.torch_lit {
                    "Torch lit."
                } else {
                    "Torch out."
                }
                .to_string(),
            );
            DispatchResult::changed_with(Effect::SchedulePainting)
        }
        Action::Tick => {
            if state.mode != GameMode::Exploration {
                return DispatchResult::unchanged();
            }
            let before = state.global_light();
            state.clock.advance();
            if state.global_light() != before {
                return DispatchResult::changed_with(Effect::SchedulePainting);
            }
            DispatchResult::changed()
        }
        Action::PauseOpen => {
            if state.mode == GameMode::Exploration {
                state.mode = GameMode::Pause;
                return DispatchResult::changed();
            }
            DispatchResult::unchanged()
        }
        Action::PauseClose => {
            if state.mode == GameMode::Pause {
                state.mode = GameMode::Exploration;
                return DispatchResult::changed();
            }
            DispatchResult::unchanged()
        }
        Action::Quit => DispatchResult::unchanged(),
    }
}

fn handle_move(state: &mut AppState, direction: Direction) -> DispatchResult<Effect> {
    if state.mode != GameMode::Exploration {
        return DispatchResult::unchanged();
    }

    let (curr_x, curr_y) = state.player_pos();
    let (mut next_x, mut next_y) = (curr_x, curr_y);
    match direction {
        Direction::Up => next_y = next_y.saturating_sub(1),
        Direction::Down => next_y = next_y.saturating_add(1),
        Direction::Left => next_x = next_x.saturating_sub(1),
        Direction::Right => next_x = next_x.saturating_add(1),
    }

    if (next_x, next_y) == (curr_x, curr_y) {
        return DispatchResult::unchanged();
    }
    if !state.is_walkable(state.player.floor, next_x, next_y) {
        state.last_status = Some("Blocked path.".to_string());
        return DispatchResult::unchanged();
    }

    state.player.x = next_x;
    state.player.y = next_y;
    state.player.steps = state.player.steps.saturating_add(1);
    state.last_status = None;
    // the camera follows the player, so every light shifts in the frame
    DispatchResult::changed_with(Effect::SchedulePainting)
}

fn change_floor(state: &mut AppState, delta: i8) -> DispatchResult<Effect> {
    if state.mode != GameMode::Exploration {
        return DispatchResult::unchanged();
    }

    let going_up = delta < 0;
    let target = state.player.floor.checked_add_signed(delta);
    let Some(target) = target.filter(|floor| *floor < state.map.floor_count()) else {
        state.last_status = Some(
            if going_up {
                "Nothing above."
            } else {
                "Nothing below."
            }
            .to_string(),
        );
        return DispatchResult::unchanged();
    };

    let (x, y) = state.player_pos();
    if !state.is_walkable(target, x, y) {
        state.last_status = Some(
            if going_up {
                "No way up here."
            } else {
                "No way down here."
            }
            .to_string(),
        );
        return DispatchResult::unchanged();
    }

    state.player.floor = target;
    state.last_status = Some(format!("Floor {}.", target));
    DispatchResult::changed_with(Effect::SchedulePainting)
}
