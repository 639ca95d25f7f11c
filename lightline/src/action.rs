use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::Direction;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    Init,

    Move(Direction),
    Climb,
    Descend,
    ToggleTorch,
    Tick,

    PauseOpen,
    PauseClose,

    Quit,
}
