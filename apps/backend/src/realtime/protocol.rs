use serde::{Deserialize, Serialize};

use crate::domain::game::Game;

/// Event kinds pushed to a player's socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LobbyEvent {
    GameUpdate,
    OpponentLeft,
}

/// Wire shape relayed verbatim to the browser: `{"Event": .., "Game": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyEventMessage {
    #[serde(rename = "Event")]
    pub event: LobbyEvent,
    #[serde(rename = "Game")]
    pub game: Option<Game>,
}

impl LobbyEventMessage {
    pub fn game_update(game: Option<Game>) -> Self {
        Self {
            event: LobbyEvent::GameUpdate,
            game,
        }
    }

    pub fn opponent_left(game: Option<Game>) -> Self {
        Self {
            event: LobbyEvent::OpponentLeft,
            game,
        }
    }
}
