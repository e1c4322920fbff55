use serde::{Deserialize, Serialize};

use crate::domain::board::Side;
use crate::domain::errors::LobbyError;
use crate::domain::game::Game;

/// A two-seat room. `player1` hosts; `player2` is the joiner, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lobby {
    pub lobby_id: String,
    pub player1: String,
    pub player2: Option<String>,
    /// Present once a second player has joined. Kept after the guest
    /// leaves so the host can still see the last position.
    pub game: Option<Game>,
}

/// What is left of a lobby after one of its players walks out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// The host was alone; the lobby record should be deleted.
    Disbanded,
    /// The host left and the guest now holds the first seat.
    Promoted { lobby: Lobby, remaining: String },
    /// The guest left; the host keeps the lobby.
    OpponentRemoved { lobby: Lobby, remaining: String },
    /// The caller holds no seat in this lobby; nothing changes.
    NotSeated(Lobby),
}

impl Departure {
    /// Player who should be told their opponent left.
    pub fn remaining(&self) -> Option<&str> {
        match self {
            Departure::Promoted { remaining, .. } | Departure::OpponentRemoved { remaining, .. } => {
                Some(remaining)
            }
            Departure::Disbanded | Departure::NotSeated(_) => None,
        }
    }
}

impl Lobby {
    pub fn open(lobby_id: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            lobby_id: lobby_id.into(),
            player1: host.into(),
            player2: None,
            game: None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.player2.is_some()
    }

    /// The side a player moves for, derived from seat order.
    pub fn side_of(&self, player_id: &str) -> Option<Side> {
        if self.player1 == player_id {
            Some(Side::Player1)
        } else if self.player2.as_deref() == Some(player_id) {
            Some(Side::Player2)
        } else {
            None
        }
    }

    /// Every seated player, host first.
    pub fn players(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.player1.as_str()).chain(self.player2.as_deref())
    }

    /// Seat `player_id` as the guest and start a fresh game.
    pub fn seat_opponent(&mut self, player_id: &str) -> Result<(), LobbyError> {
        if self.is_full() {
            return Err(LobbyError::LobbyFull(self.lobby_id.clone()));
        }
        self.player2 = Some(player_id.to_string());
        self.game = Some(Game::new());
        Ok(())
    }

    /// Remove `player_id` from its seat, promoting the guest when the host leaves.
    pub fn remove_player(mut self, player_id: &str) -> Departure {
        match self.side_of(player_id) {
            Some(Side::Player1) => match self.player2.take() {
                None => Departure::Disbanded,
                Some(guest) => {
                    self.player1 = guest.clone();
                    Departure::Promoted {
                        lobby: self,
                        remaining: guest,
                    }
                }
            },
            Some(Side::Player2) => {
                self.player2 = None;
                let remaining = self.player1.clone();
                Departure::OpponentRemoved {
                    lobby: self,
                    remaining,
                }
            }
            None => Departure::NotSeated(self),
        }
    }
}
