//! Domain layer: board, rule engine and lobby membership.

pub mod board;
pub mod errors;
pub mod game;
pub mod lobby;
pub mod player;

#[cfg(test)]
mod test_prelude;

// Re-exports for ergonomics
pub use board::{Board, Cell, Side};
pub use errors::{LobbyError, MoveError};
pub use game::{evaluate_move, has_won, Game, Move, Phase};
pub use lobby::{Departure, Lobby};
pub use player::Player;
