use serde::{Deserialize, Serialize};

use crate::domain::board::{board_index, is_adjacent, Board, Cell, Side, EMPTY_CELLS_IN_PLAY};
use crate::domain::errors::MoveError;

/// Game progression phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Each side blindly places three marks.
    Setup,
    /// Marks relocate along board adjacency.
    Playing,
    /// A line of three was formed.
    GameOver,
}

/// One game's board and turn state.
///
/// Field names on the wire follow the browser client (`State`, `Turn`, `Board`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    #[serde(rename = "State")]
    pub phase: Phase,
    /// Side to move next; once the game is over, the winner.
    #[serde(rename = "Turn")]
    pub turn: Side,
    #[serde(rename = "Board")]
    pub board: Board,
}

impl Game {
    pub fn new() -> Self {
        Self {
            phase: Phase::Setup,
            turn: Side::Player1,
            board: Board::empty(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// The winning side, if the game has ended.
    pub fn winner(&self) -> Option<Side> {
        self.is_over().then_some(self.turn)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// A requested move. `from` is only consulted once the game is in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Option<i32>,
    pub to: i32,
}

impl Move {
    pub fn place(to: i32) -> Self {
        Self { from: None, to }
    }

    pub fn relocate(from: i32, to: i32) -> Self {
        Self {
            from: Some(from),
            to,
        }
    }
}

/// True if `side` occupies any winning line on the game's board.
pub fn has_won(game: &Game, side: Side) -> bool {
    game.board.has_line(side)
}

/// Validate `mv` for `side` against `game` and return the resulting game.
///
/// The input is never modified; on error the caller still holds the
/// untouched game.
pub fn evaluate_move(game: &Game, side: Side, mv: Move) -> Result<Game, MoveError> {
    if game.phase == Phase::GameOver {
        return Err(MoveError::GameIsOver);
    }
    if side != game.turn {
        return Err(MoveError::WrongSide);
    }
    let to = board_index(mv.to).ok_or(MoveError::TargetOutOfBounds)?;
    if !game.board.cells()[to].is_empty() {
        return Err(MoveError::TargetIsNotEmpty);
    }

    let mut next = *game;
    match game.phase {
        Phase::Setup => {
            next.board.set(to, Cell::from(side));
            settle_after_placement(&mut next, side);
        }
        Phase::Playing => {
            let raw_from = mv.from.ok_or(MoveError::SourceMissing)?;
            let from = board_index(raw_from).ok_or(MoveError::SourceOutOfBounds)?;
            if game.board.cells()[from].side() != Some(side) {
                return Err(MoveError::SourceDoesNotBelongToSide);
            }
            if !is_adjacent(from, to) {
                return Err(MoveError::InvalidTarget);
            }

            next.board.set(from, Cell::Empty);
            next.board.set(to, Cell::from(side));

            // Relocating a mark cannot complete a line for the opponent.
            if has_won(&next, side) {
                next.phase = Phase::GameOver;
            } else {
                next.turn = side.opponent();
            }
        }
        Phase::GameOver => return Err(MoveError::GameIsOver),
    }

    Ok(next)
}

/// Setup-phase bookkeeping after `mover` placed a mark.
///
/// Blind placement can complete a line for either side. The non-mover's
/// line takes precedence and receives the turn so it reads as the winner.
fn settle_after_placement(game: &mut Game, mover: Side) {
    let opponent = mover.opponent();
    if has_won(game, opponent) {
        game.phase = Phase::GameOver;
        game.turn = opponent;
        return;
    }
    if has_won(game, mover) {
        game.phase = Phase::GameOver;
        return;
    }

    game.turn = opponent;
    if game.board.empty_count() == EMPTY_CELLS_IN_PLAY {
        game.phase = Phase::Playing;
    }
}
