use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Rule violations reported by the move evaluator.
///
/// Variants are listed in validation order; the first failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    GameIsOver,
    WrongSide,
    TargetOutOfBounds,
    TargetIsNotEmpty,
    SourceMissing,
    SourceOutOfBounds,
    SourceDoesNotBelongToSide,
    InvalidTarget,
}

impl Display for MoveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MoveError::GameIsOver => write!(f, "the game is already over"),
            MoveError::WrongSide => write!(f, "it is not your turn"),
            MoveError::TargetOutOfBounds => write!(f, "target position must be between 0 and 8"),
            MoveError::TargetIsNotEmpty => write!(f, "target position must be empty"),
            MoveError::SourceMissing => {
                write!(f, "a source position is required once pieces are moving")
            }
            MoveError::SourceOutOfBounds => write!(f, "source position must be between 0 and 8"),
            MoveError::SourceDoesNotBelongToSide => {
                write!(f, "source position must hold one of your pieces")
            }
            MoveError::InvalidTarget => write!(f, "target is not adjacent to the source"),
        }
    }
}

impl Error for MoveError {}

/// Lobby and session failures raised by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyError {
    LobbyNotFound(String),
    NotInLobby,
    WaitingForOpponent,
    ConcurrentEdit,
    AlreadyInLobby(String),
    LobbyFull(String),
}

impl Display for LobbyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            LobbyError::LobbyNotFound(id) => write!(f, "lobby {id} does not exist"),
            LobbyError::NotInLobby => write!(f, "current player is not in a lobby"),
            LobbyError::WaitingForOpponent => write!(f, "waiting for an opponent to join"),
            LobbyError::ConcurrentEdit => {
                write!(f, "lobby membership changed while the request was in flight")
            }
            LobbyError::AlreadyInLobby(id) => write!(f, "player is already in lobby {id}"),
            LobbyError::LobbyFull(id) => write!(f, "lobby {id} already has two players"),
        }
    }
}

impl Error for LobbyError {}
