//! Conversions from domain errors into `AppError`.
//!
//! The domain enums stay HTTP-agnostic; handlers return
//! `Result<T, crate::error::AppError>` and rely on these `From` impls.

use crate::domain::errors::{LobbyError, MoveError};
use crate::error::AppError;
use crate::errors::ErrorCode;

impl MoveError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MoveError::GameIsOver => ErrorCode::GameIsOver,
            MoveError::WrongSide => ErrorCode::WrongSide,
            MoveError::TargetOutOfBounds => ErrorCode::TargetOutOfBounds,
            MoveError::TargetIsNotEmpty => ErrorCode::TargetIsNotEmpty,
            MoveError::SourceMissing => ErrorCode::SourceMissing,
            MoveError::SourceOutOfBounds => ErrorCode::SourceOutOfBounds,
            MoveError::SourceDoesNotBelongToSide => ErrorCode::SourceDoesNotBelongToSide,
            MoveError::InvalidTarget => ErrorCode::InvalidTarget,
        }
    }
}

impl From<MoveError> for AppError {
    fn from(e: MoveError) -> Self {
        AppError::InvalidMove {
            code: e.code(),
            detail: e.to_string(),
        }
    }
}

impl From<LobbyError> for AppError {
    fn from(e: LobbyError) -> Self {
        let detail = e.to_string();
        match e {
            LobbyError::LobbyNotFound(_) => AppError::NotFound {
                code: ErrorCode::LobbyNotFound,
                detail,
            },
            LobbyError::NotInLobby => AppError::BadRequest {
                code: ErrorCode::NotInLobby,
                detail,
            },
            LobbyError::WaitingForOpponent => AppError::Conflict {
                code: ErrorCode::WaitingForOpponent,
                detail,
            },
            LobbyError::ConcurrentEdit => AppError::Conflict {
                code: ErrorCode::ConcurrentEdit,
                detail,
            },
            LobbyError::AlreadyInLobby(_) => AppError::Conflict {
                code: ErrorCode::AlreadyInLobby,
                detail,
            },
            LobbyError::LobbyFull(_) => AppError::Conflict {
                code: ErrorCode::LobbyFull,
                detail,
            },
        }
    }
}
