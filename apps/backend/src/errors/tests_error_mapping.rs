// Unit tests for error mapping - pure domain logic without HTTP or store dependencies
use crate::domain::errors::{LobbyError, MoveError};
use crate::{AppError, ErrorCode};

#[test]
fn maps_every_move_error_to_400() {
    let cases = [
        (MoveError::GameIsOver, "GAME_IS_OVER"),
        (MoveError::WrongSide, "WRONG_SIDE"),
        (MoveError::TargetOutOfBounds, "TARGET_OUT_OF_BOUNDS"),
        (MoveError::TargetIsNotEmpty, "TARGET_IS_NOT_EMPTY"),
        (MoveError::SourceMissing, "SOURCE_MISSING"),
        (MoveError::SourceOutOfBounds, "SOURCE_OUT_OF_BOUNDS"),
        (
            MoveError::SourceDoesNotBelongToSide,
            "SOURCE_DOES_NOT_BELONG_TO_SIDE",
        ),
        (MoveError::InvalidTarget, "INVALID_TARGET"),
    ];
    for (err, code) in cases {
        let app: AppError = err.into();
        assert_eq!(app.code().as_str(), code);
        assert_eq!(app.status().as_u16(), 400);
    }
}

#[test]
fn maps_lobby_not_found_to_404() {
    let app: AppError = LobbyError::LobbyNotFound("ABCD1234".into()).into();
    assert_eq!(app.code(), ErrorCode::LobbyNotFound);
    assert_eq!(app.status().as_u16(), 404);
    assert!(app.to_string().contains("ABCD1234"));
}

#[test]
fn maps_membership_conflicts_to_409() {
    for (err, code) in [
        (LobbyError::WaitingForOpponent, ErrorCode::WaitingForOpponent),
        (LobbyError::ConcurrentEdit, ErrorCode::ConcurrentEdit),
        (LobbyError::AlreadyInLobby("X".into()), ErrorCode::AlreadyInLobby),
        (LobbyError::LobbyFull("X".into()), ErrorCode::LobbyFull),
    ] {
        let app: AppError = err.into();
        assert_eq!(app.code(), code);
        assert_eq!(app.status().as_u16(), 409);
    }
}

#[test]
fn maps_not_in_lobby_to_400() {
    let app: AppError = LobbyError::NotInLobby.into();
    assert_eq!(app.code(), ErrorCode::NotInLobby);
    assert_eq!(app.status().as_u16(), 400);
    assert!(matches!(app, AppError::BadRequest { .. }));
}
