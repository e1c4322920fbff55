//! Error codes for the Achi backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the Achi backend API.
///
/// Callers branch on these, never on the human-readable detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Move validation
    /// The game already has a winner
    GameIsOver,
    /// Caller's side is not on turn
    WrongSide,
    /// Target index outside 0..=8
    TargetOutOfBounds,
    /// Target cell is occupied
    TargetIsNotEmpty,
    /// Relocation without a source index
    SourceMissing,
    /// Source index outside 0..=8
    SourceOutOfBounds,
    /// Source cell does not hold the caller's mark
    SourceDoesNotBelongToSide,
    /// Source and target are not adjacent
    InvalidTarget,

    // Lobby membership
    /// Lobby id does not resolve to a lobby
    LobbyNotFound,
    /// Caller is not in any lobby
    NotInLobby,
    /// Lobby has no second player yet
    WaitingForOpponent,
    /// Caller's lobby reference changed mid-request
    ConcurrentEdit,
    /// Caller already belongs to a lobby
    AlreadyInLobby,
    /// Lobby already seats two players
    LobbyFull,

    // Coordination
    /// Optimistic transaction retries exhausted
    TxnConflict,
    /// Operation cancelled during shutdown
    Cancelled,
    /// Coordination store unreachable
    StoreUnavailable,

    // Request surface
    /// No identity cookie on the request
    MissingIdentity,
    /// Malformed request parameters
    BadRequest,

    /// Configuration error
    ConfigError,
    /// Internal server error
    Internal,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Move validation
            Self::GameIsOver => "GAME_IS_OVER",
            Self::WrongSide => "WRONG_SIDE",
            Self::TargetOutOfBounds => "TARGET_OUT_OF_BOUNDS",
            Self::TargetIsNotEmpty => "TARGET_IS_NOT_EMPTY",
            Self::SourceMissing => "SOURCE_MISSING",
            Self::SourceOutOfBounds => "SOURCE_OUT_OF_BOUNDS",
            Self::SourceDoesNotBelongToSide => "SOURCE_DOES_NOT_BELONG_TO_SIDE",
            Self::InvalidTarget => "INVALID_TARGET",

            // Lobby membership
            Self::LobbyNotFound => "LOBBY_NOT_FOUND",
            Self::NotInLobby => "NOT_IN_LOBBY",
            Self::WaitingForOpponent => "WAITING_FOR_OPPONENT",
            Self::ConcurrentEdit => "CONCURRENT_EDIT",
            Self::AlreadyInLobby => "ALREADY_IN_LOBBY",
            Self::LobbyFull => "LOBBY_FULL",

            // Coordination
            Self::TxnConflict => "TXN_CONFLICT",
            Self::Cancelled => "CANCELLED",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",

            // Request surface
            Self::MissingIdentity => "MISSING_IDENTITY",
            Self::BadRequest => "BAD_REQUEST",

            Self::ConfigError => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
        }
    }

    /// Every code, in declaration order.
    pub const ALL: [ErrorCode; 21] = [
        Self::GameIsOver,
        Self::WrongSide,
        Self::TargetOutOfBounds,
        Self::TargetIsNotEmpty,
        Self::SourceMissing,
        Self::SourceOutOfBounds,
        Self::SourceDoesNotBelongToSide,
        Self::InvalidTarget,
        Self::LobbyNotFound,
        Self::NotInLobby,
        Self::WaitingForOpponent,
        Self::ConcurrentEdit,
        Self::AlreadyInLobby,
        Self::LobbyFull,
        Self::TxnConflict,
        Self::Cancelled,
        Self::StoreUnavailable,
        Self::MissingIdentity,
        Self::BadRequest,
        Self::ConfigError,
        Self::Internal,
    ];
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
