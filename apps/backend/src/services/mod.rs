//! Application services.

pub mod lobbies;

pub use lobbies::LobbyService;
