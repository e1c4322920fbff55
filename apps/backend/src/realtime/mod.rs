//! Per-player event fan-out over the coordination store's pub/sub.

pub mod broker;
pub mod hub;
pub mod protocol;
pub mod session;

pub use broker::RealtimeBroker;
pub use hub::ConnectionRegistry;
pub use protocol::{LobbyEvent, LobbyEventMessage};
pub use session::WsSession;
