#![allow(dead_code)]

pub mod app_builder;
pub mod websocket_client;

use std::sync::Arc;

use achi_backend::domain::board::CELL_COUNT;
use achi_backend::domain::{Cell, Game, Move, Side};
use achi_backend::infra::state::build_state;
use achi_backend::services::LobbyService;
use achi_backend::state::app_state::AppState;
use achi_backend::store::CoordinationStore;

pub const HOST: &str = "host-player";
pub const GUEST: &str = "guest-player";

/// Fresh state over a private in-memory store.
pub async fn build_test_state() -> AppState {
    build_state()
        .build()
        .await
        .expect("in-memory state should build")
}

pub async fn build_test_state_with(store: Arc<dyn CoordinationStore>) -> AppState {
    build_state()
        .with_store_instance(store)
        .build()
        .await
        .expect("state should build")
}

/// Marks on the board, either side.
pub fn occupied(game: &Game) -> usize {
    CELL_COUNT - game.board.empty_count()
}

pub fn marks_of(game: &Game, side: Side) -> usize {
    let mark = Cell::from(side);
    game.board.cells().iter().filter(|cell| **cell == mark).count()
}

/// `HOST` creates a lobby and `GUEST` joins it. Returns the lobby id.
pub async fn seated_lobby(lobbies: &LobbyService) -> String {
    lobbies.ensure_player(HOST).await.unwrap();
    lobbies.ensure_player(GUEST).await.unwrap();
    let lobby_id = lobbies.create(HOST).await.unwrap();
    lobbies.join(GUEST, &lobby_id).await.unwrap();
    lobby_id
}

/// Play the six setup placements `HOST` 0, `GUEST` 1, `HOST` 2,
/// `GUEST` 4, `HOST` 3, `GUEST` 5, which leaves nobody with a line.
///
/// Rows are cells `8 1 2 / 7 0 3 / 6 5 4`:
///
/// ```text
/// . B A
/// . A A
/// . B B
/// ```
///
/// `HOST` (Player1) moves next.
pub async fn finish_setup(lobbies: &LobbyService) -> Game {
    let placements = [(HOST, 0), (GUEST, 1), (HOST, 2), (GUEST, 4), (HOST, 3), (GUEST, 5)];
    let mut game = None;
    for (caller, to) in placements {
        game = Some(lobbies.make_move(caller, Move::place(to)).await.unwrap());
    }
    game.expect("six placements were made")
}
