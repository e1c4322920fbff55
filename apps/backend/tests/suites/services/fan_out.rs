// Events published to each player's channel after state changes

use std::time::Duration;

use achi_backend::domain::Move;

use crate::common::{assert_quiet, next_event};
use crate::support::{build_test_state, seated_lobby, GUEST, HOST};

const WAIT: Duration = Duration::from_secs(1);

#[tokio::test]
async fn join_and_moves_reach_both_players() {
    let state = build_test_state().await;
    let mut host_events = state.broker.subscribe(HOST).await.unwrap();
    let mut guest_events = state.broker.subscribe(GUEST).await.unwrap();
    let lobbies = state.lobbies();

    seated_lobby(&lobbies).await;
    for events in [&mut host_events, &mut guest_events] {
        let event = next_event(events, WAIT).await.expect("join event");
        assert_eq!(event["Event"], "GAME_UPDATE");
        assert_eq!(event["Game"]["State"], "SETUP");
        assert_eq!(event["Game"]["Turn"], "PLAYER_1");
    }

    lobbies.make_move(HOST, Move::place(0)).await.unwrap();
    for events in [&mut host_events, &mut guest_events] {
        let event = next_event(events, WAIT).await.expect("move event");
        assert_eq!(event["Event"], "GAME_UPDATE");
        assert_eq!(event["Game"]["Board"][0], "PLAYER_1");
        assert_eq!(event["Game"]["Turn"], "PLAYER_2");
    }
}

#[tokio::test]
async fn rejected_moves_publish_nothing() {
    let state = build_test_state().await;
    let lobbies = state.lobbies();
    seated_lobby(&lobbies).await;
    let mut host_events = state.broker.subscribe(HOST).await.unwrap();

    lobbies.make_move(GUEST, Move::place(0)).await.unwrap_err();
    assert_quiet(&mut host_events).await;
}

#[tokio::test]
async fn leaving_notifies_only_the_remaining_player() {
    let state = build_test_state().await;
    let lobbies = state.lobbies();
    seated_lobby(&lobbies).await;
    let game = lobbies.make_move(HOST, Move::place(0)).await.unwrap();

    let mut host_events = state.broker.subscribe(HOST).await.unwrap();
    let mut guest_events = state.broker.subscribe(GUEST).await.unwrap();

    lobbies.leave(GUEST).await.unwrap();

    let event = next_event(&mut host_events, WAIT).await.expect("opponent left");
    assert_eq!(event["Event"], "OPPONENT_LEFT");
    assert_eq!(event["Game"], serde_json::to_value(game).unwrap());
    assert_quiet(&mut guest_events).await;
}

#[tokio::test]
async fn disbanding_publishes_nothing() {
    let state = build_test_state().await;
    let lobbies = state.lobbies();
    lobbies.create(HOST).await.unwrap();
    let mut host_events = state.broker.subscribe(HOST).await.unwrap();

    lobbies.leave(HOST).await.unwrap();
    assert_quiet(&mut host_events).await;
}
