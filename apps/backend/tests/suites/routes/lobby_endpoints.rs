// Lobby endpoints driven through the full actix stack

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;

use crate::support::app_builder::{build_test_app, get_as, post_as};
use crate::support::{build_test_state, GUEST, HOST};

#[actix_web::test]
async fn create_returns_the_lobby_id_as_text() {
    let state = build_test_state().await;
    let app = build_test_app(state).await;

    let res = test::call_service(&app, post_as(HOST, "/api/create-lobby")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let body = test::read_body(res).await;
    let lobby_id = String::from_utf8(body.to_vec()).unwrap();
    assert!(achi_backend::utils::join_code::is_lobby_id(&lobby_id));
}

#[actix_web::test]
async fn full_game_over_http() {
    let state = build_test_state().await;
    let app = build_test_app(state).await;

    let res = test::call_service(&app, post_as(HOST, "/api/create-lobby")).await;
    let lobby_id = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();

    let res = test::call_service(
        &app,
        post_as(GUEST, &format!("/api/join-lobby?lobbyId={lobby_id}")),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let lobby: Value = test::read_body_json(res).await;
    assert_eq!(lobby["lobby_id"], lobby_id.as_str());
    assert_eq!(lobby["player1"], HOST);
    assert_eq!(lobby["player2"], GUEST);
    assert_eq!(lobby["game"]["State"], "SETUP");

    let placements = [(HOST, 0), (GUEST, 1), (HOST, 2), (GUEST, 4), (HOST, 3), (GUEST, 5)];
    let mut last = Value::Null;
    for (caller, to) in placements {
        let res = test::call_service(&app, post_as(caller, &format!("/api/make-move?to={to}"))).await;
        assert_eq!(res.status(), StatusCode::OK);
        last = test::read_body_json(res).await;
    }
    assert_eq!(last["State"], "PLAYING");

    let res = test::call_service(&app, post_as(HOST, "/api/make-move?from=0&to=7")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = test::call_service(&app, post_as(GUEST, "/api/make-move?from=4&to=0")).await;
    let game: Value = test::read_body_json(res).await;
    assert_eq!(game["State"], "GAME_OVER");
    assert_eq!(game["Turn"], "PLAYER_2");

    let res = test::call_service(&app, get_as(HOST, "/api/current-lobby")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let lobby: Value = test::read_body_json(res).await;
    assert_eq!(lobby["game"], game);
}

#[actix_web::test]
async fn leave_and_empty_current_lobby_are_no_content() {
    let state = build_test_state().await;
    let app = build_test_app(state).await;

    let res = test::call_service(&app, get_as(HOST, "/api/current-lobby")).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    test::call_service(&app, post_as(HOST, "/api/create-lobby")).await;
    let res = test::call_service(&app, post_as(HOST, "/api/leave-lobby")).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(test::read_body(res).await.is_empty());

    let res = test::call_service(&app, get_as(HOST, "/api/current-lobby")).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn responses_carry_a_request_id() {
    let state = build_test_state().await;
    let app = build_test_app(state).await;

    let res = test::call_service(&app, get_as(HOST, "/api/current-lobby")).await;
    assert!(res.headers().contains_key("x-request-id"));
}
