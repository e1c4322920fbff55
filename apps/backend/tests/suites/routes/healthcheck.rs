use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;

use crate::support::app_builder::build_test_app;
use crate::support::build_test_state;

#[actix_web::test]
async fn health_reports_store_status() {
    let state = build_test_state().await;
    let app = build_test_app(state).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "ok");
    assert!(body.get("store_error").is_none());
    assert_eq!(body["app_version"], env!("CARGO_PKG_VERSION"));
    assert!(body["time"].as_str().is_some());
}

#[actix_web::test]
async fn health_needs_no_identity() {
    let state = build_test_state().await;
    let app = build_test_app(state).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}
