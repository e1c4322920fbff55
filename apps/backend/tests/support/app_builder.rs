use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use achi_backend::extractors::caller_id::IDENTITY_COOKIE;
use achi_backend::middleware::request_trace::RequestTrace;
use achi_backend::middleware::structured_logger::StructuredLogger;
use achi_backend::middleware::trace_span::TraceSpan;
use achi_backend::routes;
use achi_backend::state::app_state::AppState;

/// Production routes and logging middleware over `state`. CORS is left out
/// so handlers keep their plain body type.
pub async fn build_test_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
    test::init_service(
        App::new()
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await
}

/// POST `uri` as `player`.
pub fn post_as(player: &str, uri: &str) -> Request {
    test::TestRequest::post()
        .uri(uri)
        .cookie(Cookie::new(IDENTITY_COOKIE, player.to_string()))
        .to_request()
}

/// GET `uri` as `player`.
pub fn get_as(player: &str, uri: &str) -> Request {
    test::TestRequest::get()
        .uri(uri)
        .cookie(Cookie::new(IDENTITY_COOKIE, player.to_string()))
        .to_request()
}
