use actix_web::{web, App, HttpServer};
use achi_backend::config::ServerConfig;
use achi_backend::infra::state::build_state;
use achi_backend::middleware::cors::cors_middleware;
use achi_backend::middleware::request_trace::RequestTrace;
use achi_backend::middleware::structured_logger::StructuredLogger;
use achi_backend::middleware::trace_span::TraceSpan;
use achi_backend::routes;
use achi_backend::telemetry;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let app_state = match build_state().with_store(config.store.clone()).build().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    info!(host = %config.host, port = config.port, "starting Achi backend");

    let data = web::Data::new(app_state);
    let origins = config.cors_allowed_origins.clone();
    let server_data = data.clone();

    let result = HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&origins))
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(server_data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    // Stop in-flight transactions and close every live socket.
    data.shutdown.cancel();
    data.registry.shutdown_all();
    info!("Achi backend stopped");

    result
}
