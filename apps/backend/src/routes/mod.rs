use actix_web::web;

pub mod health;
pub mod lobbies;
pub mod realtime;

/// Register every route. Shared by `main.rs` and the test harness so both
/// see the same paths.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::root));

    // Health check: /health
    cfg.configure(health::configure_routes);

    // Lobby routes: /api/**
    cfg.service(web::scope("/api").configure(lobbies::configure_routes));

    // WebSocket upgrade: /ws
    cfg.configure(realtime::configure_routes);
}
