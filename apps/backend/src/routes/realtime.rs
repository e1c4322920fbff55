use actix_web::web;

use crate::realtime::session::upgrade;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws", web::get().to(upgrade));
}
