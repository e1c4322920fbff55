//! Lobby HTTP routes. Every endpoint acts on behalf of the caller named by
//! the `id` cookie.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::domain::Move;
use crate::error::AppError;
use crate::extractors::CallerId;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct JoinQuery {
    #[serde(rename = "lobbyId")]
    lobby_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MoveQuery {
    from: Option<String>,
    to: Option<String>,
}

impl MoveQuery {
    /// `to` is required; an empty `from` means a setup placement.
    fn into_move(self) -> Result<Move, AppError> {
        let to = match self.to.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_index("to", raw)?,
            _ => return Err(AppError::bad_request("Query parameter 'to' is required")),
        };
        let from = match self.from.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_index("from", raw)?),
            _ => None,
        };
        Ok(Move { from, to })
    }
}

fn parse_index(name: &str, raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>().map_err(|_| {
        AppError::bad_request(format!("Query parameter '{name}' must be an integer, got '{raw}'"))
    })
}

/// POST /api/create-lobby
async fn create_lobby(
    caller: CallerId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let lobby_id = app_state.lobbies().create(caller.as_str()).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(lobby_id))
}

/// POST /api/join-lobby?lobbyId=
async fn join_lobby(
    caller: CallerId,
    query: web::Query<JoinQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let lobby_id = query
        .into_inner()
        .lobby_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Query parameter 'lobbyId' is required"))?;

    let lobby = app_state.lobbies().join(caller.as_str(), &lobby_id).await?;
    Ok(HttpResponse::Ok().json(lobby))
}

/// POST /api/leave-lobby
async fn leave_lobby(
    caller: CallerId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state.lobbies().leave(caller.as_str()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/make-move?from=&to=
async fn make_move(
    caller: CallerId,
    query: web::Query<MoveQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let mv = query.into_inner().into_move()?;
    let game = app_state.lobbies().make_move(caller.as_str(), mv).await?;
    Ok(HttpResponse::Ok().json(game))
}

/// GET /api/current-lobby
///
/// 204 when the caller is not in a lobby.
async fn current_lobby(
    caller: CallerId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    match app_state.lobbies().current_lobby(caller.as_str()).await? {
        Some(lobby) => Ok(HttpResponse::Ok().json(lobby)),
        None => Ok(HttpResponse::NoContent().finish()),
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/create-lobby", web::post().to(create_lobby))
        .route("/join-lobby", web::post().to(join_lobby))
        .route("/leave-lobby", web::post().to(leave_lobby))
        .route("/make-move", web::post().to(make_move))
        .route("/current-lobby", web::get().to(current_lobby));
}
