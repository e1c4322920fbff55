use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::Game;
use crate::error::AppError;
use crate::extractors::caller_id::{identity_cookie, CallerId};
use crate::realtime::hub::Shutdown;
use crate::realtime::protocol::LobbyEventMessage;
use crate::state::app_state::AppState;
use crate::store::Subscription;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// Upgrade to a WebSocket, issuing an identity cookie to first-time clients.
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    // Reject non-WebSocket requests before touching the store.
    ws::handshake(&req)?;

    let (player_id, issue_cookie) = match CallerId::from_cookie(&req) {
        Some(caller) => (caller.0, false),
        None => (Uuid::new_v4().to_string(), true),
    };
    app_state.lobbies().ensure_player(&player_id).await?;

    let conn_id = Uuid::new_v4();
    info!(conn_id = %conn_id, player_id = %player_id, new_identity = issue_cookie, "[WS SESSION] upgrading");

    let session = WsSession::new(conn_id, player_id.clone(), app_state);
    let mut resp = ws::start(session, &req, stream)?;
    if issue_cookie {
        resp.add_cookie(&identity_cookie(&player_id))?;
    }
    Ok(resp)
}

/// One live connection. Relays every payload published on the player's
/// channel to the socket until either side goes away.
pub struct WsSession {
    conn_id: Uuid,
    player_id: String,
    app_state: web::Data<AppState>,

    last_heartbeat: Instant,
    heartbeat_handle: Option<SpawnHandle>,
}

impl WsSession {
    fn new(conn_id: Uuid, player_id: String, app_state: web::Data<AppState>) -> Self {
        Self {
            conn_id,
            player_id,
            app_state,
            last_heartbeat: Instant::now(),
            heartbeat_handle: None,
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &LobbyEventMessage) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn close_with_error(ctx: &mut ws::WebsocketContext<Self>) {
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn start_heartbeat(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let handle = ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    player_id = %actor.player_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
        self.heartbeat_handle = Some(handle);
    }

    /// Subscribe to the player's channel, then push the current game so a
    /// reconnecting client catches up without missing anything published
    /// in between.
    fn start_relay(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let app_state = self.app_state.clone();
        let player_id = self.player_id.clone();

        let setup = async move {
            let subscription = app_state.broker.subscribe(&player_id).await?;
            let lobby = app_state.lobbies().current_lobby(&player_id).await?;
            Ok::<(Subscription, Option<Game>), AppError>((subscription, lobby.and_then(|l| l.game)))
        };

        ctx.spawn(setup.into_actor(self).map(|res, actor, ctx| match res {
            Ok((subscription, game)) => {
                ctx.add_stream(subscription);
                if let Some(game) = game {
                    Self::send_json(ctx, &LobbyEventMessage::game_update(Some(game)));
                }
                debug!(conn_id = %actor.conn_id, player_id = %actor.player_id, "[WS SESSION] relay live");
            }
            Err(err) => {
                error!(
                    error = %err,
                    conn_id = %actor.conn_id,
                    player_id = %actor.player_id,
                    "[WS SESSION] failed to start relay"
                );
                Self::close_with_error(ctx);
            }
        }));
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            player_id = %self.player_id,
            "[WS SESSION] started"
        );

        self.app_state.registry.register(
            &self.player_id,
            self.conn_id,
            ctx.address().recipient::<Shutdown>(),
        );
        self.start_heartbeat(ctx);
        self.start_relay(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.app_state
            .registry
            .unregister(&self.player_id, self.conn_id);
        info!(
            conn_id = %self.conn_id,
            player_id = %self.player_id,
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            // The socket is server-push only; anything the client sends just
            // counts as liveness.
            Ok(ws::Message::Text(_))
            | Ok(ws::Message::Binary(_))
            | Ok(ws::Message::Continuation(_))
            | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    player_id = %self.player_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                Self::close_with_error(ctx);
            }
        }
    }
}

/// Payloads from the player's channel, relayed verbatim.
impl StreamHandler<String> for WsSession {
    fn handle(&mut self, payload: String, ctx: &mut Self::Context) {
        ctx.text(payload);
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            player_id = %self.player_id,
            "[WS SESSION] subscription closed"
        );
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Away)));
        ctx.stop();
    }
}

impl Handler<Shutdown> for WsSession {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) -> Self::Result {
        if let Some(handle) = self.heartbeat_handle.take() {
            ctx.cancel_future(handle);
        }

        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
        ctx.stop();
    }
}
