//! Lobby orchestration: membership changes and moves as optimistic
//! transactions over the coordination store, with events published after
//! each commit.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::{evaluate_move, Departure, Game, Lobby, LobbyError, Move, Player};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::realtime::{LobbyEventMessage, RealtimeBroker};
use crate::store::txn::{run_with_retry, TxnPlan, MAX_TXN_ATTEMPTS};
use crate::store::{keys, CoordinationStore, Snapshot, WriteSet};
use crate::utils::join_code::{generate_lobby_id, is_lobby_id};

#[derive(Clone)]
pub struct LobbyService {
    store: Arc<dyn CoordinationStore>,
    broker: Arc<RealtimeBroker>,
    shutdown: CancellationToken,
    max_attempts: u32,
}

/// The caller's lobby as seen inside a transaction.
enum Resolved {
    Found(Player, Lobby),
    /// The referenced lobby is gone; these writes clear the reference.
    Dangling(WriteSet),
}

/// A caller with no record yet is a fresh player outside any lobby.
fn load_player(snapshot: &Snapshot, player_id: &str) -> Result<Player, AppError> {
    Ok(snapshot
        .get::<Player>(&keys::player(player_id))?
        .unwrap_or_else(|| Player::new(player_id)))
}

fn watch_keys(player_id: &str, lobbies: &[Option<&str>]) -> Vec<String> {
    let mut watched = vec![keys::player(player_id)];
    for lobby_id in lobbies.iter().flatten() {
        let key = keys::lobby(lobby_id);
        if !watched.contains(&key) {
            watched.push(key);
        }
    }
    watched
}

/// Reject callers still seated in a live lobby. A reference to a lobby that
/// no longer exists does not count and is overwritten by the caller's write.
///
/// Only lobbies in the snapshot are visible, so a reference that moved away
/// from `outer_ref` to an unwatched lobby is a `ConcurrentEdit`.
fn ensure_free(snapshot: &Snapshot, player: &Player, outer_ref: Option<&str>) -> Result<(), AppError> {
    if let Some(lobby_id) = &player.current_lobby {
        if snapshot.raw(&keys::lobby(lobby_id)).is_some() {
            return Err(LobbyError::AlreadyInLobby(lobby_id.clone()).into());
        }
    }
    if player.current_lobby.as_deref() != outer_ref {
        return Err(LobbyError::ConcurrentEdit.into());
    }
    Ok(())
}

fn resolve_lobby(snapshot: &Snapshot, caller: &str, lobby_id: &str) -> Result<Resolved, AppError> {
    let mut player = load_player(snapshot, caller)?;
    if player.current_lobby.as_deref() != Some(lobby_id) {
        return Err(LobbyError::ConcurrentEdit.into());
    }

    match snapshot.get::<Lobby>(&keys::lobby(lobby_id))? {
        Some(lobby) => Ok(Resolved::Found(player, lobby)),
        None => {
            debug!(player_id = caller, lobby_id, "clearing dangling lobby reference");
            player.current_lobby = None;
            let mut writes = WriteSet::new();
            writes.put_json(keys::player(caller), &player)?;
            Ok(Resolved::Dangling(writes))
        }
    }
}

impl LobbyService {
    pub fn new(
        store: Arc<dyn CoordinationStore>,
        broker: Arc<RealtimeBroker>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            broker,
            shutdown,
            max_attempts: MAX_TXN_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    async fn transact<T, F>(&self, keys: &[String], body: F) -> Result<T, AppError>
    where
        F: FnMut(&Snapshot) -> Result<TxnPlan<T>, AppError>,
    {
        run_with_retry(self.store.as_ref(), keys, self.max_attempts, &self.shutdown, body).await
    }

    /// The lobby the caller's record points at, read outside any transaction.
    async fn lobby_reference(&self, caller: &str) -> Result<Option<String>, AppError> {
        self.transact(&[keys::player(caller)], |snapshot| {
            Ok(TxnPlan::read_only(load_player(snapshot, caller)?.current_lobby))
        })
        .await
    }

    /// Create the player record on first connection; reuse it on reconnect.
    pub async fn ensure_player(&self, player_id: &str) -> Result<Player, AppError> {
        let key = keys::player(player_id);
        self.transact(std::slice::from_ref(&key), |snapshot| {
            match snapshot.get::<Player>(&key)? {
                Some(player) => Ok(TxnPlan::read_only(player)),
                None => {
                    let player = Player::new(player_id);
                    let mut writes = WriteSet::new();
                    writes.put_json(key.as_str(), &player)?;
                    Ok(TxnPlan::commit(writes, player))
                }
            }
        })
        .await
    }

    /// Open a new lobby hosted by `caller` and return its id.
    pub async fn create(&self, caller: &str) -> Result<String, AppError> {
        let mut round = 1;
        loop {
            match self.try_create(caller).await {
                Err(err) if err.code() == ErrorCode::ConcurrentEdit && round < self.max_attempts => {
                    debug!(player_id = caller, round, "lobby reference moved during create");
                    round += 1;
                }
                result => return result,
            }
        }
    }

    async fn try_create(&self, caller: &str) -> Result<String, AppError> {
        let outer_ref = self.lobby_reference(caller).await?;
        let lobby_id = generate_lobby_id();
        let watched = watch_keys(caller, &[Some(&lobby_id), outer_ref.as_deref()]);

        self.transact(&watched, |snapshot| {
            let mut player = load_player(snapshot, caller)?;
            ensure_free(snapshot, &player, outer_ref.as_deref())?;
            if snapshot.raw(&keys::lobby(&lobby_id)).is_some() {
                return Err(AppError::internal(format!(
                    "generated lobby id {lobby_id} is already taken"
                )));
            }

            let lobby = Lobby::open(lobby_id.as_str(), caller);
            player.current_lobby = Some(lobby_id.clone());

            let mut writes = WriteSet::new();
            writes.put_json(keys::lobby(&lobby_id), &lobby)?;
            writes.put_json(keys::player(caller), &player)?;
            Ok(TxnPlan::commit(writes, ()))
        })
        .await?;

        info!(lobby_id = %lobby_id, player_id = caller, "lobby created");
        Ok(lobby_id)
    }

    /// Take the second seat in `lobby_id` and start a fresh game.
    pub async fn join(&self, caller: &str, lobby_id: &str) -> Result<Lobby, AppError> {
        let lobby_id = lobby_id.trim().to_ascii_uppercase();
        if !is_lobby_id(&lobby_id) {
            return Err(LobbyError::LobbyNotFound(lobby_id).into());
        }

        let mut round = 1;
        loop {
            match self.try_join(caller, &lobby_id).await {
                Err(err) if err.code() == ErrorCode::ConcurrentEdit && round < self.max_attempts => {
                    debug!(player_id = caller, lobby_id = %lobby_id, round, "lobby reference moved during join");
                    round += 1;
                }
                result => return result,
            }
        }
    }

    async fn try_join(&self, caller: &str, lobby_id: &str) -> Result<Lobby, AppError> {
        let lobby_id = lobby_id.to_string();
        let outer_ref = self.lobby_reference(caller).await?;
        let watched = watch_keys(caller, &[Some(&lobby_id), outer_ref.as_deref()]);

        let lobby = self
            .transact(&watched, |snapshot| {
                let mut player = load_player(snapshot, caller)?;
                ensure_free(snapshot, &player, outer_ref.as_deref())?;

                let mut lobby = snapshot
                    .get::<Lobby>(&keys::lobby(&lobby_id))?
                    .ok_or_else(|| LobbyError::LobbyNotFound(lobby_id.clone()))?;
                lobby.seat_opponent(caller)?;
                player.current_lobby = Some(lobby_id.clone());

                let mut writes = WriteSet::new();
                writes.put_json(keys::lobby(&lobby_id), &lobby)?;
                writes.put_json(keys::player(caller), &player)?;
                Ok(TxnPlan::commit(writes, lobby))
            })
            .await?;

        info!(lobby_id = %lobby_id, player_id = caller, host = %lobby.player1, "player joined lobby");
        self.broker
            .notify(lobby.players(), &LobbyEventMessage::game_update(lobby.game))
            .await;
        Ok(lobby)
    }

    /// Leave the caller's lobby, disbanding it or handing it to the opponent.
    pub async fn leave(&self, caller: &str) -> Result<(), AppError> {
        let lobby_id = self
            .lobby_reference(caller)
            .await?
            .ok_or(LobbyError::NotInLobby)?;
        let watched = watch_keys(caller, &[Some(&lobby_id)]);

        let departure = self
            .transact(&watched, |snapshot| {
                let (mut player, lobby) = match resolve_lobby(snapshot, caller, &lobby_id)? {
                    Resolved::Found(player, lobby) => (player, lobby),
                    Resolved::Dangling(writes) => {
                        return Ok(TxnPlan::heal(
                            writes,
                            LobbyError::LobbyNotFound(lobby_id.clone()),
                        ))
                    }
                };

                player.current_lobby = None;
                let mut writes = WriteSet::new();
                writes.put_json(keys::player(caller), &player)?;

                let departure = lobby.remove_player(caller);
                match &departure {
                    Departure::Disbanded => writes.delete(keys::lobby(&lobby_id)),
                    Departure::Promoted { lobby, .. } | Departure::OpponentRemoved { lobby, .. } => {
                        writes.put_json(keys::lobby(&lobby_id), lobby)?
                    }
                    Departure::NotSeated(_) => {}
                }
                Ok(TxnPlan::commit(writes, departure))
            })
            .await?;

        match &departure {
            Departure::Promoted { lobby, remaining } | Departure::OpponentRemoved { lobby, remaining } => {
                info!(lobby_id = %lobby_id, player_id = caller, remaining = %remaining, "player left lobby");
                self.broker
                    .notify([remaining.as_str()], &LobbyEventMessage::opponent_left(lobby.game))
                    .await;
            }
            Departure::Disbanded => {
                info!(lobby_id = %lobby_id, player_id = caller, "lobby disbanded");
            }
            Departure::NotSeated(_) => {
                debug!(lobby_id = %lobby_id, player_id = caller, "cleared reference to lobby without a seat");
            }
        }
        Ok(())
    }

    /// Apply `mv` for the caller's side and publish the new position to both players.
    pub async fn make_move(&self, caller: &str, mv: Move) -> Result<Game, AppError> {
        let lobby_id = self
            .lobby_reference(caller)
            .await?
            .ok_or(LobbyError::NotInLobby)?;
        let watched = watch_keys(caller, &[Some(&lobby_id)]);

        let (game, lobby) = self
            .transact(&watched, |snapshot| {
                let (mut player, mut lobby) = match resolve_lobby(snapshot, caller, &lobby_id)? {
                    Resolved::Found(player, lobby) => (player, lobby),
                    Resolved::Dangling(writes) => {
                        return Ok(TxnPlan::heal(
                            writes,
                            LobbyError::LobbyNotFound(lobby_id.clone()),
                        ))
                    }
                };

                let Some(side) = lobby.side_of(caller) else {
                    player.current_lobby = None;
                    let mut writes = WriteSet::new();
                    writes.put_json(keys::player(caller), &player)?;
                    return Ok(TxnPlan::heal(writes, LobbyError::NotInLobby));
                };
                if lobby.player2.is_none() {
                    return Err(LobbyError::WaitingForOpponent.into());
                }

                let current = lobby.game.ok_or_else(|| {
                    AppError::internal(format!("lobby {lobby_id} has two players but no game"))
                })?;
                let next = evaluate_move(&current, side, mv)?;
                lobby.game = Some(next);

                let mut writes = WriteSet::new();
                writes.put_json(keys::lobby(&lobby_id), &lobby)?;
                Ok(TxnPlan::commit(writes, (next, lobby)))
            })
            .await?;

        debug!(lobby_id = %lobby_id, player_id = caller, phase = ?game.phase, "move applied");
        self.broker
            .notify(lobby.players(), &LobbyEventMessage::game_update(Some(game)))
            .await;
        Ok(game)
    }

    /// The caller's lobby for a reconnecting client. A dangling reference
    /// is cleared and reported as no lobby.
    pub async fn current_lobby(&self, caller: &str) -> Result<Option<Lobby>, AppError> {
        let Some(lobby_id) = self.lobby_reference(caller).await? else {
            return Ok(None);
        };
        let watched = watch_keys(caller, &[Some(&lobby_id)]);

        self.transact(&watched, |snapshot| match resolve_lobby(snapshot, caller, &lobby_id)? {
            Resolved::Found(_, lobby) => Ok(TxnPlan::read_only(Some(lobby))),
            Resolved::Dangling(writes) => Ok(TxnPlan::commit(writes, None)),
        })
        .await
    }
}
