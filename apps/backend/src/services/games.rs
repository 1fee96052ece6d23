//! Session lifecycle: create, join, remove, status changes, role distribution
//! and the reads that go with them.
//!
//! Every mutating operation holds the game's entry in `GameLocks` for the
//! whole transaction and enqueues its broadcast before releasing it, so
//! subscribers see events in commit order.

use std::collections::BTreeSet;
use std::sync::Arc;

use actix::Addr;
use parking_lot::Mutex;
use rand_chacha::ChaCha20Rng;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapters::games_sea::GameCreate;
use crate::config::ServiceConfig;
use crate::db::txn::{with_txn, TxnMode};
use crate::domain::{Assignment, Principal, RoleDistributor, RoleSelection};
use crate::entities::games::GameStatus;
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, StateKind, ValidationKind,
};
use crate::repos::game_roles::GameRoleCreate;
use crate::repos::games::Game;
use crate::repos::players::Player;
use crate::repos::roles::Role;
use crate::repos::{game_roles, games, players, roles};
use crate::services::locks::GameLocks;
use crate::utils::game_code::{generate_game_code, normalize_game_code};
use crate::ws::hub::{Broadcast, BroadcastHub, Connection, Register, Unregister};
use crate::ws::protocol::{EventType, PlayerLeftPayload};

const MAX_PLAYER_NAME_CHARS: usize = 32;

/// A player together with the role they were dealt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerAssignment {
    pub player: Player,
    pub role: Role,
}

pub struct GameService {
    db: DatabaseConnection,
    hub: Addr<BroadcastHub>,
    locks: GameLocks,
    distributor: Arc<Mutex<RoleDistributor<ChaCha20Rng>>>,
    config: ServiceConfig,
}

impl GameService {
    pub fn new(
        db: DatabaseConnection,
        hub: Addr<BroadcastHub>,
        distributor: RoleDistributor<ChaCha20Rng>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            db,
            hub,
            locks: GameLocks::new(),
            distributor: Arc::new(Mutex::new(distributor)),
            config,
        }
    }

    pub fn hub(&self) -> &Addr<BroadcastHub> {
        &self.hub
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Games with a lock currently held or awaited.
    pub fn locked_games(&self) -> usize {
        self.locks.len()
    }

    /// Open a new pending game owned by `moderator`.
    ///
    /// Each code attempt runs in its own transaction; a primary key collision
    /// triggers another attempt until `max_code_attempts` is spent.
    pub async fn create_session(&self, moderator: &Principal) -> Result<Game, DomainError> {
        for attempt in 1..=self.config.max_code_attempts {
            let code = generate_game_code(&mut rand::rng());
            let dto = GameCreate::new(code.clone(), moderator.as_str());

            let result = with_txn(
                &self.db,
                TxnMode::Default,
                self.config.store_timeout,
                move |txn| Box::pin(async move { games::create_game(txn, dto).await }),
            )
            .await;

            match result {
                Ok(game) => {
                    info!(game_id = %game.id, moderator_id = %moderator, "[GAME] session created");
                    return Ok(game);
                }
                Err(DomainError::Conflict(ConflictKind::GameCodeCollision, _)) => {
                    debug!(attempt, code = %code, "[GAME] game code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            attempts = self.config.max_code_attempts,
            "[GAME] could not find a free game code"
        );
        Err(DomainError::conflict(
            ConflictKind::GameCodeExhausted,
            "Could not allocate a unique game code",
        ))
    }

    pub async fn get_game(&self, game_id: &str) -> Result<Game, DomainError> {
        let code = normalize_game_code(game_id)?;
        with_txn(
            &self.db,
            TxnMode::Default,
            self.config.store_timeout,
            move |txn| Box::pin(async move { games::require_game(txn, &code).await }),
        )
        .await
    }

    /// Players of an existing game in join order.
    pub async fn list_players(&self, game_id: &str) -> Result<Vec<Player>, DomainError> {
        let code = normalize_game_code(game_id)?;
        with_txn(
            &self.db,
            TxnMode::Default,
            self.config.store_timeout,
            move |txn| {
                Box::pin(async move {
                    games::require_game(txn, &code).await?;
                    players::list_by_game(txn, &code).await
                })
            },
        )
        .await
    }

    /// Add a player to a pending game. Name uniqueness is left to the
    /// `(game_id, name)` unique index.
    pub async fn join(&self, game_id: &str, name: &str) -> Result<Player, DomainError> {
        let code = normalize_game_code(game_id)?;
        let name = validate_player_name(name)?;

        let _guard = self.locks.lock(&code).await;
        let game_code = code.clone();
        let player = with_txn(
            &self.db,
            TxnMode::Default,
            self.config.store_timeout,
            move |txn| {
                Box::pin(async move {
                    let game = games::require_game(txn, &game_code).await?;
                    if !game.is_pending() {
                        return Err(not_pending(&game));
                    }
                    players::create_player(txn, &game_code, &name).await
                })
            },
        )
        .await?;

        info!(game_id = %code, player_id = player.id, "[GAME] player joined");
        self.broadcast(&code, EventType::PlayerJoined, to_payload(&player));
        Ok(player)
    }

    /// Remove a player from a pending game. Only the moderator may do this.
    pub async fn remove_player(
        &self,
        game_id: &str,
        player_id: i64,
        moderator: &Principal,
    ) -> Result<(), DomainError> {
        let code = normalize_game_code(game_id)?;

        let _guard = self.locks.lock(&code).await;
        let game_code = code.clone();
        let moderator_id = moderator.clone();
        with_txn(
            &self.db,
            TxnMode::Default,
            self.config.store_timeout,
            move |txn| {
                Box::pin(async move {
                    let game = games::require_game(txn, &game_code).await?;
                    ensure_owner(&game, &moderator_id)?;
                    if !game.is_pending() {
                        return Err(not_pending(&game));
                    }
                    players::require_in_game(txn, &game_code, player_id).await?;
                    players::delete_player(txn, player_id).await?;
                    Ok::<_, DomainError>(())
                })
            },
        )
        .await?;

        info!(game_id = %code, player_id, "[GAME] player removed");
        self.broadcast(
            &code,
            EventType::PlayerLeft,
            to_payload(&PlayerLeftPayload { player_id }),
        );
        Ok(())
    }

    /// Change the status of a game. See `check_transition` for what is allowed.
    /// Setting the current status again returns the game unchanged and
    /// broadcasts nothing.
    pub async fn update_status(
        &self,
        game_id: &str,
        new_status: GameStatus,
        moderator: &Principal,
    ) -> Result<Game, DomainError> {
        let code = normalize_game_code(game_id)?;

        let _guard = self.locks.lock(&code).await;
        let game_code = code.clone();
        let moderator_id = moderator.clone();
        let (game, changed) = with_txn(
            &self.db,
            TxnMode::Default,
            self.config.store_timeout,
            move |txn| {
                Box::pin(async move {
                    let game = games::require_game(txn, &game_code).await?;
                    ensure_owner(&game, &moderator_id)?;
                    if game.status == new_status {
                        return Ok((game, false));
                    }
                    check_transition(game.status, new_status)?;
                    let updated = games::update_status(txn, &game_code, new_status).await?;
                    Ok::<_, DomainError>((updated, true))
                })
            },
        )
        .await?;

        if changed {
            info!(game_id = %code, status = ?game.status, "[GAME] status updated");
            if game.status == GameStatus::Deleted {
                self.broadcast(&code, EventType::GameDeleted, serde_json::Value::Null);
            }
        }
        Ok(game)
    }

    /// Remove the game with its players and assignments.
    pub async fn delete(&self, game_id: &str, moderator: &Principal) -> Result<(), DomainError> {
        let code = normalize_game_code(game_id)?;

        let _guard = self.locks.lock(&code).await;
        let game_code = code.clone();
        let moderator_id = moderator.clone();
        with_txn(
            &self.db,
            TxnMode::Default,
            self.config.store_timeout,
            move |txn| {
                Box::pin(async move {
                    let game = games::require_game(txn, &game_code).await?;
                    ensure_owner(&game, &moderator_id)?;
                    let roles_removed = game_roles::delete_by_game(txn, &game_code).await?;
                    let players_removed = players::delete_by_game(txn, &game_code).await?;
                    games::delete_game(txn, &game_code).await?;
                    debug!(game_id = %game_code, roles_removed, players_removed, "[GAME] rows removed");
                    Ok::<_, DomainError>(())
                })
            },
        )
        .await?;

        info!(game_id = %code, "[GAME] deleted");
        self.broadcast(&code, EventType::GameDeleted, serde_json::Value::Null);
        Ok(())
    }

    /// Deal roles to every player of a pending game and activate it.
    ///
    /// The existing-assignment check, the player snapshot, the inserts and
    /// the status flip share one serializable transaction with the game row
    /// locked. A game that already has assignments fails with
    /// `Conflict(RolesAlreadyAssigned)` and is left untouched.
    pub async fn distribute_roles(
        &self,
        game_id: &str,
        moderator: &Principal,
        selections: Vec<RoleSelection>,
    ) -> Result<Vec<Assignment>, DomainError> {
        let code = normalize_game_code(game_id)?;

        let _guard = self.locks.lock(&code).await;
        let game_code = code.clone();
        let moderator_id = moderator.clone();
        let distributor = Arc::clone(&self.distributor);
        let assignments = with_txn(
            &self.db,
            TxnMode::Serializable,
            self.config.store_timeout,
            move |txn| {
                Box::pin(async move {
                    let game = games::lock_for_update(txn, &game_code).await?;
                    ensure_owner(&game, &moderator_id)?;

                    let existing = game_roles::count_by_game(txn, &game_code).await?;
                    if existing > 0 {
                        return Err(DomainError::conflict(
                            ConflictKind::RolesAlreadyAssigned,
                            format!("Roles were already distributed for game {game_code}"),
                        ));
                    }
                    if !game.is_pending() {
                        return Err(not_pending(&game));
                    }

                    let player_ids: Vec<i64> = players::list_by_game(txn, &game_code)
                        .await?
                        .iter()
                        .map(|p| p.id)
                        .collect();

                    let assignments = distributor.lock().assign(&selections, &player_ids)?;

                    let role_ids: Vec<i64> = selections
                        .iter()
                        .map(|s| s.role_id)
                        .collect::<BTreeSet<_>>()
                        .into_iter()
                        .collect();
                    roles::require_all(txn, &role_ids).await?;

                    let rows: Vec<GameRoleCreate> = assignments
                        .iter()
                        .map(|a| GameRoleCreate {
                            player_id: a.player_id,
                            role_id: a.role_id,
                        })
                        .collect();
                    game_roles::create_all(txn, &game_code, &rows).await?;
                    games::update_status(txn, &game_code, GameStatus::Active).await?;

                    Ok::<_, DomainError>(assignments)
                })
            },
        )
        .await?;

        info!(
            game_id = %code,
            players = assignments.len(),
            "[GAME] roles distributed"
        );
        self.broadcast(&code, EventType::RolesDistributed, serde_json::Value::Null);
        Ok(assignments)
    }

    /// Role dealt to `player_id`. Public: a player looks up their own role.
    pub async fn get_assigned_role(&self, game_id: &str, player_id: i64) -> Result<Role, DomainError> {
        let code = normalize_game_code(game_id)?;
        with_txn(
            &self.db,
            TxnMode::Default,
            self.config.store_timeout,
            move |txn| {
                Box::pin(async move {
                    games::require_game(txn, &code).await?;
                    let assignment = game_roles::find_for_player(txn, &code, player_id)
                        .await?
                        .ok_or_else(|| {
                            DomainError::not_found(
                                NotFoundKind::Assignment,
                                format!("No role assigned to player {player_id} in game {code}"),
                            )
                        })?;
                    roles::require_role(txn, assignment.role_id).await
                })
            },
        )
        .await
    }

    /// Every (player, role) pair of the game, ordered by player id. Empty
    /// before distribution. Moderator only.
    pub async fn get_all_assignments(
        &self,
        game_id: &str,
        moderator: &Principal,
    ) -> Result<Vec<PlayerAssignment>, DomainError> {
        let code = normalize_game_code(game_id)?;
        let moderator_id = moderator.clone();
        with_txn(
            &self.db,
            TxnMode::Default,
            self.config.store_timeout,
            move |txn| {
                Box::pin(async move {
                    let game = games::require_game(txn, &code).await?;
                    ensure_owner(&game, &moderator_id)?;

                    let assigned = game_roles::list_by_game(txn, &code).await?;
                    let mut out = Vec::with_capacity(assigned.len());
                    if assigned.is_empty() {
                        return Ok(out);
                    }

                    let roster = players::list_by_game(txn, &code).await?;
                    let role_ids: Vec<i64> = assigned
                        .iter()
                        .map(|a| a.role_id)
                        .collect::<BTreeSet<_>>()
                        .into_iter()
                        .collect();
                    let catalog = roles::require_all(txn, &role_ids).await?;

                    for a in assigned {
                        let player = roster.iter().find(|p| p.id == a.player_id).cloned();
                        let role = catalog.iter().find(|r| r.id == a.role_id).cloned();
                        match (player, role) {
                            (Some(player), Some(role)) => out.push(PlayerAssignment { player, role }),
                            _ => {
                                return Err(DomainError::infra(
                                    InfraErrorKind::DataCorruption,
                                    format!(
                                        "Assignment of player {} in game {code} has no matching rows",
                                        a.player_id
                                    ),
                                ))
                            }
                        }
                    }
                    Ok::<_, DomainError>(out)
                })
            },
        )
        .await
    }

    /// Register `conn` with the hub for `game_id`.
    ///
    /// The player snapshot and the registration happen under the game lock,
    /// so the first event after `initial_state` is the first mutation that
    /// committed after the snapshot.
    pub async fn subscribe(&self, game_id: &str, conn: Connection) -> Result<Uuid, DomainError> {
        let code = normalize_game_code(game_id)?;

        let _guard = self.locks.lock(&code).await;
        let game_code = code.clone();
        let (game, roster) = with_txn(
            &self.db,
            TxnMode::Default,
            self.config.store_timeout,
            move |txn| {
                Box::pin(async move {
                    let game = games::require_game(txn, &game_code).await?;
                    let roster = players::list_by_game(txn, &game_code).await?;
                    Ok::<_, DomainError>((game, roster))
                })
            },
        )
        .await?;

        let conn_id = conn.id();
        self.hub.do_send(Register {
            game_id: code.clone(),
            conn,
            status: game.status,
            players: roster,
        });
        debug!(game_id = %code, conn_id = %conn_id, "[GAME] subscriber registered");
        Ok(conn_id)
    }

    pub fn unsubscribe(&self, game_id: &str, conn_id: Uuid) {
        self.hub.do_send(Unregister {
            game_id: game_id.to_ascii_uppercase(),
            conn_id,
        });
    }

    /// Callback for `pump_outbox` that unregisters the connection when its
    /// socket stalls.
    pub fn unregister_on_stall(&self, game_id: &str, conn_id: Uuid) -> impl FnOnce() + Send + 'static {
        let hub = self.hub.clone();
        let game_id = game_id.to_ascii_uppercase();
        move || hub.do_send(Unregister { game_id, conn_id })
    }

    fn broadcast(&self, game_id: &str, event_type: EventType, payload: serde_json::Value) {
        self.hub.do_send(Broadcast::new(game_id, event_type, payload));
    }
}

/// Parse a status name as sent by a gateway.
pub fn parse_status(raw: &str) -> Result<GameStatus, DomainError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pending" => Ok(GameStatus::Pending),
        "active" => Ok(GameStatus::Active),
        "deleted" => Ok(GameStatus::Deleted),
        _ => Err(DomainError::validation(
            ValidationKind::InvalidStatus,
            format!("Unknown game status '{raw}'"),
        )),
    }
}

/// Allowed `update_status` moves: pending or active to deleted. Activation
/// only happens through role distribution and nothing leaves deleted.
fn check_transition(from: GameStatus, to: GameStatus) -> Result<(), DomainError> {
    match (from, to) {
        (GameStatus::Pending | GameStatus::Active, GameStatus::Deleted) => Ok(()),
        (GameStatus::Pending, GameStatus::Active) => Err(DomainError::state(
            StateKind::InvalidTransition,
            "A game becomes active by distributing roles",
        )),
        _ => Err(DomainError::state(
            StateKind::InvalidTransition,
            format!("Cannot move game from {from:?} to {to:?}"),
        )),
    }
}

fn ensure_owner(game: &Game, moderator: &Principal) -> Result<(), DomainError> {
    if moderator.owns(&game.moderator_id) {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!(
            "Only the moderator of game {} may do this",
            game.id
        )))
    }
}

fn not_pending(game: &Game) -> DomainError {
    DomainError::state(
        StateKind::GameNotPending,
        format!("Game {} is {:?}", game.id, game.status),
    )
}

fn validate_player_name(raw: &str) -> Result<String, DomainError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_PLAYER_NAME_CHARS {
        return Err(DomainError::validation(
            ValidationKind::InvalidPlayerName,
            format!("Player name must be 1 to {MAX_PLAYER_NAME_CHARS} characters"),
        ));
    }
    Ok(name.to_string())
}

fn to_payload<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        warn!(error = %e, "[GAME] failed to encode event payload");
        serde_json::Value::Null
    })
}
