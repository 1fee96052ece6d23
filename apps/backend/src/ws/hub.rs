//! Per-game fan-out of realtime events.
//!
//! `BroadcastHub` is an actor: its mailbox is the only way in, so every
//! register, unregister and broadcast is applied in one serial order and the
//! subscriber map needs no locking. Delivery never waits on a client; each
//! connection owns a bounded outbox and the hub only ever `try_send`s into it.

use std::collections::HashMap;

use actix::prelude::*;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entities::games::GameStatus;
use crate::repos::players::Player;
use crate::ws::protocol::{EventType, InitialStatePayload, WireEvent};

/// Hub-side handle of a subscriber.
#[derive(Debug)]
pub struct Connection {
    id: Uuid,
    tx: mpsc::Sender<WireEvent>,
}

/// Gateway-side end of a subscriber. Closed once the hub drops the
/// matching `Connection`.
#[derive(Debug)]
pub struct Outbox {
    id: Uuid,
    rx: mpsc::Receiver<WireEvent>,
}

impl Connection {
    /// Create a connection with room for `capacity` undelivered events.
    pub fn channel(capacity: usize) -> (Connection, Outbox) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Connection { id, tx }, Outbox { id, rx })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn deliver(&self, game_id: &str, event: WireEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(game_id, conn_id = %self.id, "[HUB] outbox full, dropping subscriber");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(game_id, conn_id = %self.id, "[HUB] outbox closed, dropping subscriber");
                false
            }
        }
    }
}

impl Outbox {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next event, or `None` once the hub has let go of this connection and
    /// everything queued before that has been read.
    pub async fn recv(&mut self) -> Option<WireEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<WireEvent> {
        self.rx.try_recv().ok()
    }
}

// ----- messages -----

/// Subscribe `conn` to `game_id`. `conn` alone receives an `initial_state`
/// event built from `status` and `players`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Register {
    pub game_id: String,
    pub conn: Connection,
    pub status: GameStatus,
    pub players: Vec<Player>,
}

/// Remove a subscriber and close its outbox. Unknown ids are ignored.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct Unregister {
    pub game_id: String,
    pub conn_id: Uuid,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct Broadcast {
    pub game_id: String,
    pub event_type: EventType,
    pub payload: serde_json::Value,
}

impl Broadcast {
    pub fn new(game_id: impl Into<String>, event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            game_id: game_id.into(),
            event_type,
            payload,
        }
    }
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "usize")]
pub struct SubscriberCount {
    pub game_id: String,
}

/// Number of games with at least one subscriber.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "usize")]
pub struct ActiveGames;

// ----- actor -----

#[derive(Default)]
pub struct BroadcastHub {
    subscribers: HashMap<String, HashMap<Uuid, Connection>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn remove(&mut self, game_id: &str, conn_id: Uuid) {
        if let Some(conns) = self.subscribers.get_mut(game_id) {
            conns.remove(&conn_id);
            if conns.is_empty() {
                self.subscribers.remove(game_id);
            }
        }
    }
}

impl Actor for BroadcastHub {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[HUB] started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!(games = self.subscribers.len(), "[HUB] stopped");
    }
}

impl Handler<Register> for BroadcastHub {
    type Result = ();

    fn handle(&mut self, msg: Register, _ctx: &mut Self::Context) {
        let Register {
            game_id,
            conn,
            status,
            players,
        } = msg;

        let snapshot = InitialStatePayload {
            game_id: game_id.clone(),
            status,
            players,
        };
        let payload = match serde_json::to_value(&snapshot) {
            Ok(v) => v,
            Err(e) => {
                warn!(game_id = %game_id, error = %e, "[HUB] failed to encode initial state");
                return;
            }
        };

        if !conn.deliver(&game_id, WireEvent::new(EventType::InitialState, &game_id, payload)) {
            return;
        }

        debug!(game_id = %game_id, conn_id = %conn.id, "[HUB] registered");
        self.subscribers
            .entry(game_id)
            .or_default()
            .insert(conn.id, conn);
    }
}

impl Handler<Unregister> for BroadcastHub {
    type Result = ();

    fn handle(&mut self, msg: Unregister, _ctx: &mut Self::Context) {
        debug!(game_id = %msg.game_id, conn_id = %msg.conn_id, "[HUB] unregistered");
        self.remove(&msg.game_id, msg.conn_id);
    }
}

impl Handler<Broadcast> for BroadcastHub {
    type Result = ();

    fn handle(&mut self, msg: Broadcast, _ctx: &mut Self::Context) {
        let Some(conns) = self.subscribers.get(&msg.game_id) else {
            debug!(game_id = %msg.game_id, event = msg.event_type.as_str(), "[HUB] no subscribers");
            return;
        };

        let event = WireEvent::new(msg.event_type, &msg.game_id, msg.payload);
        let failed: Vec<Uuid> = conns
            .values()
            .filter(|conn| !conn.deliver(&msg.game_id, event.clone()))
            .map(|conn| conn.id)
            .collect();

        debug!(
            game_id = %msg.game_id,
            event = msg.event_type.as_str(),
            delivered = conns.len() - failed.len(),
            dropped = failed.len(),
            "[HUB] broadcast"
        );

        if msg.event_type == EventType::GameDeleted {
            // Dropping the connections closes every outbox after it drains.
            self.subscribers.remove(&msg.game_id);
            return;
        }

        for conn_id in failed {
            self.remove(&msg.game_id, conn_id);
        }
    }
}

impl Handler<SubscriberCount> for BroadcastHub {
    type Result = usize;

    fn handle(&mut self, msg: SubscriberCount, _ctx: &mut Self::Context) -> usize {
        self.subscribers.get(&msg.game_id).map_or(0, HashMap::len)
    }
}

impl Handler<ActiveGames> for BroadcastHub {
    type Result = usize;

    fn handle(&mut self, _msg: ActiveGames, _ctx: &mut Self::Context) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const GAME: &str = "K7Q2MX";

    async fn register(hub: &Addr<BroadcastHub>, capacity: usize) -> Outbox {
        let (conn, outbox) = Connection::channel(capacity);
        hub.send(Register {
            game_id: GAME.to_string(),
            conn,
            status: GameStatus::Pending,
            players: Vec::new(),
        })
        .await
        .unwrap();
        outbox
    }

    async fn subscriber_count(hub: &Addr<BroadcastHub>) -> usize {
        hub.send(SubscriberCount {
            game_id: GAME.to_string(),
        })
        .await
        .unwrap()
    }

    #[actix_rt::test]
    async fn initial_state_comes_first() {
        let hub = BroadcastHub::new().start();
        let mut outbox = register(&hub, 8).await;
        hub.send(Broadcast::new(GAME, EventType::RolesDistributed, json!(null)))
            .await
            .unwrap();

        let first = outbox.recv().await.unwrap();
        assert_eq!(first.event_type, EventType::InitialState);
        assert_eq!(first.payload["game_id"], GAME);
        assert_eq!(first.payload["status"], "pending");

        let second = outbox.recv().await.unwrap();
        assert_eq!(second.event_type, EventType::RolesDistributed);
    }

    #[actix_rt::test]
    async fn unregistered_connection_gets_nothing_and_is_closed() {
        let hub = BroadcastHub::new().start();
        let mut outbox = register(&hub, 8).await;
        assert_eq!(outbox.recv().await.unwrap().event_type, EventType::InitialState);

        hub.send(Unregister {
            game_id: GAME.to_string(),
            conn_id: outbox.id(),
        })
        .await
        .unwrap();
        hub.send(Broadcast::new(GAME, EventType::PlayerJoined, json!({"id": 1})))
            .await
            .unwrap();

        assert!(outbox.recv().await.is_none());
        assert_eq!(hub.send(ActiveGames).await.unwrap(), 0);
    }

    #[actix_rt::test]
    async fn stuck_subscriber_does_not_hold_back_others() {
        let hub = BroadcastHub::new().start();
        // capacity 1 is filled by initial_state and never drained
        let _stuck = register(&hub, 1).await;
        let mut healthy = register(&hub, 8).await;
        assert_eq!(subscriber_count(&hub).await, 2);

        for i in 0..3 {
            hub.send(Broadcast::new(GAME, EventType::PlayerJoined, json!({"id": i})))
                .await
                .unwrap();
        }

        assert_eq!(subscriber_count(&hub).await, 1);
        assert_eq!(healthy.recv().await.unwrap().event_type, EventType::InitialState);
        for i in 0..3 {
            let event = healthy.recv().await.unwrap();
            assert_eq!(event.payload["id"], i);
        }
    }

    #[actix_rt::test]
    async fn dropped_outbox_is_pruned_on_next_broadcast() {
        let hub = BroadcastHub::new().start();
        let outbox = register(&hub, 8).await;
        drop(outbox);

        hub.send(Broadcast::new(GAME, EventType::PlayerLeft, json!({"player_id": 1})))
            .await
            .unwrap();

        assert_eq!(subscriber_count(&hub).await, 0);
        assert_eq!(hub.send(ActiveGames).await.unwrap(), 0);
    }

    #[actix_rt::test]
    async fn game_deleted_drops_every_subscriber_after_delivery() {
        let hub = BroadcastHub::new().start();
        let mut a = register(&hub, 8).await;
        let mut b = register(&hub, 8).await;

        hub.send(Broadcast::new(GAME, EventType::GameDeleted, json!(null)))
            .await
            .unwrap();
        assert_eq!(subscriber_count(&hub).await, 0);

        for outbox in [&mut a, &mut b] {
            assert_eq!(outbox.recv().await.unwrap().event_type, EventType::InitialState);
            assert_eq!(outbox.recv().await.unwrap().event_type, EventType::GameDeleted);
            assert!(outbox.recv().await.is_none());
        }
    }

    #[actix_rt::test]
    async fn broadcast_to_unknown_game_is_a_no_op() {
        let hub = BroadcastHub::new().start();
        hub.send(Broadcast::new("ZZZZZZ", EventType::PlayerJoined, json!({})))
            .await
            .unwrap();
        assert_eq!(hub.send(ActiveGames).await.unwrap(), 0);
    }
}
