mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backend::domain::RoleSelection;
use backend::entities::games::GameStatus;
use backend::errors::domain::{DomainError, NotFoundKind};
use backend::ws::hub::{Connection, SubscriberCount};
use backend::ws::outbox::{pump_outbox, EventSink, PumpExit, SinkError};
use backend::ws::protocol::{EventType, WireEvent};
use parking_lot::Mutex;
use serde_json::json;

use crate::common::{hub_barrier, is_closed, moderator, next_event, seed_roles, test_state};

async fn subscribers(state: &backend::AppState, game_id: &str) -> usize {
    state
        .hub
        .send(SubscriberCount {
            game_id: game_id.to_string(),
        })
        .await
        .expect("hub is running")
}

#[actix_rt::test]
async fn subscriber_gets_initial_state_first() {
    let state = test_state().await;
    let game = state.games.create_session(&moderator()).await.unwrap();
    let alice = state.games.join(&game.id, "Alice").await.unwrap();

    let (conn, mut outbox) = state.new_connection();
    let conn_id = state.games.subscribe(&game.id, conn).await.unwrap();
    assert_eq!(conn_id, outbox.id());

    let event = next_event(&mut outbox).await;
    assert_eq!(event.event_type, EventType::InitialState);
    assert_eq!(event.game_id, game.id);
    assert_eq!(event.payload["status"], json!("pending"));
    assert_eq!(event.payload["players"][0]["id"], json!(alice.id));
    assert_eq!(event.payload["players"][0]["name"], json!("Alice"));
    assert_eq!(subscribers(&state, &game.id).await, 1);
}

#[actix_rt::test]
async fn lifecycle_events_arrive_in_order() {
    let state = test_state().await;
    let owner = moderator();
    let roles = seed_roles(&state, &["Mafia", "Villager"]).await;
    let game = state.games.create_session(&owner).await.unwrap();

    let (conn, mut outbox) = state.new_connection();
    state.games.subscribe(&game.id, conn).await.unwrap();

    let alice = state.games.join(&game.id, "Alice").await.unwrap();
    let bob = state.games.join(&game.id, "Bob").await.unwrap();
    let carol = state.games.join(&game.id, "Carol").await.unwrap();
    state.games.remove_player(&game.id, carol.id, &owner).await.unwrap();
    state
        .games
        .distribute_roles(
            &game.id,
            &owner,
            vec![
                RoleSelection::new(roles[0].id, 1),
                RoleSelection::new(roles[1].id, 1),
            ],
        )
        .await
        .unwrap();

    let initial = next_event(&mut outbox).await;
    assert_eq!(initial.event_type, EventType::InitialState);
    assert_eq!(initial.payload["players"], json!([]));

    for expected in [&alice, &bob, &carol] {
        let event = next_event(&mut outbox).await;
        assert_eq!(event.event_type, EventType::PlayerJoined);
        assert_eq!(event.payload["id"], json!(expected.id));
        assert_eq!(event.payload["name"], json!(expected.name));
    }

    let left = next_event(&mut outbox).await;
    assert_eq!(left.event_type, EventType::PlayerLeft);
    assert_eq!(left.payload, json!({ "player_id": carol.id }));

    // role details never go out on the shared channel
    let dealt = next_event(&mut outbox).await;
    assert_eq!(dealt.event_type, EventType::RolesDistributed);
    assert_eq!(dealt.payload, serde_json::Value::Null);

    assert!(outbox.try_recv().is_none());
}

#[actix_rt::test]
async fn failed_operations_broadcast_nothing() {
    let state = test_state().await;
    let owner = moderator();
    let game = state.games.create_session(&owner).await.unwrap();
    state.games.join(&game.id, "Alice").await.unwrap();

    let (conn, mut outbox) = state.new_connection();
    state.games.subscribe(&game.id, conn).await.unwrap();
    assert_eq!(next_event(&mut outbox).await.event_type, EventType::InitialState);

    state.games.join(&game.id, "Alice").await.unwrap_err();
    state
        .games
        .remove_player(&game.id, 9_999, &owner)
        .await
        .unwrap_err();
    state
        .games
        .update_status(&game.id, GameStatus::Pending, &owner)
        .await
        .unwrap();
    state
        .games
        .update_status(&game.id, GameStatus::Deleted, &moderator())
        .await
        .unwrap_err();

    hub_barrier(&state).await;
    assert!(outbox.try_recv().is_none());
}

#[actix_rt::test]
async fn games_do_not_see_each_others_events() {
    let state = test_state().await;
    let owner = moderator();
    let g1 = state.games.create_session(&owner).await.unwrap();
    let g2 = state.games.create_session(&owner).await.unwrap();

    let (c1, mut o1) = state.new_connection();
    let (c2, mut o2) = state.new_connection();
    state.games.subscribe(&g1.id, c1).await.unwrap();
    state.games.subscribe(&g2.id, c2).await.unwrap();
    next_event(&mut o1).await;
    next_event(&mut o2).await;

    state.games.join(&g1.id, "Alice").await.unwrap();

    let event = next_event(&mut o1).await;
    assert_eq!(event.game_id, g1.id);
    hub_barrier(&state).await;
    assert!(o2.try_recv().is_none());
}

#[actix_rt::test]
async fn deleting_a_game_notifies_then_closes_every_subscriber() {
    let state = test_state().await;
    let owner = moderator();
    let game = state.games.create_session(&owner).await.unwrap();

    let (c1, mut o1) = state.new_connection();
    let (c2, mut o2) = state.new_connection();
    state.games.subscribe(&game.id, c1).await.unwrap();
    state.games.subscribe(&game.id, c2).await.unwrap();
    assert_eq!(subscribers(&state, &game.id).await, 2);

    state.games.delete(&game.id, &owner).await.unwrap();

    for outbox in [&mut o1, &mut o2] {
        assert_eq!(next_event(outbox).await.event_type, EventType::InitialState);
        assert_eq!(next_event(outbox).await.event_type, EventType::GameDeleted);
        assert!(is_closed(outbox).await);
    }
    assert_eq!(subscribers(&state, &game.id).await, 0);
}

#[actix_rt::test]
async fn marking_deleted_also_notifies_and_closes() {
    let state = test_state().await;
    let owner = moderator();
    let game = state.games.create_session(&owner).await.unwrap();

    let (conn, mut outbox) = state.new_connection();
    state.games.subscribe(&game.id, conn).await.unwrap();

    state
        .games
        .update_status(&game.id, GameStatus::Deleted, &owner)
        .await
        .unwrap();

    assert_eq!(next_event(&mut outbox).await.event_type, EventType::InitialState);
    let deleted = next_event(&mut outbox).await;
    assert_eq!(deleted.event_type, EventType::GameDeleted);
    assert_eq!(deleted.game_id, game.id);
    assert!(is_closed(&mut outbox).await);
}

#[actix_rt::test]
async fn unsubscribe_stops_delivery() {
    let state = test_state().await;
    let game = state.games.create_session(&moderator()).await.unwrap();

    let (conn, mut outbox) = state.new_connection();
    let conn_id = state.games.subscribe(&game.id, conn).await.unwrap();
    assert_eq!(next_event(&mut outbox).await.event_type, EventType::InitialState);

    state.games.unsubscribe(&game.id, conn_id);
    assert!(is_closed(&mut outbox).await);
    assert_eq!(subscribers(&state, &game.id).await, 0);

    // broadcasting to a game nobody watches is fine
    state.games.join(&game.id, "Alice").await.unwrap();
    hub_barrier(&state).await;
}

#[actix_rt::test]
async fn subscribing_to_an_unknown_game_fails() {
    let state = test_state().await;
    let (conn, mut outbox) = state.new_connection();

    let err = state.games.subscribe("ZZZZZZ", conn).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Game, _)));
    // the connection was dropped along with the error
    assert!(is_closed(&mut outbox).await);
}

#[actix_rt::test]
async fn full_outbox_drops_only_that_subscriber() {
    let state = test_state().await;
    let game = state.games.create_session(&moderator()).await.unwrap();

    // room for initial_state only
    let (slow, mut slow_out) = Connection::channel(1);
    let (fast, mut fast_out) = state.new_connection();
    state.games.subscribe(&game.id, slow).await.unwrap();
    state.games.subscribe(&game.id, fast).await.unwrap();

    state.games.join(&game.id, "Alice").await.unwrap();
    state.games.join(&game.id, "Bob").await.unwrap();
    hub_barrier(&state).await;

    assert_eq!(next_event(&mut slow_out).await.event_type, EventType::InitialState);
    assert!(is_closed(&mut slow_out).await);

    let kinds: Vec<EventType> = [
        next_event(&mut fast_out).await,
        next_event(&mut fast_out).await,
        next_event(&mut fast_out).await,
    ]
    .iter()
    .map(|e| e.event_type)
    .collect();
    assert_eq!(
        kinds,
        vec![
            EventType::InitialState,
            EventType::PlayerJoined,
            EventType::PlayerJoined
        ]
    );
    assert_eq!(subscribers(&state, &game.id).await, 1);
}

#[derive(Clone, Default)]
struct CapturingSink {
    frames: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<bool>>,
}

#[async_trait]
impl EventSink for CapturingSink {
    async fn send_text(&mut self, text: String) -> Result<(), SinkError> {
        self.frames.lock().push(text);
        Ok(())
    }

    async fn close(&mut self) {
        *self.closed.lock() = true;
    }
}

struct StalledSink;

#[async_trait]
impl EventSink for StalledSink {
    async fn send_text(&mut self, _text: String) -> Result<(), SinkError> {
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn close(&mut self) {}
}

#[actix_rt::test]
async fn pump_writes_json_frames_until_game_is_deleted() {
    let state = test_state().await;
    let owner = moderator();
    let game = state.games.create_session(&owner).await.unwrap();

    let (conn, outbox) = state.new_connection();
    let conn_id = state.games.subscribe(&game.id, conn).await.unwrap();

    let sink = CapturingSink::default();
    let pump = actix_rt::spawn(pump_outbox(
        outbox,
        sink.clone(),
        state.hub_config.write_timeout,
        state.games.unregister_on_stall(&game.id, conn_id),
    ));

    state.games.join(&game.id, "Alice").await.unwrap();
    state.games.delete(&game.id, &owner).await.unwrap();

    let exit = tokio::time::timeout(Duration::from_secs(2), pump)
        .await
        .expect("pump should finish")
        .expect("pump task should not panic");
    assert_eq!(exit, PumpExit::OutboxClosed);
    assert!(*sink.closed.lock());

    let frames = sink.frames.lock().clone();
    let events: Vec<WireEvent> = frames
        .iter()
        .map(|f| serde_json::from_str(f).unwrap())
        .collect();
    let kinds: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(kinds, vec!["initial_state", "player_joined", "game_deleted"]);

    let raw: serde_json::Value = serde_json::from_str(&frames[1]).unwrap();
    assert_eq!(raw["type"], json!("player_joined"));
    assert_eq!(raw["game_id"], json!(game.id));
}

#[actix_rt::test]
async fn stalled_socket_is_unregistered() {
    let state = test_state().await;
    let game = state.games.create_session(&moderator()).await.unwrap();

    let (conn, outbox) = state.new_connection();
    let conn_id = state.games.subscribe(&game.id, conn).await.unwrap();
    assert_eq!(subscribers(&state, &game.id).await, 1);

    let exit = pump_outbox(
        outbox,
        StalledSink,
        Duration::from_millis(50),
        state.games.unregister_on_stall(&game.id, conn_id),
    )
    .await;
    assert_eq!(exit, PumpExit::WriteTimedOut);

    hub_barrier(&state).await;
    assert_eq!(subscribers(&state, &game.id).await, 0);

    // the rest of the game carries on
    state.games.join(&game.id, "Alice").await.unwrap();
}
