mod common;

use std::collections::HashSet;

use backend::domain::RoleSelection;
use backend::entities::games::GameStatus;
use backend::errors::domain::{ConflictKind, DomainError, StateKind};
use backend::repos::{game_roles, players};
use futures::future::join_all;

use crate::common::{moderator, seed_roles, test_state};

#[actix_rt::test]
async fn joins_racing_a_distribution_never_leave_an_unassigned_player() {
    let state = test_state().await;
    let owner = moderator();
    let roles = seed_roles(&state, &["Mafia", "Villager"]).await;

    for round in 0..5 {
        let game = state.games.create_session(&owner).await.unwrap();
        state.games.join(&game.id, "First").await.unwrap();
        state.games.join(&game.id, "Second").await.unwrap();

        let selections = vec![
            RoleSelection::new(roles[0].id, 1),
            RoleSelection::new(roles[1].id, 1),
        ];
        let distribute = state.games.distribute_roles(&game.id, &owner, selections);
        let late_names: Vec<String> = (0..4).map(|i| format!("Late{round}-{i}")).collect();
        let joins = join_all(late_names.iter().map(|n| state.games.join(&game.id, n)));

        let (dealt, joined) = futures::join!(distribute, joins);

        for result in &joined {
            if let Err(e) = result {
                assert!(
                    matches!(e, DomainError::State(StateKind::GameNotPending, _)),
                    "{e}"
                );
            }
        }

        let game = state.games.get_game(&game.id).await.unwrap();
        let seated = players::count_by_game(state.db(), &game.id).await.unwrap();
        let assigned = game_roles::count_by_game(state.db(), &game.id).await.unwrap();
        match game.status {
            GameStatus::Active => {
                assert!(dealt.is_ok());
                assert_eq!(seated, assigned, "round {round}");
            }
            GameStatus::Pending => {
                assert!(dealt.is_err());
                assert_eq!(assigned, 0, "round {round}");
            }
            GameStatus::Deleted => panic!("nobody deleted game {}", game.id),
        }
    }
}

#[actix_rt::test]
async fn concurrent_distributions_succeed_exactly_once() {
    let state = test_state().await;
    let owner = moderator();
    let roles = seed_roles(&state, &["Mafia", "Villager", "Doctor"]).await;
    let game = state.games.create_session(&owner).await.unwrap();
    for name in ["A", "B", "C"] {
        state.games.join(&game.id, name).await.unwrap();
    }
    let selections: Vec<RoleSelection> =
        roles.iter().map(|r| RoleSelection::new(r.id, 1)).collect();

    let results = join_all(
        (0..6).map(|_| state.games.distribute_roles(&game.id, &owner, selections.clone())),
    )
    .await;

    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(
            matches!(err, DomainError::Conflict(ConflictKind::RolesAlreadyAssigned, _)),
            "{err}"
        );
    }
    assert_eq!(game_roles::count_by_game(state.db(), &game.id).await.unwrap(), 3);
}

#[actix_rt::test]
async fn concurrent_joins_with_one_name_seat_one_player() {
    let state = test_state().await;
    let game = state.games.create_session(&moderator()).await.unwrap();

    let results = join_all((0..5).map(|_| state.games.join(&game.id, "Alice"))).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(
            err,
            DomainError::Conflict(ConflictKind::PlayerNameTaken, _)
        ));
    }
    assert_eq!(players::count_by_game(state.db(), &game.id).await.unwrap(), 1);
}

#[actix_rt::test]
async fn concurrent_creates_get_unique_codes() {
    let state = test_state().await;
    let owner = moderator();

    let created = join_all((0..20).map(|_| state.games.create_session(&owner))).await;

    let codes: HashSet<String> = created
        .into_iter()
        .map(|r| r.expect("create_session").id)
        .collect();
    assert_eq!(codes.len(), 20);
}
