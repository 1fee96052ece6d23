//! Randomized role assignment.
//!
//! A selection such as `[{role A, 2}, {role B, 1}]` is expanded into a flat
//! role list, shuffled with Fisher-Yates and zipped with the player list.

use std::collections::HashSet;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// How many players should receive `role_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSelection {
    pub role_id: i64,
    pub count: u32,
}

impl RoleSelection {
    pub fn new(role_id: i64, count: u32) -> Self {
        Self { role_id, count }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub player_id: i64,
    pub role_id: i64,
}

/// Check the shape of a selection and return how many role slots it asks
/// for. Nothing is allocated per slot, so huge counts are cheap to reject.
pub fn role_slot_count(selections: &[RoleSelection]) -> Result<u64, DomainError> {
    if selections.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::InvalidRoleSelection,
            "Role selection must not be empty",
        ));
    }

    let mut seen = HashSet::with_capacity(selections.len());
    let mut total: u64 = 0;
    for sel in selections {
        if sel.count == 0 {
            return Err(DomainError::validation(
                ValidationKind::InvalidRoleSelection,
                format!("Role {} has a count of zero", sel.role_id),
            ));
        }
        if !seen.insert(sel.role_id) {
            return Err(DomainError::validation(
                ValidationKind::InvalidRoleSelection,
                format!("Role {} is selected more than once", sel.role_id),
            ));
        }
        total = total.checked_add(u64::from(sel.count)).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::InvalidRoleCount,
                "Selected role counts overflow",
            )
        })?;
    }
    Ok(total)
}

/// One entry per role slot. Callers check the slot count first.
fn expand(selections: &[RoleSelection], total: usize) -> Vec<i64> {
    let mut roles = Vec::with_capacity(total);
    for sel in selections {
        roles.extend(std::iter::repeat(sel.role_id).take(sel.count as usize));
    }
    roles
}

/// Turns a selection and a player list into a 1:1 assignment.
///
/// Owns its random source so tests can pin the outcome with a seed.
pub struct RoleDistributor<R: RngCore> {
    rng: R,
}

impl RoleDistributor<ChaCha20Rng> {
    /// Production distributor seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(ChaCha20Rng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha20Rng::seed_from_u64(seed))
    }
}

impl<R: RngCore> RoleDistributor<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Pair `player_ids[i]` with the i-th role of a uniformly shuffled
    /// expansion of `selections`.
    ///
    /// Fails with `InvalidRoleCount` unless the counts add up to the number
    /// of players.
    pub fn assign(
        &mut self,
        selections: &[RoleSelection],
        player_ids: &[i64],
    ) -> Result<Vec<Assignment>, DomainError> {
        let total = role_slot_count(selections)?;
        if total != player_ids.len() as u64 {
            return Err(DomainError::validation(
                ValidationKind::InvalidRoleCount,
                format!("Selected {total} roles for {} players", player_ids.len()),
            ));
        }
        let mut roles = expand(selections, player_ids.len());

        self.shuffle(&mut roles);

        Ok(player_ids
            .iter()
            .zip(roles)
            .map(|(&player_id, role_id)| Assignment { player_id, role_id })
            .collect())
    }

    /// In-place Fisher-Yates.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rng.random_range(0..=i);
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;

    #[test]
    fn assigns_one_role_per_player_in_player_order() {
        let mut dist = RoleDistributor::seeded(7);
        let players = [10, 11, 12];
        let out = dist
            .assign(&[RoleSelection::new(1, 2), RoleSelection::new(2, 1)], &players)
            .unwrap();

        let ids: Vec<i64> = out.iter().map(|a| a.player_id).collect();
        assert_eq!(ids, players);

        let mut roles: Vec<i64> = out.iter().map(|a| a.role_id).collect();
        roles.sort_unstable();
        assert_eq!(roles, vec![1, 1, 2]);
    }

    #[test]
    fn count_mismatch_is_invalid_role_count() {
        let mut dist = RoleDistributor::seeded(1);
        let err = dist
            .assign(&[RoleSelection::new(1, 1), RoleSelection::new(2, 2)], &[1, 2])
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::InvalidRoleCount, _)
        ));
    }

    #[test]
    fn oversized_counts_are_rejected_without_expanding() {
        let mut dist = RoleDistributor::seeded(3);
        for selections in [
            vec![RoleSelection::new(1, u32::MAX)],
            vec![RoleSelection::new(1, u32::MAX), RoleSelection::new(2, u32::MAX)],
        ] {
            let err = dist.assign(&selections, &[1, 2]).unwrap_err();
            assert!(
                matches!(
                    err,
                    DomainError::Validation(ValidationKind::InvalidRoleCount, _)
                ),
                "{err}"
            );
        }
        assert_eq!(
            role_slot_count(&[RoleSelection::new(1, u32::MAX), RoleSelection::new(2, u32::MAX)])
                .unwrap(),
            2 * u64::from(u32::MAX)
        );
    }

    #[test]
    fn malformed_selections_are_rejected() {
        let cases: [&[RoleSelection]; 3] = [
            &[],
            &[RoleSelection::new(1, 0)],
            &[RoleSelection::new(1, 1), RoleSelection::new(1, 1)],
        ];
        for selections in cases {
            let err = role_slot_count(selections).unwrap_err();
            assert!(
                matches!(
                    err,
                    DomainError::Validation(ValidationKind::InvalidRoleSelection, _)
                ),
                "{selections:?}"
            );
        }
    }

    #[test]
    fn same_seed_same_assignment() {
        let selections = [RoleSelection::new(1, 3), RoleSelection::new(2, 3)];
        let players = [1, 2, 3, 4, 5, 6];
        let a = RoleDistributor::seeded(99).assign(&selections, &players).unwrap();
        let b = RoleDistributor::seeded(99).assign(&selections, &players).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_permutation_is_reachable() {
        let mut dist = RoleDistributor::seeded(2024);
        let mut seen = HashSet::new();
        for _ in 0..600 {
            let mut items = [1, 2, 3];
            dist.shuffle(&mut items);
            seen.insert(items);
        }
        assert_eq!(seen.len(), 6, "saw only {seen:?}");
    }

    #[test]
    fn each_role_lands_on_first_player_about_equally() {
        let selections = [
            RoleSelection::new(1, 1),
            RoleSelection::new(2, 1),
            RoleSelection::new(3, 1),
            RoleSelection::new(4, 1),
        ];
        let players = [100, 101, 102, 103];
        let mut dist = RoleDistributor::seeded(31337);
        let mut counts: HashMap<i64, u32> = HashMap::new();
        let trials = 4_000;
        for _ in 0..trials {
            let out = dist.assign(&selections, &players).unwrap();
            *counts.entry(out[0].role_id).or_default() += 1;
        }

        let expected = trials / 4;
        for role in 1..=4 {
            let got = counts.get(&role).copied().unwrap_or(0);
            assert!(
                got.abs_diff(expected) < 150,
                "role {role} landed first {got} times, expected about {expected}"
            );
        }
    }
}
