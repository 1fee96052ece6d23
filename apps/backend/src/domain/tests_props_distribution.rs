//! Property tests for role distribution (pure domain, no DB).

use std::collections::HashSet;

use proptest::prelude::*;

use crate::domain::distribution::{RoleDistributor, RoleSelection};
use crate::errors::domain::{DomainError, ValidationKind};

/// Distinct role ids with counts in 1..=4.
fn selections() -> impl Strategy<Value = Vec<RoleSelection>> {
    prop::collection::btree_map(1i64..50, 1u32..=4, 1..6).prop_map(|m| {
        m.into_iter()
            .map(|(role_id, count)| RoleSelection::new(role_id, count))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: when counts add up, the assigned multiset equals the selection
    /// and every player gets exactly one role.
    #[test]
    fn prop_assignment_preserves_multiset(
        selections in selections(),
        seed in any::<u64>(),
    ) {
        let total: u32 = selections.iter().map(|s| s.count).sum();
        let players: Vec<i64> = (1..=i64::from(total)).collect();

        let out = RoleDistributor::seeded(seed).assign(&selections, &players).unwrap();

        prop_assert_eq!(out.len(), players.len());
        let assigned_players: HashSet<i64> = out.iter().map(|a| a.player_id).collect();
        prop_assert_eq!(assigned_players.len(), players.len());

        for sel in &selections {
            let got = out.iter().filter(|a| a.role_id == sel.role_id).count();
            prop_assert_eq!(got, sel.count as usize, "role {}", sel.role_id);
        }
    }

    /// Property: any mismatch between slots and players is rejected.
    #[test]
    fn prop_mismatched_totals_rejected(
        selections in selections(),
        delta in 1i64..4,
        fewer in any::<bool>(),
    ) {
        let total = i64::from(selections.iter().map(|s| s.count).sum::<u32>());
        let n = if fewer { (total - delta).max(0) } else { total + delta };
        prop_assume!(n != total);
        let players: Vec<i64> = (1..=n).collect();

        let err = RoleDistributor::seeded(0).assign(&selections, &players).unwrap_err();
        prop_assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::InvalidRoleCount, _)
        ));
    }
}
