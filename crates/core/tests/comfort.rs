//! Property tests for the comfort model.
//!
//! These sweep temperatures across the operating range and check the
//! invariants every consumer relies on: bounded scores, monotone decay away
//! from the optimum, and the calibrated two-group asymmetry.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thermal_core::{ComfortModel, Preference, PRIMARY_GROUP, SECONDARY_GROUP};

fn sweep() -> impl Iterator<Item = f64> {
    (0..=400).map(|i| 5.0 + i as f64 * 0.1)
}

// ============================================================================
// Comfort Score
// ============================================================================

#[test]
fn comfort_always_in_unit_interval() {
    let model = ComfortModel::reference();
    for group in [PRIMARY_GROUP, SECONDARY_GROUP] {
        for t in sweep() {
            let c = model.comfort_score(t, group).unwrap();
            assert!((0.0..=1.0).contains(&c), "{group} at {t}: {c}");
        }
    }
}

#[test]
fn comfort_non_increasing_in_deviation() {
    let model = ComfortModel::reference();
    for group in [PRIMARY_GROUP, SECONDARY_GROUP] {
        let optimal = model.profile(group).unwrap().optimal();
        let mut previous = f64::INFINITY;
        for i in 0..=100 {
            let deviation = i as f64 * 0.1;
            let above = model.comfort_score(optimal + deviation, group).unwrap();
            let below = model.comfort_score(optimal - deviation, group).unwrap();
            assert!((above - below).abs() < 1e-9);
            assert!(above <= previous + 1e-12, "{group} at dev {deviation}");
            previous = above;
        }
    }
}

#[test]
fn comfort_is_one_at_optimum() {
    let model = ComfortModel::reference();
    assert_eq!(model.comfort_score(22.0, PRIMARY_GROUP).unwrap(), 1.0);
    assert_eq!(model.comfort_score(24.0, SECONDARY_GROUP).unwrap(), 1.0);
}

#[test]
fn two_groups_at_primary_optimum() {
    let model = ComfortModel::reference();

    let primary = model.comfort_score(22.0, PRIMARY_GROUP).unwrap();
    let secondary = model.comfort_score(22.0, SECONDARY_GROUP).unwrap();

    assert_eq!(primary, 1.0);
    // deviation 2.0 → 0.8 - 0.4 * 1.0 = 0.4, then × 0.9
    assert!((secondary - 0.36).abs() < 1e-9);
}

#[test]
fn secondary_penalized_symmetrically() {
    let model = ComfortModel::reference();
    // Same deviation from each group's own optimum.
    let primary = model.comfort_score(23.0, PRIMARY_GROUP).unwrap();
    let secondary = model.comfort_score(25.0, SECONDARY_GROUP).unwrap();
    assert!((secondary - 0.9 * primary).abs() < 1e-9);
}

// ============================================================================
// Sensation and Preference
// ============================================================================

#[test]
fn sensation_votes_bounded() {
    let model = ComfortModel::reference();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for group in [PRIMARY_GROUP, SECONDARY_GROUP] {
        for t in sweep() {
            let vote = model.sensation_vote(t, group, &mut rng).unwrap();
            assert!((-3..=3).contains(&vote));
        }
    }
}

#[test]
fn sensation_reproducible_with_same_seed() {
    let model = ComfortModel::reference();
    let mut a = ChaCha8Rng::seed_from_u64(99);
    let mut b = ChaCha8Rng::seed_from_u64(99);
    for t in sweep() {
        assert_eq!(
            model.sensation_vote(t, PRIMARY_GROUP, &mut a).unwrap(),
            model.sensation_vote(t, PRIMARY_GROUP, &mut b).unwrap()
        );
    }
}

#[test]
fn preference_signals_follow_deviation() {
    let model = ComfortModel::reference();
    for t in sweep() {
        let signal = model.preference_signal(t, PRIMARY_GROUP).unwrap();
        let expected = if t > 23.0 {
            Preference::WantsCooler
        } else if t < 21.0 {
            Preference::WantsWarmer
        } else {
            Preference::Neutral
        };
        assert_eq!(signal, expected, "at {t}");
        assert!((-1..=1).contains(&signal.signal()));
    }
}

#[test]
fn unknown_group_is_rejected_everywhere() {
    let model = ComfortModel::reference();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert!(model.comfort_score(22.0, "other").is_err());
    assert!(model.sensation_vote(22.0, "other", &mut rng).is_err());
    assert!(model.preference_signal(22.0, "other").is_err());
}
