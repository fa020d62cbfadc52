//! Integration tests for team selection: cost terms, tie-breaks and the special-pair bias.

use court_rotation::{
    best_split, pairing_cost, score_splits, select_teams, CourtOccupancy, EngineConfig,
    PairingHistory, Participant, SessionError, SpecialBiasTracker, TeamSide,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

/// A, B, C, D with ten games each: ratings 0.8, 0.6, 0.7, 0.5.
fn rated_four() -> Vec<Participant> {
    vec![
        Participant::with_record("A", 8, 2),
        Participant::with_record("B", 6, 4),
        Participant::with_record("C", 7, 3),
        Participant::with_record("D", 5, 5),
    ]
}

fn members(team: &[String]) -> HashSet<String> {
    team.iter().cloned().collect()
}

fn set(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[test]
fn balanced_split_wins_with_empty_history() {
    let players = rated_four();
    let group: Vec<&Participant> = players.iter().collect();
    let config = EngineConfig::default();
    let history = PairingHistory::new(None);

    let splits = score_splits(&group, &history, &config).unwrap();
    assert_eq!(splits.len(), 3);
    assert!((splits[0].cost - 0.1).abs() < 1e-9); // AB 0.7 vs CD 0.6
    assert!((splits[1].cost - 0.2).abs() < 1e-9); // AC 0.75 vs BD 0.55
    assert!(splits[2].cost.abs() < 1e-9); // AD 0.65 vs BC 0.65

    let best = best_split(&group, &history, &config).unwrap();
    assert_eq!(members(&best.team_x), set(&["a", "d"]));
    assert_eq!(members(&best.team_y), set(&["b", "c"]));
}

#[test]
fn selection_only_shuffles_order_within_teams() {
    let players = rated_four();
    let group: Vec<&Participant> = players.iter().collect();
    let config = EngineConfig::default();
    let history = PairingHistory::new(None);
    let expected = [
        set(&["a", "d"]),
        set(&["b", "c"]),
    ];

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        match select_teams(&group, &history, &config, &mut rng).unwrap() {
            CourtOccupancy::Occupied { team_x, team_y } => {
                assert_eq!(members(&team_x), expected[0]);
                assert_eq!(members(&team_y), expected[1]);
            }
            CourtOccupancy::Empty => panic!("selection must occupy the court"),
        }
    }
}

#[test]
fn repeat_penalties_add_weighted_counts() {
    let players = rated_four();
    let (a, b, c, d) = (&players[0], &players[1], &players[2], &players[3]);
    let config = EngineConfig::default();
    let fresh = PairingHistory::new(None);
    let mut seen = PairingHistory::new(None);
    seen.set_teammate_count("a", "d", 2);
    seen.set_opponent_count("a", "b", 3);

    let base = pairing_cost([a, d], [b, c], &fresh, &config);
    let with_history = pairing_cost([a, d], [b, c], &seen, &config);
    assert!(base.abs() < 1e-9);
    assert!((with_history - base - 3.5).abs() < 1e-9);

    // AB|CD now only pays its 0.1 imbalance.
    let group: Vec<&Participant> = players.iter().collect();
    let best = best_split(&group, &seen, &config).unwrap();
    assert_eq!(members(&best.team_x), set(&["a", "b"]));
}

#[test]
fn ties_keep_first_enumerated_split() {
    let players: Vec<Participant> = ["w", "x", "y", "z"].iter().map(|n| Participant::new(*n)).collect();
    let group: Vec<&Participant> = players.iter().collect();
    let best = best_split(&group, &PairingHistory::new(None), &EngineConfig::default()).unwrap();
    assert_eq!(members(&best.team_x), set(&["w", "x"]));
    assert_eq!(best.cost, 0.0);
}

#[test]
fn rejects_groups_that_are_not_four_distinct_players() {
    let players = rated_four();
    let config = EngineConfig::default();
    let history = PairingHistory::new(None);
    let three: Vec<&Participant> = players.iter().take(3).collect();
    assert_eq!(
        best_split(&three, &history, &config),
        Err(SessionError::InvalidGroupSize(3))
    );
    let repeated = vec![&players[0], &players[0], &players[1], &players[2]];
    assert!(matches!(
        best_split(&repeated, &history, &config),
        Err(SessionError::InvalidGroupSize(_))
    ));
}

#[test]
fn special_bias_rewards_teaming_below_target() {
    let config = EngineConfig::default().with_special_pair("chad", "budong");
    let players: Vec<Participant> = ["chad", "x", "budong", "y"]
        .iter()
        .map(|n| Participant::new(*n))
        .collect();
    let group: Vec<&Participant> = players.iter().collect();

    // No shared games yet: ratio 0, delta 0.6, teaming costs -1.2, the others +1.2.
    let history = PairingHistory::new(config.special_pair.clone());
    let splits = score_splits(&group, &history, &config).unwrap();
    assert!((splits[0].cost - 1.2).abs() < 1e-9);
    assert!((splits[1].cost + 1.2).abs() < 1e-9);
    assert!((splits[2].cost - 1.2).abs() < 1e-9);

    // Always teamed so far: ratio 1, delta -0.4, teaming is penalized.
    let mut tracker = SpecialBiasTracker::new(config.special_pair.clone());
    let chad_budong = ["chad".to_string(), "budong".to_string()];
    let others = ["x".to_string(), "y".to_string()];
    tracker.record_game(&chad_budong, &others);
    let history = PairingHistory::with_special(tracker);
    let best = best_split(&group, &history, &config).unwrap();
    assert!(!members(&best.team_x).is_superset(&members(&chad_budong)));
    assert!(!members(&best.team_y).is_superset(&members(&chad_budong)));
}

#[test]
fn special_bias_ignores_groups_without_both() {
    let config = EngineConfig::default().with_special_pair("chad", "budong");
    let players: Vec<Participant> = ["chad", "x", "y", "z"].iter().map(|n| Participant::new(*n)).collect();
    let group: Vec<&Participant> = players.iter().collect();
    let splits = score_splits(&group, &PairingHistory::new(config.special_pair.clone()), &config).unwrap();
    assert!(splits.iter().all(|s| s.cost == 0.0));
}

#[test]
fn special_pair_ratio_converges_to_target() {
    let config = EngineConfig::default().with_special_pair("chad", "budong");
    let players: Vec<Participant> = ["chad", "x", "budong", "y"]
        .iter()
        .map(|n| Participant::new(*n))
        .collect();
    let group: Vec<&Participant> = players.iter().collect();
    let mut tracker = SpecialBiasTracker::new(config.special_pair.clone());
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..100 {
        let history = PairingHistory::with_special(tracker.clone());
        let occupancy = select_teams(&group, &history, &config, &mut rng).unwrap();
        let (winners, losers) = occupancy.split_by_winner(TeamSide::X).unwrap();
        tracker.record_game(&winners, &losers);
    }

    assert_eq!(tracker.together_count(), 100);
    let ratio = tracker.ratio();
    assert!((ratio - 0.6).abs() < 0.05, "ratio {ratio}");
}
