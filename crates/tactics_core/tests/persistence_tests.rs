//! File-backed rules and replay tests for tactics_core.

use std::io::Write;

use tactics_core::prelude::*;
use tactics_test_utils::determinism::verify_combat_determinism;
use tactics_test_utils::fixtures::{axeman, fire_tome, iron_axe, iron_sword, swordsman, SAMPLE_RULES_RON};

fn duel() -> Engagement {
    Engagement::new(swordsman("hero"), axeman("brute"), iron_sword(), 1).with_defender_weapon(iron_axe())
}

#[test]
fn test_rules_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE_RULES_RON.as_bytes()).unwrap();

    let rules = CombatRules::load(file.path()).unwrap();
    assert_eq!(rules.triangle_hit_bonus, 20);
    assert_eq!(rules.double_threshold, 4);
    assert_eq!(rules.critical_multiplier, CombatRules::default().critical_multiplier);
}

#[test]
fn test_invalid_rules_are_rejected() {
    let err = CombatRules::from_ron_str("CombatRules(critical_multiplier: 0)").unwrap_err();
    assert!(matches!(err, GameError::InvalidRules(_)));
}

#[test]
fn test_replay_survives_disk_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("duel.replay");

    let mut engine = CombatEngine::with_seed(2024);
    let mut replay = BattleReplay::for_engine("duel", &engine);
    let mut expected = Vec::new();
    for hp in [30, 18, 9] {
        let mut engagement = duel();
        engagement.defender.current_hp = hp;
        expected.push(replay.resolve_and_record(&mut engine, engagement));
    }
    let ranged = Engagement::new(swordsman("mage"), axeman("brute"), fire_tome(), 2);
    expected.push(replay.resolve_and_record(&mut engine, ranged));

    replay.save(&path).unwrap();
    let loaded = BattleReplay::load(&path).unwrap();

    assert_eq!(loaded, replay);
    assert_eq!(loaded.verify().unwrap(), expected);
}

#[test]
fn test_tampered_replay_reports_first_divergence() {
    let mut engine = CombatEngine::with_seed(5);
    let mut replay = BattleReplay::for_engine("tampered", &engine);
    for _ in 0..3 {
        replay.resolve_and_record(&mut engine, duel());
    }
    replay.entries[1].result_hash ^= 1;

    match replay.verify() {
        Err(GameError::ReplayMismatch { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected a mismatch, got {other:?}"),
    }
}

#[test]
fn test_long_fixture_duel_is_deterministic() {
    verify_combat_determinism(&duel(), 77, 3, 100).assert_deterministic();
}
