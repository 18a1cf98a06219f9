//! Tactical AI tests for tactics_core.
//!
//! Drive [`AiSystem`] end to end on a reference grid.

use tactics_core::prelude::*;
use tactics_test_utils::fixtures::{axeman, cleric, open_field, swordsman};

const BEHAVIORS: [AiBehavior; 5] = [
    AiBehavior::Aggressive,
    AiBehavior::Defensive,
    AiBehavior::Support,
    AiBehavior::Flanker,
    AiBehavior::Boss,
];

// =============================================================================
// Target Selection
// =============================================================================

mod targeting {
    use super::*;

    #[test]
    fn test_aggressive_prefers_killable_target() {
        let grid = open_field(8, 8);
        let unit = swordsman("hero").at(2, 2).with_behavior(AiBehavior::Aggressive);
        let enemies = vec![
            // Adjacent but survives one estimated hit.
            axeman("tough").at(2, 3),
            // Further away but dies to one estimated hit.
            axeman("weak").at(6, 2).with_hp(10),
        ];

        let action = AiSystem::new().calculate_action(&unit, std::slice::from_ref(&unit), &enemies, &grid);
        assert_eq!(action.target_unit_id(), Some("weak"));
        assert_eq!(action.destination(), Some(GridPos::new(5, 2)));
    }

    #[test]
    fn test_killable_preference_ignores_listing_order() {
        let grid = open_field(8, 8);
        let unit = swordsman("hero").at(2, 2);
        let enemies = vec![axeman("weak").at(6, 2).with_hp(10), axeman("tough").at(2, 3)];

        let action = AiSystem::new().calculate_action(&unit, &[], &enemies, &grid);
        assert_eq!(action.target_unit_id(), Some("weak"));
    }

    #[test]
    fn test_boss_holds_position_when_healthy() {
        let grid = open_field(8, 8);
        let boss = axeman("boss").at(4, 4).with_behavior(AiBehavior::Boss);
        let players = vec![swordsman("hero").at(1, 4)];

        let action = AiSystem::new().calculate_action(&boss, &[], &players, &grid);
        assert!(action.is_wait());
        assert_eq!(action.destination(), Some(GridPos::new(4, 4)));
    }

    #[test]
    fn test_boss_charges_when_desperate() {
        let grid = open_field(8, 8);
        let boss = axeman("boss").at(4, 4).with_behavior(AiBehavior::Boss).with_hp(5);
        let players = vec![swordsman("hero").at(1, 4)];

        let action = AiSystem::new().calculate_action(&boss, &[], &players, &grid);
        assert_eq!(action.target_unit_id(), Some("hero"));
    }
}

// =============================================================================
// Support
// =============================================================================

mod support {
    use super::*;

    #[test]
    fn test_cleric_heals_wounded_ally() {
        let grid = open_field(8, 8);
        let healer = cleric("cleric").at(0, 0).with_behavior(AiBehavior::Support);
        let allies = vec![healer.clone(), swordsman("hero").at(3, 0).with_hp(8)];
        let enemies = vec![axeman("brute").at(7, 7)];

        let action = AiSystem::new().calculate_action(&healer, &allies, &enemies, &grid);
        match action {
            CombatAction::Skill {
                target_unit_id,
                target_position,
                skill_id,
                ..
            } => {
                assert_eq!(target_unit_id, "hero");
                assert_eq!(skill_id, "heal");
                assert_eq!(grid.distance(target_position, GridPos::new(3, 0)), 1);
            }
            other => panic!("expected a heal, got {other:?}"),
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

mod dispatch {
    use super::*;

    #[test]
    fn test_every_behavior_acts_for_its_own_unit() {
        let grid = open_field(10, 10);
        let ai = AiSystem::new();
        let enemies = vec![axeman("e1").at(7, 7), axeman("e2").at(8, 2)];

        for behavior in BEHAVIORS {
            let unit = swordsman("hero").at(2, 2).with_behavior(behavior);
            let allies = vec![unit.clone(), cleric("cleric").at(1, 2)];
            let action = ai.calculate_action(&unit, &allies, &enemies, &grid);
            assert_eq!(action.unit_id(), "hero", "{behavior:?}");
        }
    }

    #[test]
    fn test_decisions_are_pure() {
        let grid = open_field(10, 10);
        let ai = AiSystem::new();
        let enemies = vec![axeman("e1").at(5, 5), axeman("e2").at(6, 2).with_hp(4)];

        for behavior in BEHAVIORS {
            let unit = swordsman("hero").at(2, 2).with_behavior(behavior);
            let allies = vec![unit.clone(), cleric("cleric").at(1, 2).with_hp(5)];
            let first = ai.calculate_action(&unit, &allies, &enemies, &grid);
            let second = ai.calculate_action(&unit, &allies, &enemies, &grid);
            assert_eq!(first, second, "{behavior:?}");
        }
    }

    #[test]
    fn test_fallen_unit_waits_without_destination() {
        let grid = open_field(5, 5);
        let unit = swordsman("hero").at(2, 2).defeated();
        let enemies = vec![axeman("brute").at(2, 3)];

        let action = AiSystem::new().calculate_action(&unit, &[], &enemies, &grid);
        assert_eq!(
            action,
            CombatAction::Wait {
                unit_id: "hero".into(),
                target_position: None,
            }
        );
    }

    #[test]
    fn test_missing_behavior_acts_aggressively() {
        let grid = open_field(8, 8);
        let unit = swordsman("hero").at(2, 2);
        let enemies = vec![axeman("brute").at(4, 2)];
        let ai = AiSystem::new();

        let default_action = ai.calculate_action(&unit, &[], &enemies, &grid);
        let aggressive = ai.calculate_action(&unit.clone().with_behavior(AiBehavior::Aggressive), &[], &enemies, &grid);
        assert_eq!(default_action, aggressive);
    }
}
