//! Support behavior: heal the wounded, otherwise stay with the group.

use std::cmp::Ordering;

use crate::ai::{CombatAction, DecisionContext, TacticalPolicy};
use crate::grid::GridPos;
use crate::units::{AiBehavior, CombatantSnapshot};

/// Skill id fragments that mark a healing skill.
pub const HEAL_SKILL_PATTERNS: [&str; 5] = ["heal", "cure", "recover", "mend", "restore"];

/// Skill id used when a healer class knows no named healing skill.
pub const FALLBACK_HEAL_SKILL: &str = "heal";

/// Whether a skill id names a healing skill, ignoring case.
#[must_use]
pub fn is_healing_skill(skill_id: &str) -> bool {
    let lower = skill_id.to_lowercase();
    HEAL_SKILL_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

/// First healing skill the unit knows.
#[must_use]
pub fn healing_skill(unit: &CombatantSnapshot) -> Option<&str> {
    unit.skills
        .iter()
        .map(String::as_str)
        .find(|skill| is_healing_skill(skill))
}

/// Whether the unit can heal at all.
#[must_use]
pub fn can_heal(unit: &CombatantSnapshot) -> bool {
    unit.class.is_healer() || healing_skill(unit).is_some()
}

/// Compare HP ratios `a.current / a.max` and `b.current / b.max` exactly.
fn hp_ratio_cmp(a: &CombatantSnapshot, b: &CombatantSnapshot) -> Ordering {
    let lhs = i64::from(a.current_hp) * i64::from(b.max_hp.max(1));
    let rhs = i64::from(b.current_hp) * i64::from(a.max_hp.max(1));
    lhs.cmp(&rhs)
}

/// Heals the most injured ally below half HP. With nobody to heal it moves
/// to minimise total distance to the living allies.
#[derive(Debug, Clone, Copy, Default)]
pub struct SupportPolicy;

impl TacticalPolicy for SupportPolicy {
    fn behavior(&self) -> AiBehavior {
        AiBehavior::Support
    }

    fn decide(&self, ctx: &DecisionContext<'_>) -> CombatAction {
        let allies: Vec<(&CombatantSnapshot, GridPos)> = ctx.living_allies().collect();
        if allies.is_empty() {
            return ctx.wait_in_place();
        }

        let reachable = ctx.reachable_tiles();

        if can_heal(ctx.unit) {
            let patient = allies
                .iter()
                .filter(|(ally, _)| ally.is_below_half_hp())
                .min_by(|(a, a_pos), (b, b_pos)| {
                    hp_ratio_cmp(a, b)
                        .then_with(|| ctx.distance_from_origin(*a_pos).cmp(&ctx.distance_from_origin(*b_pos)))
                });

            if let Some(&(ally, ally_pos)) = patient {
                let cast_from = reachable
                    .iter()
                    .copied()
                    .filter(|tile| ctx.grid.distance(*tile, ally_pos) == 1)
                    .min_by_key(|tile| (ctx.distance_from_origin(*tile), *tile));

                if let Some(tile) = cast_from {
                    let skill_id = healing_skill(ctx.unit).unwrap_or(FALLBACK_HEAL_SKILL);
                    return CombatAction::Skill {
                        unit_id: ctx.unit.id.clone(),
                        target_unit_id: ally.id.clone(),
                        target_position: tile,
                        skill_id: skill_id.to_string(),
                    };
                }

                let toward = reachable
                    .iter()
                    .copied()
                    .min_by_key(|tile| (ctx.grid.distance(*tile, ally_pos), ctx.distance_from_origin(*tile), *tile))
                    .unwrap_or(ctx.origin);
                return CombatAction::wait_at(ctx.unit.id.clone(), toward);
            }
        }

        let group_distance = |tile: GridPos| -> u32 {
            allies.iter().map(|(_, pos)| ctx.grid.distance(tile, *pos)).sum()
        };
        let tile = reachable
            .iter()
            .copied()
            .min_by_key(|tile| (group_distance(*tile), ctx.distance_from_origin(*tile), *tile))
            .unwrap_or(ctx.origin);
        CombatAction::wait_at(ctx.unit.id.clone(), tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileGrid;
    use crate::units::{ClassTag, Stats};

    fn cleric(x: i32, y: i32) -> CombatantSnapshot {
        CombatantSnapshot::new(
            "cleric",
            ClassTag::Cleric,
            20,
            Stats {
                magic: 6,
                movement: 4,
                ..Stats::default()
            },
        )
        .with_behavior(AiBehavior::Support)
        .at(x, y)
    }

    fn ally(id: &str, hp: i32, x: i32, y: i32) -> CombatantSnapshot {
        CombatantSnapshot::new(id, ClassTag::Fighter, 30, Stats::default())
            .with_hp(hp)
            .at(x, y)
    }

    fn decide(unit: &CombatantSnapshot, allies: &[CombatantSnapshot], grid: &TileGrid) -> CombatAction {
        let ctx = DecisionContext::new(unit, allies, &[], grid).unwrap();
        SupportPolicy.decide(&ctx)
    }

    #[test]
    fn test_healing_skill_patterns() {
        assert!(is_healing_skill("Heal"));
        assert!(is_healing_skill("mass_cure"));
        assert!(is_healing_skill("RESTORE_plus"));
        assert!(is_healing_skill("mend"));
        assert!(is_healing_skill("recover"));
        assert!(!is_healing_skill("fireball"));
    }

    #[test]
    fn test_heals_most_injured_ally() {
        let grid = TileGrid::new(8, 8);
        let me = cleric(0, 0);
        let allies = vec![me.clone(), ally("scratched", 14, 2, 0), ally("dying", 3, 0, 3)];
        let action = decide(&me, &allies, &grid);
        assert_eq!(
            action,
            CombatAction::Skill {
                unit_id: "cleric".into(),
                target_unit_id: "dying".into(),
                target_position: GridPos::new(0, 2),
                skill_id: "heal".into(),
            }
        );
    }

    #[test]
    fn test_uses_known_heal_skill_id() {
        let grid = TileGrid::new(8, 8);
        let me = CombatantSnapshot::new(
            "medic",
            ClassTag::Mercenary,
            20,
            Stats {
                movement: 4,
                ..Stats::default()
            },
        )
        .with_skill("slash")
        .with_skill("Field_Mend")
        .at(0, 0);
        let allies = vec![ally("hurt", 5, 2, 0)];
        match decide(&me, &allies, &grid) {
            CombatAction::Skill { skill_id, .. } => assert_eq!(skill_id, "Field_Mend"),
            other => panic!("expected skill, got {other:?}"),
        }
    }

    #[test]
    fn test_half_hp_is_not_injured() {
        let grid = TileGrid::new(8, 1);
        let me = cleric(0, 0);
        let allies = vec![ally("half", 15, 5, 0)];
        // Nobody to heal: move to minimise distance to the group.
        assert_eq!(decide(&me, &allies, &grid), CombatAction::wait_at("cleric", GridPos::new(4, 0)));
    }

    #[test]
    fn test_moves_toward_unreachable_patient() {
        let grid = TileGrid::new(12, 1);
        let me = cleric(0, 0);
        let allies = vec![ally("hurt", 2, 10, 0)];
        assert_eq!(decide(&me, &allies, &grid), CombatAction::wait_at("cleric", GridPos::new(4, 0)));
    }

    #[test]
    fn test_non_healer_regroups() {
        let grid = TileGrid::new(10, 10);
        let me = CombatantSnapshot::new(
            "bard",
            ClassTag::Mercenary,
            20,
            Stats {
                movement: 2,
                ..Stats::default()
            },
        )
        .at(0, 0);
        let allies = vec![ally("a", 2, 4, 0), ally("b", 2, 4, 1)];
        // (2, 0) and (2, 1) tie on group distance; (2, 1) is out of reach.
        assert_eq!(decide(&me, &allies, &grid), CombatAction::wait_at("bard", GridPos::new(2, 0)));
    }

    #[test]
    fn test_no_allies_waits_in_place() {
        let grid = TileGrid::new(4, 4);
        let me = cleric(1, 1);
        assert_eq!(decide(&me, &[me.clone()], &grid), CombatAction::wait_at("cleric", GridPos::new(1, 1)));
    }
}
