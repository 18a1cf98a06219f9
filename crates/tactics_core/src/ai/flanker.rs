//! Flanker behavior: strike enemies from the side or rear.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use crate::ai::{first_max_by_key, AggressivePolicy, CombatAction, DecisionContext, TacticalPolicy};
use crate::grid::GridPos;
use crate::terrain::TerrainKind;
use crate::units::AiBehavior;

/// Score base from which the enemy's defense is subtracted.
const FLANK_BASE_SCORE: i32 = 100;

fn flank_terrain_bonus(kind: TerrainKind) -> i32 {
    match kind {
        TerrainKind::Fortress => 6,
        TerrainKind::Forest => 4,
        _ => 0,
    }
}

/// Attacks from any reachable tile beside an enemy except the one north of
/// it, which is treated as the enemy's front. Falls back to
/// [`AggressivePolicy`] when no flank is open.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlankerPolicy {
    fallback: AggressivePolicy,
}

impl TacticalPolicy for FlankerPolicy {
    fn behavior(&self) -> AiBehavior {
        AiBehavior::Flanker
    }

    fn decide(&self, ctx: &DecisionContext<'_>) -> CombatAction {
        let reachable: BTreeSet<GridPos> = ctx.reachable_tiles().into_iter().collect();
        let reachable = &reachable;

        let candidates = ctx.living_enemies().flat_map(move |(enemy, enemy_pos)| {
            ctx.grid
                .adjacent_positions(enemy_pos)
                .into_iter()
                .filter(move |tile| *tile != enemy_pos.north() && reachable.contains(tile))
                .map(move |tile| (enemy, tile))
        });

        let best = first_max_by_key(candidates, |(enemy, tile)| {
            let terrain = ctx.grid.tile(*tile).map_or(0, |t| flank_terrain_bonus(t.kind));
            (
                FLANK_BASE_SCORE - enemy.stats.defense + terrain,
                Reverse(ctx.distance_from_origin(*tile)),
            )
        });

        match best {
            Some((enemy, tile)) => CombatAction::Attack {
                unit_id: ctx.unit.id.clone(),
                target_unit_id: enemy.id.clone(),
                target_position: tile,
            },
            None => self.fallback.decide(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileGrid;
    use crate::units::{ClassTag, CombatantSnapshot, Stats, Team};

    fn rogue(x: i32, y: i32, movement: i32) -> CombatantSnapshot {
        CombatantSnapshot::new(
            "rogue",
            ClassTag::Thief,
            20,
            Stats {
                strength: 6,
                movement,
                ..Stats::default()
            },
        )
        .with_behavior(AiBehavior::Flanker)
        .at(x, y)
    }

    fn enemy(id: &str, defense: i32, x: i32, y: i32) -> CombatantSnapshot {
        CombatantSnapshot::new(
            id,
            ClassTag::Knight,
            30,
            Stats {
                defense,
                ..Stats::default()
            },
        )
        .with_team(Team::Enemy)
        .at(x, y)
    }

    fn decide(unit: &CombatantSnapshot, enemies: &[CombatantSnapshot], grid: &TileGrid) -> CombatAction {
        let ctx = DecisionContext::new(unit, &[], enemies, grid).unwrap();
        FlankerPolicy::default().decide(&ctx)
    }

    #[test]
    fn test_never_attacks_from_north() {
        let grid = TileGrid::new(5, 5);
        // Only the north tile of the enemy is reachable with one move.
        let me = rogue(2, 0, 1);
        let enemies = vec![enemy("e", 5, 2, 2)];
        let action = decide(&me, &enemies, &grid);
        // Falls back to aggressive, which may use the north tile.
        assert_eq!(
            action,
            CombatAction::Attack {
                unit_id: "rogue".into(),
                target_unit_id: "e".into(),
                target_position: GridPos::new(2, 1),
            }
        );

        let mut wide = me.clone();
        wide.stats.movement = 3;
        let action = decide(&wide, &enemies, &grid);
        assert_ne!(action.destination(), Some(GridPos::new(2, 1)));
        assert_eq!(action.target_unit_id(), Some("e"));
    }

    #[test]
    fn test_prefers_low_defense_and_cover() {
        let grid = TileGrid::parse(&[".......", ".......", "...F...", "......."]).unwrap();
        let me = rogue(3, 0, 6);
        let enemies = vec![enemy("armored", 12, 1, 2), enemy("soft", 3, 4, 2)];
        let action = decide(&me, &enemies, &grid);
        assert_eq!(
            action,
            CombatAction::Attack {
                unit_id: "rogue".into(),
                target_unit_id: "soft".into(),
                target_position: GridPos::new(3, 2),
            }
        );
    }

    #[test]
    fn test_no_enemies_falls_back_to_wait() {
        let grid = TileGrid::new(3, 3);
        let me = rogue(1, 1, 3);
        assert_eq!(decide(&me, &[], &grid), CombatAction::wait_at("rogue", GridPos::new(1, 1)));
    }
}
