//! Defensive behavior: hold ground, answer threats, seek cover.

use std::cmp::Reverse;

use crate::ai::threat::estimate_damage;
use crate::ai::{first_max_by_key, CombatAction, DecisionContext, TacticalPolicy};
use crate::grid::GridPos;
use crate::terrain::{TerrainKind, TerrainView};
use crate::units::AiBehavior;

/// How far a defensive unit will look for better cover.
pub const COVER_SEARCH_RADIUS: u32 = 3;

/// Terrain value for a defensive unit standing on `terrain`.
#[must_use]
pub fn cover_score(terrain: &TerrainView) -> i32 {
    let bonus = match terrain.kind {
        TerrainKind::Fortress => 5,
        TerrainKind::Forest => 3,
        _ => 0,
    };
    terrain.cover() + bonus
}

/// Never moves to start a fight. Strikes back at the most dangerous enemy
/// already in reach, otherwise shifts to the best cover nearby.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefensivePolicy;

impl TacticalPolicy for DefensivePolicy {
    fn behavior(&self) -> AiBehavior {
        AiBehavior::Defensive
    }

    fn decide(&self, ctx: &DecisionContext<'_>) -> CombatAction {
        let in_reach = ctx.current_attack_tiles();
        let threat = first_max_by_key(
            ctx.living_enemies().filter(|(_, pos)| in_reach.contains(pos)),
            |(enemy, _)| (estimate_damage(enemy, ctx.unit), Reverse(enemy.current_hp)),
        );

        if let Some((enemy, _)) = threat {
            return CombatAction::Attack {
                unit_id: ctx.unit.id.clone(),
                target_unit_id: enemy.id.clone(),
                target_position: ctx.origin,
            };
        }

        let score_at = |pos: GridPos| ctx.grid.tile(pos).map_or(i32::MIN, cover_score);
        let current = score_at(ctx.origin);

        let best = first_max_by_key(
            ctx.reachable_tiles()
                .into_iter()
                .filter(|tile| ctx.distance_from_origin(*tile) <= COVER_SEARCH_RADIUS),
            |tile| (score_at(*tile), Reverse(ctx.distance_from_origin(*tile))),
        );

        match best {
            Some(tile) if score_at(tile) > current => CombatAction::wait_at(ctx.unit.id.clone(), tile),
            _ => ctx.wait_in_place(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileGrid;
    use crate::units::{ClassTag, CombatantSnapshot, Stats, Team};
    use crate::weapons::{WeaponCategory, WeaponView};

    fn guard(x: i32, y: i32) -> CombatantSnapshot {
        CombatantSnapshot::new(
            "guard",
            ClassTag::Knight,
            30,
            Stats {
                strength: 8,
                defense: 6,
                movement: 4,
                ..Stats::default()
            },
        )
        .with_behavior(AiBehavior::Defensive)
        .at(x, y)
    }

    fn raider(id: &str, strength: i32, hp: i32, x: i32, y: i32) -> CombatantSnapshot {
        CombatantSnapshot::new(
            id,
            ClassTag::Fighter,
            30,
            Stats {
                strength,
                movement: 5,
                ..Stats::default()
            },
        )
        .with_team(Team::Enemy)
        .with_hp(hp)
        .at(x, y)
    }

    fn decide(unit: &CombatantSnapshot, enemies: &[CombatantSnapshot], grid: &TileGrid) -> CombatAction {
        let ctx = DecisionContext::new(unit, &[], enemies, grid).unwrap();
        DefensivePolicy.decide(&ctx)
    }

    #[test]
    fn test_cover_score_bonuses() {
        assert_eq!(cover_score(&TerrainKind::Fortress.view()), 27);
        assert_eq!(cover_score(&TerrainKind::Forest.view()), 24);
        assert_eq!(cover_score(&TerrainKind::Hill.view()), 11);
        assert_eq!(cover_score(&TerrainView::plain()), 0);
    }

    #[test]
    fn test_counters_biggest_threat_without_moving() {
        let grid = TileGrid::new(5, 5);
        let me = guard(2, 2);
        let enemies = vec![
            raider("weak", 4, 30, 2, 1),
            raider("strong", 12, 30, 3, 2),
            raider("far", 30, 30, 4, 4),
        ];
        let action = decide(&me, &enemies, &grid);
        assert_eq!(
            action,
            CombatAction::Attack {
                unit_id: "guard".into(),
                target_unit_id: "strong".into(),
                target_position: GridPos::new(2, 2),
            }
        );
    }

    #[test]
    fn test_reach_follows_equipped_weapon() {
        let grid = TileGrid::new(5, 5);
        let enemies = vec![raider("thrower", 8, 30, 2, 4)];

        let bare = guard(2, 2);
        assert_eq!(decide(&bare, &enemies, &grid), CombatAction::wait_at("guard", GridPos::new(2, 2)));

        let javelin = WeaponView::new("javelin", WeaponCategory::Lance, 6, 65, 0).with_range(1, 2);
        let armed = guard(2, 2).with_weapon(javelin);
        assert_eq!(decide(&armed, &enemies, &grid).target_unit_id(), Some("thrower"));
    }

    #[test]
    fn test_threat_tie_prefers_lowest_hp() {
        let grid = TileGrid::new(5, 5);
        let me = guard(2, 2);
        let enemies = vec![raider("healthy", 10, 30, 2, 1), raider("wounded", 10, 12, 1, 2)];
        assert_eq!(decide(&me, &enemies, &grid).target_unit_id(), Some("wounded"));
    }

    #[test]
    fn test_moves_to_cover_within_radius() {
        let grid = TileGrid::parse(&["......", "...T..", "......"]).unwrap();
        let me = guard(0, 1);
        let enemies = vec![raider("e", 5, 30, 5, 2)];
        assert_eq!(decide(&me, &enemies, &grid), CombatAction::wait_at("guard", GridPos::new(3, 1)));
    }

    #[test]
    fn test_ignores_cover_beyond_radius() {
        let grid = TileGrid::parse(&[".....T"]).unwrap();
        let mut me = guard(0, 0);
        me.stats.movement = 10;
        assert_eq!(decide(&me, &[], &grid), CombatAction::wait_at("guard", GridPos::new(0, 0)));
    }

    #[test]
    fn test_stays_when_already_best() {
        let grid = TileGrid::parse(&["F.F", "..."]).unwrap();
        let me = guard(0, 0);
        assert_eq!(decide(&me, &[], &grid), CombatAction::wait_at("guard", GridPos::new(0, 0)));
    }
}
