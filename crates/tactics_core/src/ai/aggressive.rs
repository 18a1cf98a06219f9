//! Aggressive behavior: close in and hit the best target.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use crate::ai::threat::kill_score;
use crate::ai::{first_max_by_key, CombatAction, DecisionContext, TacticalPolicy};
use crate::grid::GridPos;
use crate::units::AiBehavior;

/// Attack the enemy with the best kill score among those reachable this
/// turn, otherwise advance on the closest enemy.
///
/// Targets are ranked by estimated damage, doubled for a kill, breaking
/// ties by distance from the unit. The attack tile is the reachable tile
/// next to the target that is closest to the target, then to the start.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggressivePolicy;

impl TacticalPolicy for AggressivePolicy {
    fn behavior(&self) -> AiBehavior {
        AiBehavior::Aggressive
    }

    fn decide(&self, ctx: &DecisionContext<'_>) -> CombatAction {
        let reachable = ctx.reachable_tiles();
        let attackable: BTreeSet<GridPos> = ctx.grid.attack_range(&reachable, 1, 1).into_iter().collect();

        let target = first_max_by_key(
            ctx.living_enemies().filter(|(_, pos)| attackable.contains(pos)),
            |(enemy, pos)| (kill_score(ctx.unit, enemy), Reverse(ctx.distance_from_origin(*pos))),
        );

        if let Some((enemy, enemy_pos)) = target {
            let tile = reachable
                .iter()
                .copied()
                .filter(|tile| ctx.grid.distance(*tile, enemy_pos) == 1)
                .min_by_key(|tile| (ctx.grid.distance(*tile, enemy_pos), ctx.distance_from_origin(*tile), *tile));
            if let Some(tile) = tile {
                return CombatAction::Attack {
                    unit_id: ctx.unit.id.clone(),
                    target_unit_id: enemy.id.clone(),
                    target_position: tile,
                };
            }
        }

        let closest = ctx
            .living_enemies()
            .min_by_key(|(_, pos)| ctx.distance_from_origin(*pos));

        match closest {
            Some((_, enemy_pos)) => {
                let tile = reachable
                    .iter()
                    .copied()
                    .min_by_key(|tile| (ctx.grid.distance(*tile, enemy_pos), ctx.distance_from_origin(*tile), *tile))
                    .unwrap_or(ctx.origin);
                CombatAction::wait_at(ctx.unit.id.clone(), tile)
            }
            None => ctx.wait_in_place(),
        }
    }
}
