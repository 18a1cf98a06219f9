//! Boss behavior: hold the throne until badly hurt.

use crate::ai::threat::estimate_damage;
use crate::ai::{first_max_by_key, AggressivePolicy, CombatAction, DecisionContext, TacticalPolicy};
use crate::units::{AiBehavior, CombatantSnapshot};

/// Whether a boss has dropped below a quarter of its max HP.
#[must_use]
pub fn is_desperate(unit: &CombatantSnapshot) -> bool {
    unit.current_hp * 4 < unit.max_hp
}

/// Never moves while healthy: attacks whatever already stands in reach,
/// otherwise waits. Below a quarter HP it turns into [`AggressivePolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BossPolicy {
    fallback: AggressivePolicy,
}

impl TacticalPolicy for BossPolicy {
    fn behavior(&self) -> AiBehavior {
        AiBehavior::Boss
    }

    fn decide(&self, ctx: &DecisionContext<'_>) -> CombatAction {
        if is_desperate(ctx.unit) {
            return self.fallback.decide(ctx);
        }

        let in_reach = ctx.current_attack_tiles();
        let target = first_max_by_key(
            ctx.living_enemies().filter(|(_, pos)| in_reach.contains(pos)),
            |(enemy, _)| estimate_damage(ctx.unit, enemy),
        );

        match target {
            Some((enemy, _)) => CombatAction::Attack {
                unit_id: ctx.unit.id.clone(),
                target_unit_id: enemy.id.clone(),
                target_position: ctx.origin,
            },
            None => ctx.wait_in_place(),
        }
    }
}
