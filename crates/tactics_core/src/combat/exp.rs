//! Experience awarded for an exchange.

use crate::config::CombatRules;
use crate::math::floor_div;
use crate::units::CombatantSnapshot;

/// Experience for `attacker` after dealing `damage_dealt` to `defender`.
///
/// The base award is `(defender.level - attacker.level + 10) * 3` and can be
/// negative when the attacker far outlevels the defender. A kill adds
/// `rules.kill_exp_bonus`; otherwise the base is scaled by the share of the
/// defender's max HP that was dealt. Any damage or a kill guarantees at least
/// 1 exp; the award never exceeds `rules.max_exp`, even when that cap is
/// below the guaranteed minimum.
#[must_use]
pub fn calculate_exp_gain(
    attacker: &CombatantSnapshot,
    defender: &CombatantSnapshot,
    damage_dealt: i32,
    killed: bool,
    rules: &CombatRules,
) -> i32 {
    let base = (defender.level - attacker.level + 10) * 3;

    let exp = if killed {
        base + rules.kill_exp_bonus
    } else if damage_dealt > 0 {
        floor_div(base * damage_dealt, defender.max_hp.max(1))
    } else {
        0
    };

    let floor = if damage_dealt > 0 || killed { 1 } else { 0 };
    exp.max(floor).min(rules.max_exp)
}
