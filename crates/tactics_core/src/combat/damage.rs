//! Damage calculation.

use crate::combat::triangle::matchup_bonus;
use crate::config::CombatRules;
use crate::math::scale_percent_floor;
use crate::terrain::TerrainView;
use crate::units::CombatantSnapshot;
use crate::weapons::WeaponView;

/// Might after effectiveness and forging.
///
/// Effectiveness multiplies the base might only; the forge bonus is added
/// afterwards in both cases.
#[must_use]
pub fn effective_might(weapon: &WeaponView, defender: &CombatantSnapshot, rules: &CombatRules) -> i32 {
    let base = if weapon.is_effective_against(defender.movement_type) {
        weapon.might * rules.effective_multiplier
    } else {
        weapon.might
    };
    base + weapon.forge.might
}

/// Calculate damage for one strike.
///
/// # Formula
///
/// ```text
/// attack  = (magical ? magic : strength) + effective_might + triangle_damage
/// defense = (magical ? resistance : defense) + terrain.defense_bonus
/// damage  = max(attack - defense, 0)
/// ```
///
/// `distance` does not change the result.
#[must_use]
pub fn calculate_damage(
    attacker: &CombatantSnapshot,
    defender: &CombatantSnapshot,
    attacker_weapon: &WeaponView,
    defender_weapon: Option<&WeaponView>,
    terrain: &TerrainView,
    _distance: u32,
    rules: &CombatRules,
) -> i32 {
    let (attack_stat, defense_stat) = if attacker_weapon.is_magical() {
        (attacker.stats.magic, defender.stats.resistance)
    } else {
        (attacker.stats.strength, defender.stats.defense)
    };

    let might = effective_might(attacker_weapon, defender, rules);
    let triangle = matchup_bonus(attacker_weapon, defender_weapon, rules).damage_bonus;

    let damage = attack_stat + might + triangle - defense_stat - terrain.defense_bonus;
    damage.max(0)
}

/// Calculate damage including height advantage.
///
/// The defender's terrain supplies the defense bonus. Striking from a
/// strictly higher tile multiplies the result by
/// `rules.height_damage_percent` (115%) and floors it.
#[must_use]
pub fn calculate_damage_with_height(
    attacker: &CombatantSnapshot,
    defender: &CombatantSnapshot,
    attacker_weapon: &WeaponView,
    defender_weapon: Option<&WeaponView>,
    attacker_terrain: &TerrainView,
    defender_terrain: &TerrainView,
    distance: u32,
    rules: &CombatRules,
) -> i32 {
    let damage = calculate_damage(
        attacker,
        defender,
        attacker_weapon,
        defender_weapon,
        defender_terrain,
        distance,
        rules,
    );

    if attacker_terrain.height_level > defender_terrain.height_level {
        scale_percent_floor(damage, rules.height_damage_percent)
    } else {
        damage
    }
}

/// Damage of a critical hit.
#[must_use]
pub const fn apply_critical(damage: i32, rules: &CombatRules) -> i32 {
    damage * rules.critical_multiplier
}
