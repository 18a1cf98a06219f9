//! Hit and critical rate calculation.

use crate::config::CombatRules;
use crate::terrain::TerrainView;
use crate::units::CombatantSnapshot;
use crate::weapons::WeaponView;

/// Lowest displayed rate.
pub const MIN_RATE: i32 = 0;

/// Highest displayed rate.
pub const MAX_RATE: i32 = 100;

/// Chance to hit, in percent.
///
/// ```text
/// accuracy = skill * 2 + luck + weapon.hit + forge.hit + triangle_hit_bonus
/// avoid    = defender.speed * 2 + defender.luck + defender_terrain.evasion
/// support  = (attacker_allies - defender_allies) * support_bonus
/// ```
///
/// Attacking from a higher tile adds `rules.height_hit_bonus`, from a lower
/// tile subtracts it. Without an attacker terrain no height modifier
/// applies. The result is clamped to `0..=100`.
#[must_use]
pub fn calculate_hit_rate(
    attacker: &CombatantSnapshot,
    defender: &CombatantSnapshot,
    attacker_weapon: &WeaponView,
    defender_terrain: &TerrainView,
    attacker_adjacent_allies: i32,
    triangle_hit_bonus: i32,
    attacker_terrain: Option<&TerrainView>,
    defender_adjacent_allies: i32,
    rules: &CombatRules,
) -> i32 {
    let accuracy = attacker.stats.skill * 2
        + attacker.stats.luck
        + attacker_weapon.hit
        + attacker_weapon.forge.hit
        + triangle_hit_bonus;
    let avoid = defender.stats.speed * 2 + defender.stats.luck + defender_terrain.evasion_bonus;
    let support = (attacker_adjacent_allies - defender_adjacent_allies) * rules.support_bonus;

    let height = match attacker_terrain {
        Some(terrain) if terrain.height_level > defender_terrain.height_level => rules.height_hit_bonus,
        Some(terrain) if terrain.height_level < defender_terrain.height_level => -rules.height_hit_bonus,
        _ => 0,
    };

    (accuracy - avoid + support + height).clamp(MIN_RATE, MAX_RATE)
}

/// Chance to land a critical hit, in percent.
///
/// `skill / 2` (floored) plus weapon and forge crit plus the class bonus,
/// minus the defender's luck, clamped to `0..=100`.
#[must_use]
pub fn calculate_crit_rate(
    attacker: &CombatantSnapshot,
    defender: &CombatantSnapshot,
    attacker_weapon: &WeaponView,
) -> i32 {
    let rate = attacker.stats.skill.div_euclid(2)
        + attacker_weapon.crit
        + attacker_weapon.forge.crit
        + attacker.class.crit_bonus()
        - defender.stats.luck;
    rate.clamp(MIN_RATE, MAX_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainKind;
    use crate::units::{ClassTag, Stats};
    use crate::weapons::WeaponCategory;

    fn unit(class: ClassTag, skill: i32, speed: i32, luck: i32) -> CombatantSnapshot {
        CombatantSnapshot::new(
            "unit",
            class,
            30,
            Stats {
                skill,
                speed,
                luck,
                ..Stats::default()
            },
        )
    }

    fn weapon(hit: i32, crit: i32) -> WeaponView {
        WeaponView::new("weapon", WeaponCategory::Sword, 5, hit, crit)
    }

    #[test]
    fn test_hit_rate_formula() {
        let rules = CombatRules::default();
        let attacker = unit(ClassTag::Mercenary, 10, 0, 5);
        let defender = unit(ClassTag::Fighter, 0, 8, 4);
        // 20 + 5 + 70 - (16 + 4)
        let hit = calculate_hit_rate(&attacker, &defender, &weapon(70, 0), &TerrainView::plain(), 0, 0, None, 0, &rules);
        assert_eq!(hit, 75);
    }

    #[test]
    fn test_hit_rate_terrain_and_support() {
        let rules = CombatRules::default();
        let attacker = unit(ClassTag::Mercenary, 10, 0, 5);
        let defender = unit(ClassTag::Fighter, 0, 8, 4);
        let forest = TerrainKind::Forest.view();
        let base = calculate_hit_rate(&attacker, &defender, &weapon(70, 0), &forest, 0, 0, None, 0, &rules);
        assert_eq!(base, 55);

        let supported = calculate_hit_rate(&attacker, &defender, &weapon(70, 0), &forest, 2, 0, None, 1, &rules);
        assert_eq!(supported, 65);
    }

    #[test]
    fn test_hit_rate_height_modifier() {
        let rules = CombatRules::default();
        let attacker = unit(ClassTag::Mercenary, 10, 0, 5);
        let defender = unit(ClassTag::Fighter, 0, 8, 4);
        let low = TerrainView::plain();
        let high = TerrainView::plain().with_height(2);

        let flat = calculate_hit_rate(&attacker, &defender, &weapon(70, 0), &low, 0, 0, Some(&low), 0, &rules);
        let above = calculate_hit_rate(&attacker, &defender, &weapon(70, 0), &low, 0, 0, Some(&high), 0, &rules);
        let below = calculate_hit_rate(&attacker, &defender, &weapon(70, 0), &high, 0, 0, Some(&low), 0, &rules);

        assert_eq!(above, flat + 15);
        assert_eq!(below, flat - 15);
    }

    #[test]
    fn test_hit_rate_clamped() {
        let rules = CombatRules::default();
        let sharp = unit(ClassTag::Sniper, 40, 0, 30);
        let dodgy = unit(ClassTag::Myrmidon, 0, 40, 30);
        let plain = TerrainView::plain();
        assert_eq!(calculate_hit_rate(&sharp, &dodgy, &weapon(100, 0), &plain, 0, 15, None, 0, &rules), 100);
        assert_eq!(calculate_hit_rate(&dodgy, &sharp, &weapon(0, 0), &plain, 0, -15, None, 3, &rules), 0);
    }

    #[test]
    fn test_crit_rate_example() {
        let attacker = unit(ClassTag::Mercenary, 16, 0, 0);
        let defender = unit(ClassTag::Fighter, 0, 0, 4);
        assert_eq!(calculate_crit_rate(&attacker, &defender, &weapon(80, 5)), 9);
    }

    #[test]
    fn test_crit_rate_class_bonus_and_forge() {
        let attacker = unit(ClassTag::Assassin, 11, 0, 0);
        let defender = unit(ClassTag::Fighter, 0, 0, 0);
        let forged = weapon(80, 5).with_forge(0, 0, 10);
        // 5 + 5 + 10 + 15
        assert_eq!(calculate_crit_rate(&attacker, &defender, &forged), 35);
    }

    #[test]
    fn test_crit_rate_clamped() {
        let attacker = unit(ClassTag::Mercenary, 0, 0, 0);
        let lucky = unit(ClassTag::Fighter, 0, 0, 30);
        assert_eq!(calculate_crit_rate(&attacker, &lucky, &weapon(80, 0)), 0);

        let killer = unit(ClassTag::Assassin, 60, 0, 0);
        assert_eq!(calculate_crit_rate(&killer, &lucky, &weapon(80, 100)), 100);
    }
}
