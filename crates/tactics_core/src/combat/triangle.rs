//! Weapon and magic triangle advantage.
//!
//! Physical: Sword beats Axe, Axe beats Lance, Lance beats Sword.
//! Magic: Fire beats Wind, Wind beats Thunder, Thunder beats Fire, and
//! Light and Dark each hold advantage over the other.

use std::ops::Neg;

use serde::{Deserialize, Serialize};

use crate::config::CombatRules;
use crate::weapons::{Element, WeaponCategory, WeaponView};

/// Hit and damage modifiers from a triangle matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TriangleBonus {
    /// Added to hit rate.
    pub hit_bonus: i32,
    /// Added to damage.
    pub damage_bonus: i32,
}

impl TriangleBonus {
    /// No advantage either way.
    pub const NEUTRAL: Self = Self {
        hit_bonus: 0,
        damage_bonus: 0,
    };

    /// The advantage tuple under `rules`.
    #[must_use]
    pub const fn advantage(rules: &CombatRules) -> Self {
        Self {
            hit_bonus: rules.triangle_hit_bonus,
            damage_bonus: rules.triangle_damage_bonus,
        }
    }

    /// The disadvantage tuple under `rules`.
    #[must_use]
    pub const fn disadvantage(rules: &CombatRules) -> Self {
        Self {
            hit_bonus: -rules.triangle_hit_bonus,
            damage_bonus: -rules.triangle_damage_bonus,
        }
    }
}

impl Neg for TriangleBonus {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            hit_bonus: -self.hit_bonus,
            damage_bonus: -self.damage_bonus,
        }
    }
}

/// Whether `attacker` beats `defender` in the physical triangle.
const fn weapon_beats(attacker: WeaponCategory, defender: WeaponCategory) -> bool {
    matches!(
        (attacker, defender),
        (WeaponCategory::Sword, WeaponCategory::Axe)
            | (WeaponCategory::Axe, WeaponCategory::Lance)
            | (WeaponCategory::Lance, WeaponCategory::Sword)
    )
}

/// Whether `attacker` beats `defender` in the elemental cycle.
const fn element_beats(attacker: Element, defender: Element) -> bool {
    matches!(
        (attacker, defender),
        (Element::Fire, Element::Wind)
            | (Element::Wind, Element::Thunder)
            | (Element::Thunder, Element::Fire)
            | (Element::Light, Element::Dark)
            | (Element::Dark, Element::Light)
    )
}

/// Physical triangle bonus for `attacker` striking `defender`.
///
/// Bows, tomes, staves and mirror matchups are neutral.
#[must_use]
pub fn weapon_triangle_bonus(
    attacker: WeaponCategory,
    defender: WeaponCategory,
    rules: &CombatRules,
) -> TriangleBonus {
    if weapon_beats(attacker, defender) {
        TriangleBonus::advantage(rules)
    } else if weapon_beats(defender, attacker) {
        TriangleBonus::disadvantage(rules)
    } else {
        TriangleBonus::NEUTRAL
    }
}

/// Magic triangle bonus for `attacker` casting at `defender`.
///
/// Light against Dark and Dark against Light both return the advantage
/// tuple, so that pairing is not antisymmetric.
#[must_use]
pub fn magic_triangle_bonus(attacker: Element, defender: Element, rules: &CombatRules) -> TriangleBonus {
    if element_beats(attacker, defender) {
        TriangleBonus::advantage(rules)
    } else if element_beats(defender, attacker) {
        TriangleBonus::disadvantage(rules)
    } else {
        TriangleBonus::NEUTRAL
    }
}

/// Triangle bonus for a full weapon matchup.
///
/// Applies only when both sides use the same kind of weapon: both physical
/// (weapon triangle), or both magical with elements (magic triangle).
/// An unarmed defender or mixed kinds are neutral.
#[must_use]
pub fn matchup_bonus(
    attacker_weapon: &WeaponView,
    defender_weapon: Option<&WeaponView>,
    rules: &CombatRules,
) -> TriangleBonus {
    let Some(defender_weapon) = defender_weapon else {
        return TriangleBonus::NEUTRAL;
    };
    match (attacker_weapon.is_magical(), defender_weapon.is_magical()) {
        (false, false) => {
            weapon_triangle_bonus(attacker_weapon.category, defender_weapon.category, rules)
        }
        (true, true) => match (attacker_weapon.element, defender_weapon.element) {
            (Some(attacker), Some(defender)) => magic_triangle_bonus(attacker, defender, rules),
            _ => TriangleBonus::NEUTRAL,
        },
        _ => TriangleBonus::NEUTRAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CATEGORIES: [WeaponCategory; 6] = [
        WeaponCategory::Sword,
        WeaponCategory::Lance,
        WeaponCategory::Axe,
        WeaponCategory::Bow,
        WeaponCategory::Tome,
        WeaponCategory::Staff,
    ];

    #[test]
    fn test_sword_beats_axe() {
        let rules = CombatRules::default();
        let bonus = weapon_triangle_bonus(WeaponCategory::Sword, WeaponCategory::Axe, &rules);
        assert_eq!(bonus.damage_bonus, 1);
        assert_eq!(bonus.hit_bonus, rules.triangle_hit_bonus);
        assert!(bonus.hit_bonus > 0);
    }

    #[test]
    fn test_full_cycle() {
        let rules = CombatRules::default();
        let adv = TriangleBonus::advantage(&rules);
        assert_eq!(weapon_triangle_bonus(WeaponCategory::Axe, WeaponCategory::Lance, &rules), adv);
        assert_eq!(weapon_triangle_bonus(WeaponCategory::Lance, WeaponCategory::Sword, &rules), adv);
        assert_eq!(weapon_triangle_bonus(WeaponCategory::Axe, WeaponCategory::Sword, &rules), -adv);
    }

    #[test]
    fn test_weapon_triangle_antisymmetric() {
        let rules = CombatRules::default();
        for a in ALL_CATEGORIES {
            for b in ALL_CATEGORIES {
                let forward = weapon_triangle_bonus(a, b, &rules);
                let backward = weapon_triangle_bonus(b, a, &rules);
                assert_eq!(forward, -backward, "{a:?} vs {b:?}");
            }
            assert_eq!(weapon_triangle_bonus(a, a, &rules), TriangleBonus::NEUTRAL);
        }
    }

    #[test]
    fn test_neutral_categories() {
        let rules = CombatRules::default();
        for other in ALL_CATEGORIES {
            assert_eq!(weapon_triangle_bonus(WeaponCategory::Bow, other, &rules), TriangleBonus::NEUTRAL);
            assert_eq!(weapon_triangle_bonus(WeaponCategory::Staff, other, &rules), TriangleBonus::NEUTRAL);
        }
    }

    #[test]
    fn test_magic_cycle() {
        let rules = CombatRules::default();
        let adv = TriangleBonus::advantage(&rules);
        assert_eq!(magic_triangle_bonus(Element::Fire, Element::Wind, &rules), adv);
        assert_eq!(magic_triangle_bonus(Element::Wind, Element::Thunder, &rules), adv);
        assert_eq!(magic_triangle_bonus(Element::Thunder, Element::Fire, &rules), adv);
        assert_eq!(magic_triangle_bonus(Element::Wind, Element::Fire, &rules), -adv);
    }

    #[test]
    fn test_light_dark_mutual_advantage() {
        let rules = CombatRules::default();
        let adv = TriangleBonus::advantage(&rules);
        assert_eq!(magic_triangle_bonus(Element::Light, Element::Dark, &rules), adv);
        assert_eq!(magic_triangle_bonus(Element::Dark, Element::Light, &rules), adv);
    }

    #[test]
    fn test_magic_neutral_pairs() {
        let rules = CombatRules::default();
        assert_eq!(magic_triangle_bonus(Element::Fire, Element::Fire, &rules), TriangleBonus::NEUTRAL);
        assert_eq!(magic_triangle_bonus(Element::Dark, Element::Fire, &rules), TriangleBonus::NEUTRAL);
        assert_eq!(magic_triangle_bonus(Element::Thunder, Element::Light, &rules), TriangleBonus::NEUTRAL);
    }

    #[test]
    fn test_matchup_requires_same_kind() {
        let rules = CombatRules::default();
        let sword = WeaponView::new("sword", WeaponCategory::Sword, 5, 90, 0);
        let axe = WeaponView::new("axe", WeaponCategory::Axe, 8, 75, 0);
        let fire = WeaponView::new("fire", WeaponCategory::Tome, 5, 90, 0).with_element(Element::Fire);
        let wind = WeaponView::new("wind", WeaponCategory::Tome, 4, 95, 0).with_element(Element::Wind);

        assert_eq!(matchup_bonus(&sword, Some(&axe), &rules).damage_bonus, 1);
        assert_eq!(matchup_bonus(&fire, Some(&wind), &rules).damage_bonus, 1);
        assert_eq!(matchup_bonus(&sword, Some(&fire), &rules), TriangleBonus::NEUTRAL);
        assert_eq!(matchup_bonus(&sword, None, &rules), TriangleBonus::NEUTRAL);

        let staff = WeaponView::new("heal", WeaponCategory::Staff, 0, 100, 0);
        assert_eq!(matchup_bonus(&fire, Some(&staff), &rules), TriangleBonus::NEUTRAL);
    }
}
