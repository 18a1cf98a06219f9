//! Test fixtures and helpers.
//!
//! Pre-built units, weapons and maps for consistent testing.

use tactics_core::config::CombatRules;
use tactics_core::grid::TileGrid;
use tactics_core::units::{ClassTag, CombatantSnapshot, Stats, Team};
use tactics_core::weapons::{Element, WeaponCategory, WeaponView};

/// Stat block with every stat at `value`.
#[must_use]
pub fn flat_stats(value: i32) -> Stats {
    Stats {
        strength: value,
        magic: value,
        skill: value,
        speed: value,
        luck: value,
        defense: value,
        resistance: value,
        movement: 5,
    }
}

/// A mid-level sword fighter with 30 HP.
#[must_use]
pub fn swordsman(id: &str) -> CombatantSnapshot {
    CombatantSnapshot::new(
        id,
        ClassTag::Mercenary,
        30,
        Stats {
            strength: 10,
            magic: 0,
            skill: 12,
            speed: 10,
            luck: 5,
            defense: 6,
            resistance: 1,
            movement: 5,
        },
    )
    .with_weapon(iron_sword())
}

/// A slow, hard-hitting axe fighter with 34 HP.
#[must_use]
pub fn axeman(id: &str) -> CombatantSnapshot {
    CombatantSnapshot::new(
        id,
        ClassTag::Fighter,
        34,
        Stats {
            strength: 13,
            magic: 0,
            skill: 7,
            speed: 6,
            luck: 2,
            defense: 5,
            resistance: 0,
            movement: 5,
        },
    )
    .with_team(Team::Enemy)
    .with_weapon(iron_axe())
}

/// A staff healer with a heal skill.
#[must_use]
pub fn cleric(id: &str) -> CombatantSnapshot {
    CombatantSnapshot::new(
        id,
        ClassTag::Cleric,
        20,
        Stats {
            strength: 1,
            magic: 7,
            skill: 5,
            speed: 8,
            luck: 9,
            defense: 2,
            resistance: 7,
            movement: 5,
        },
    )
    .with_skill("heal")
    .with_weapon(heal_staff())
}

/// Iron sword: 5 might, 90 hit.
#[must_use]
pub fn iron_sword() -> WeaponView {
    WeaponView::new("iron_sword", WeaponCategory::Sword, 5, 90, 0)
}

/// Iron lance: 7 might, 80 hit.
#[must_use]
pub fn iron_lance() -> WeaponView {
    WeaponView::new("iron_lance", WeaponCategory::Lance, 7, 80, 0)
}

/// Iron axe: 8 might, 75 hit.
#[must_use]
pub fn iron_axe() -> WeaponView {
    WeaponView::new("iron_axe", WeaponCategory::Axe, 8, 75, 0)
}

/// Fire tome: 5 might, 90 hit, range 1-2.
#[must_use]
pub fn fire_tome() -> WeaponView {
    WeaponView::new("fire", WeaponCategory::Tome, 5, 90, 0)
        .with_element(Element::Fire)
        .with_range(1, 2)
}

/// Healing staff.
#[must_use]
pub fn heal_staff() -> WeaponView {
    WeaponView::new("heal_staff", WeaponCategory::Staff, 0, 100, 0)
}

/// Open square map.
#[must_use]
pub fn open_field(width: u32, height: u32) -> TileGrid {
    TileGrid::new(width, height)
}

/// Rules parsed from a RON snippet.
///
/// # Panics
///
/// Panics if the snippet does not parse; fixtures are test-only.
#[must_use]
pub fn rules_from_ron(ron: &str) -> CombatRules {
    match CombatRules::from_ron_str(ron) {
        Ok(rules) => rules,
        Err(err) => panic!("invalid fixture rules: {err}"),
    }
}

/// Raw RON for the rules fixture used by config-loading tests.
pub const SAMPLE_RULES_RON: &str = "CombatRules(triangle_hit_bonus: 20, double_threshold: 4)";
