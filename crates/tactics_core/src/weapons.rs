//! Weapon data consumed by the combat calculators.

use serde::{Deserialize, Serialize};

use crate::units::MovementType;

/// Weapon category.
///
/// Swords, lances and axes form the physical weapon triangle. Bows are
/// physical but outside the triangle. Tomes and staves are magical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponCategory {
    /// Beats axes, loses to lances.
    Sword,
    /// Beats swords, loses to axes.
    Lance,
    /// Beats lances, loses to swords.
    Axe,
    /// Physical, ranged, no triangle.
    Bow,
    /// Offensive magic. Element decides magic triangle matchups.
    Tome,
    /// Healing and utility magic.
    Staff,
}

impl WeaponCategory {
    /// Tomes and staves use magic against resistance.
    #[must_use]
    pub const fn is_magical(self) -> bool {
        matches!(self, WeaponCategory::Tome | WeaponCategory::Staff)
    }
}

/// Element of a magical weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    /// Beats wind.
    Fire,
    /// Beats thunder.
    Wind,
    /// Beats fire.
    Thunder,
    /// Mutual advantage with dark.
    Light,
    /// Mutual advantage with light.
    Dark,
}

/// Inclusive attack range in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponRange {
    /// Closest distance the weapon reaches.
    pub min: u32,
    /// Farthest distance the weapon reaches.
    pub max: u32,
}

impl WeaponRange {
    /// Adjacent-only range.
    pub const MELEE: Self = Self { min: 1, max: 1 };

    /// Create a range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Whether `distance` lies inside the range.
    #[must_use]
    pub const fn covers(self, distance: u32) -> bool {
        distance >= self.min && distance <= self.max
    }
}

impl Default for WeaponRange {
    fn default() -> Self {
        Self::MELEE
    }
}

/// Bonus stats added by forging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ForgeBonus {
    /// Added might.
    pub might: i32,
    /// Added hit.
    pub hit: i32,
    /// Added critical.
    pub crit: i32,
}

/// Equipped weapon as seen by combat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponView {
    /// Item id in the content tables.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category.
    pub category: WeaponCategory,
    /// Element for tomes.
    #[serde(default)]
    pub element: Option<Element>,
    /// Base might.
    pub might: i32,
    /// Base hit.
    pub hit: i32,
    /// Base critical.
    pub crit: i32,
    /// Attack range.
    #[serde(default)]
    pub range: WeaponRange,
    /// Forge bonuses.
    #[serde(default)]
    pub forge: ForgeBonus,
    /// Movement types this weapon deals effective damage to.
    #[serde(default)]
    pub effective_against: Vec<MovementType>,
}

impl WeaponView {
    /// Create an unforged melee weapon.
    #[must_use]
    pub fn new(id: impl Into<String>, category: WeaponCategory, might: i32, hit: i32, crit: i32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            category,
            element: None,
            might,
            hit,
            crit,
            range: WeaponRange::MELEE,
            forge: ForgeBonus::default(),
            effective_against: Vec::new(),
        }
    }

    /// Builder method to set the element.
    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    /// Builder method to set the range.
    #[must_use]
    pub fn with_range(mut self, min: u32, max: u32) -> Self {
        self.range = WeaponRange::new(min, max);
        self
    }

    /// Builder method to set forge bonuses.
    #[must_use]
    pub fn with_forge(mut self, might: i32, hit: i32, crit: i32) -> Self {
        self.forge = ForgeBonus { might, hit, crit };
        self
    }

    /// Builder method to add an effectiveness target.
    #[must_use]
    pub fn effective_against(mut self, movement_type: MovementType) -> Self {
        self.effective_against.push(movement_type);
        self
    }

    /// Whether the weapon uses magic against resistance.
    #[must_use]
    pub fn is_magical(&self) -> bool {
        self.category.is_magical()
    }

    /// Whether the weapon can strike at `distance`.
    #[must_use]
    pub fn reaches(&self, distance: u32) -> bool {
        self.range.covers(distance)
    }

    /// Whether the weapon is effective against `movement_type`.
    #[must_use]
    pub fn is_effective_against(&self, movement_type: MovementType) -> bool {
        self.effective_against.contains(&movement_type)
    }
}
