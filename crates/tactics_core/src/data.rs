//! Content lookup for weapons and classes.
//!
//! The static content tables themselves live outside this crate. The core
//! only needs to resolve a weapon id to a [`WeaponView`] and read a class's
//! movement type, which is what [`DataProvider`] exposes.
//! [`ContentTables`] is a plain in-memory provider, loadable from RON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::units::{ClassTag, MovementType};
use crate::weapons::{Element, WeaponCategory, WeaponView};

/// Read access to static content.
pub trait DataProvider {
    /// Weapon stats by item id.
    fn weapon(&self, id: &str) -> Option<&WeaponView>;

    /// Movement type for a class.
    fn class_movement_type(&self, class: ClassTag) -> MovementType {
        default_movement_type(class)
    }

    /// Resolve a weapon id or report it missing.
    fn require_weapon(&self, id: &str) -> Result<WeaponView> {
        self.weapon(id)
            .cloned()
            .ok_or_else(|| GameError::UnknownWeapon(id.to_string()))
    }
}

/// Movement type implied by a class.
#[must_use]
pub const fn default_movement_type(class: ClassTag) -> MovementType {
    match class {
        ClassTag::Knight => MovementType::Armored,
        ClassTag::Cavalier => MovementType::Cavalry,
        ClassTag::PegasusKnight | ClassTag::WyvernRider => MovementType::Flying,
        _ => MovementType::Infantry,
    }
}

/// In-memory content tables.
///
/// # Example RON
///
/// ```ron
/// ContentTables(
///     weapons: {
///         "iron_sword": WeaponView(
///             id: "iron_sword", name: "Iron Sword", category: Sword,
///             might: 5, hit: 90, crit: 0,
///         ),
///     },
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTables {
    /// Weapons keyed by id.
    #[serde(default)]
    pub weapons: BTreeMap<String, WeaponView>,
}

impl ContentTables {
    /// Empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard weapon set.
    #[must_use]
    pub fn standard() -> Self {
        let mut tables = Self::new();
        for weapon in standard_weapons() {
            tables.insert_weapon(weapon);
        }
        tables
    }

    /// Add or replace a weapon.
    pub fn insert_weapon(&mut self, weapon: WeaponView) {
        self.weapons.insert(weapon.id.clone(), weapon);
    }

    /// Parse tables from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let tables: Self = ron::from_str(ron)?;
        for (key, weapon) in &tables.weapons {
            if key != &weapon.id {
                return Err(GameError::InvalidState(format!(
                    "weapon table key '{key}' does not match weapon id '{}'",
                    weapon.id
                )));
            }
        }
        Ok(tables)
    }

    /// Load tables from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }
}

impl DataProvider for ContentTables {
    fn weapon(&self, id: &str) -> Option<&WeaponView> {
        self.weapons.get(id)
    }
}

fn named(weapon: WeaponView, name: &str) -> WeaponView {
    WeaponView {
        name: name.to_string(),
        ..weapon
    }
}

fn standard_weapons() -> Vec<WeaponView> {
    use MovementType::{Armored, Cavalry, Flying};
    use WeaponCategory::{Axe, Bow, Lance, Staff, Sword, Tome};

    vec![
        named(WeaponView::new("iron_sword", Sword, 5, 90, 0), "Iron Sword"),
        named(WeaponView::new("steel_sword", Sword, 8, 75, 0), "Steel Sword"),
        named(WeaponView::new("killing_edge", Sword, 9, 75, 30), "Killing Edge"),
        named(
            WeaponView::new("armorslayer", Sword, 8, 80, 0).effective_against(Armored),
            "Armorslayer",
        ),
        named(WeaponView::new("iron_lance", Lance, 7, 80, 0), "Iron Lance"),
        named(WeaponView::new("javelin", Lance, 6, 65, 0).with_range(1, 2), "Javelin"),
        named(
            WeaponView::new("horseslayer", Lance, 7, 70, 0).effective_against(Cavalry),
            "Horseslayer",
        ),
        named(WeaponView::new("iron_axe", Axe, 8, 75, 0), "Iron Axe"),
        named(WeaponView::new("hand_axe", Axe, 7, 60, 0).with_range(1, 2), "Hand Axe"),
        named(
            WeaponView::new("iron_bow", Bow, 6, 85, 0)
                .with_range(2, 2)
                .effective_against(Flying),
            "Iron Bow",
        ),
        named(
            WeaponView::new("fire", Tome, 5, 90, 0)
                .with_element(Element::Fire)
                .with_range(1, 2),
            "Fire",
        ),
        named(
            WeaponView::new("wind", Tome, 4, 95, 0)
                .with_element(Element::Wind)
                .with_range(1, 2)
                .effective_against(Flying),
            "Wind",
        ),
        named(
            WeaponView::new("thunder", Tome, 6, 80, 5)
                .with_element(Element::Thunder)
                .with_range(1, 2),
            "Thunder",
        ),
        named(
            WeaponView::new("lightning", Tome, 4, 95, 5)
                .with_element(Element::Light)
                .with_range(1, 2),
            "Lightning",
        ),
        named(
            WeaponView::new("flux", Tome, 7, 80, 0)
                .with_element(Element::Dark)
                .with_range(1, 2),
            "Flux",
        ),
        named(WeaponView::new("heal_staff", Staff, 0, 100, 0), "Heal"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_tables_lookup() {
        let tables = ContentTables::standard();
        let sword = tables.weapon("iron_sword").unwrap();
        assert_eq!(sword.might, 5);
        assert_eq!(sword.name, "Iron Sword");
        assert!(tables.weapon("excalibur").is_none());
    }

    #[test]
    fn test_require_weapon_reports_unknown() {
        let tables = ContentTables::standard();
        let err = tables.require_weapon("excalibur").unwrap_err();
        assert!(matches!(err, GameError::UnknownWeapon(id) if id == "excalibur"));
    }

    #[test]
    fn test_class_movement_types() {
        let tables = ContentTables::new();
        assert_eq!(tables.class_movement_type(ClassTag::Knight), MovementType::Armored);
        assert_eq!(tables.class_movement_type(ClassTag::Cavalier), MovementType::Cavalry);
        assert_eq!(tables.class_movement_type(ClassTag::WyvernRider), MovementType::Flying);
        assert_eq!(tables.class_movement_type(ClassTag::Mage), MovementType::Infantry);
    }

    #[test]
    fn test_ron_tables_validate_keys() {
        let ron = r#"(
            weapons: {
                "a": (id: "b", name: "B", category: Sword, might: 1, hit: 1, crit: 0),
            },
        )"#;
        assert!(matches!(
            ContentTables::from_ron_str(ron),
            Err(GameError::InvalidState(_))
        ));

        let ron = r#"(
            weapons: {
                "b": (id: "b", name: "B", category: Sword, might: 1, hit: 1, crit: 0),
            },
        )"#;
        let tables = ContentTables::from_ron_str(ron).unwrap();
        assert_eq!(tables.weapon("b").unwrap().range.max, 1);
    }
}
