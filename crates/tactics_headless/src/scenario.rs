//! Scenario loading and configuration.
//!
//! Scenarios define the initial battle state for headless runs: the map
//! layout, the units on each side and the combat rules to fight under.
//!
//! # Example RON
//!
//! ```ron
//! Scenario(
//!     name: "Bridge",
//!     map: ["....", ".FF.", "...."],
//!     units: [
//!         UnitPlacement(
//!             id: "roy", team: Player, class: Lord, max_hp: 22,
//!             position: (0, 1), weapon: Some("iron_sword"),
//!         ),
//!         UnitPlacement(
//!             id: "bandit", team: Enemy, class: Fighter, max_hp: 24,
//!             position: (3, 1), weapon: Some("iron_axe"),
//!         ),
//!     ],
//! )
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tactics_core::config::CombatRules;
use tactics_core::data::{ContentTables, DataProvider};
use tactics_core::error::GameError;
use tactics_core::grid::{GridPos, GridQuery, TileGrid};
use tactics_core::units::{AiBehavior, ClassTag, CombatantSnapshot, Stats, Team};
use tactics_core::weapons::WeaponView;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// A unit carries a weapon id missing from the content tables.
    #[error("Unit '{unit}' equips unknown weapon '{weapon}'")]
    UnknownWeapon {
        /// Unit id.
        unit: String,
        /// Weapon id.
        weapon: String,
    },
    /// A unit placement is inconsistent with the map or other units.
    #[error("Invalid unit placement: {0}")]
    InvalidUnit(String),
    /// Map or rules rejected by the battle core.
    #[error(transparent)]
    Core(#[from] GameError),
}

fn default_level() -> i32 {
    1
}

fn default_max_turns() -> u32 {
    30
}

/// One unit on the starting map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Unique unit id.
    pub id: String,
    /// Display name. Defaults to the id.
    #[serde(default)]
    pub name: Option<String>,
    /// Character id. Defaults to the id.
    #[serde(default)]
    pub character_id: Option<String>,
    /// Side.
    pub team: Team,
    /// Class.
    pub class: ClassTag,
    /// Level.
    #[serde(default = "default_level")]
    pub level: i32,
    /// Maximum HP.
    pub max_hp: i32,
    /// Starting HP. Defaults to `max_hp`.
    #[serde(default)]
    pub hp: Option<i32>,
    /// Stats.
    #[serde(default)]
    pub stats: Stats,
    /// Starting tile as `(x, y)`.
    pub position: (i32, i32),
    /// Equipped weapon id.
    #[serde(default)]
    pub weapon: Option<String>,
    /// Known skills.
    #[serde(default)]
    pub skills: Vec<String>,
    /// AI behavior. Units without one act aggressively.
    #[serde(default)]
    pub behavior: Option<AiBehavior>,
}

impl UnitPlacement {
    /// Create a placement with default level, stats and no equipment.
    #[must_use]
    pub fn new(id: &str, team: Team, class: ClassTag, max_hp: i32, x: i32, y: i32) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            character_id: None,
            team,
            class,
            level: default_level(),
            max_hp,
            hp: None,
            stats: Stats::default(),
            position: (x, y),
            weapon: None,
            skills: Vec::new(),
            behavior: None,
        }
    }

    /// Builder method to set stats.
    #[must_use]
    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    /// Builder method to equip a weapon by id.
    #[must_use]
    pub fn with_weapon(mut self, weapon_id: &str) -> Self {
        self.weapon = Some(weapon_id.to_string());
        self
    }

    /// Builder method to set the AI behavior.
    #[must_use]
    pub fn with_behavior(mut self, behavior: AiBehavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Builder method to add a skill.
    #[must_use]
    pub fn with_skill(mut self, skill_id: &str) -> Self {
        self.skills.push(skill_id.to_string());
        self
    }

    /// Builder method to set the display name.
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Resolve into a combat snapshot.
    pub fn to_snapshot(&self, content: &dyn DataProvider) -> Result<CombatantSnapshot, ScenarioError> {
        let (x, y) = self.position;
        let mut unit = CombatantSnapshot::new(self.id.clone(), self.class, self.max_hp, self.stats)
            .with_team(self.team)
            .with_level(self.level)
            .with_movement_type(content.class_movement_type(self.class))
            .at(x, y);

        if let Some(name) = &self.name {
            unit = unit.with_name(name.clone());
        }
        if let Some(character_id) = &self.character_id {
            unit = unit.with_character_id(character_id.clone());
        }
        if let Some(hp) = self.hp {
            unit = unit.with_hp(hp);
        }
        if let Some(behavior) = self.behavior {
            unit = unit.with_behavior(behavior);
        }
        for skill in &self.skills {
            unit = unit.with_skill(skill.clone());
        }
        if let Some(weapon_id) = &self.weapon {
            let weapon = content.weapon(weapon_id).cloned().ok_or_else(|| ScenarioError::UnknownWeapon {
                unit: self.id.clone(),
                weapon: weapon_id.clone(),
            })?;
            unit = unit.with_weapon(weapon);
        }
        Ok(unit)
    }
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Map rows, see [`TileGrid::parse`] for the tile characters.
    pub map: Vec<String>,
    /// Turn limit before the battle is called a draw.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    /// Combat rules.
    #[serde(default)]
    pub rules: CombatRules,
    /// Weapons added to the standard tables.
    #[serde(default)]
    pub weapons: Vec<WeaponView>,
    /// Starting units.
    pub units: Vec<UnitPlacement>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::skirmish()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario = Self::from_ron_str(&contents)?;
        tracing::debug!(path = %path.display(), name = %scenario.name, "Loaded scenario");
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.rules.validate()?;
        Ok(scenario)
    }

    /// Load from a path, or fall back to the built-in skirmish.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ScenarioError> {
        path.map_or_else(|| Ok(Self::skirmish()), Self::load)
    }

    /// The built-in 4v4 skirmish.
    #[must_use]
    pub fn skirmish() -> Self {
        use AiBehavior::{Aggressive, Boss, Defensive, Flanker, Support};
        use ClassTag::{Cavalier, Cleric, Fighter, Knight, Lord, Mage, Mercenary};
        use Team::{Enemy, Player};

        let stats = |strength, magic, skill, speed, luck, defense, resistance| Stats {
            strength,
            magic,
            skill,
            speed,
            luck,
            defense,
            resistance,
            movement: 5,
        };

        Self {
            name: "Standard Skirmish".to_string(),
            description: "Four player units hold the west against a bandit band".to_string(),
            map: vec![
                "..........".to_string(),
                "..F....F..".to_string(),
                "..F.HH.T..".to_string(),
                "..........".to_string(),
                "....FF....".to_string(),
                "..T.......".to_string(),
                ".......F..".to_string(),
                "..........".to_string(),
            ],
            max_turns: default_max_turns(),
            rules: CombatRules::default(),
            weapons: Vec::new(),
            units: vec![
                UnitPlacement::new("p1_lord", Player, Lord, 22, 1, 3)
                    .with_name("Lord Alm")
                    .with_stats(stats(7, 1, 8, 9, 7, 6, 2))
                    .with_weapon("iron_sword")
                    .with_behavior(Defensive),
                UnitPlacement::new("p2_fighter", Player, Fighter, 30, 1, 2)
                    .with_stats(stats(11, 0, 6, 6, 3, 5, 0))
                    .with_weapon("iron_axe")
                    .with_behavior(Aggressive),
                UnitPlacement::new("p3_mage", Player, Mage, 18, 0, 4)
                    .with_stats(stats(1, 9, 7, 8, 4, 2, 6))
                    .with_weapon("fire")
                    .with_behavior(Flanker),
                UnitPlacement::new("p4_cleric", Player, Cleric, 17, 0, 3)
                    .with_stats(stats(1, 7, 5, 8, 8, 1, 7))
                    .with_weapon("heal_staff")
                    .with_skill("heal")
                    .with_behavior(Support),
                UnitPlacement::new("e1_chief", Enemy, Knight, 32, 8, 3)
                    .with_stats(stats(10, 0, 5, 3, 2, 11, 1))
                    .with_weapon("iron_lance")
                    .with_behavior(Boss),
                UnitPlacement::new("e2_bandit", Enemy, Fighter, 26, 8, 1)
                    .with_stats(stats(9, 0, 4, 7, 1, 3, 0))
                    .with_weapon("iron_axe")
                    .with_behavior(Aggressive),
                UnitPlacement::new("e3_rider", Enemy, Cavalier, 24, 9, 5)
                    .with_stats(stats(8, 0, 6, 7, 3, 5, 1))
                    .with_weapon("javelin")
                    .with_behavior(Flanker),
                UnitPlacement::new("e4_merc", Enemy, Mercenary, 24, 7, 6)
                    .with_stats(stats(8, 0, 9, 10, 4, 4, 1))
                    .with_weapon("iron_sword")
                    .with_behavior(Aggressive),
            ],
        }
    }

    /// Build the map.
    pub fn build_grid(&self) -> Result<TileGrid, ScenarioError> {
        Ok(TileGrid::parse(self.map.as_slice())?)
    }

    /// Standard content tables plus this scenario's weapons.
    #[must_use]
    pub fn content_tables(&self) -> ContentTables {
        let mut tables = ContentTables::standard();
        for weapon in &self.weapons {
            tables.insert_weapon(weapon.clone());
        }
        tables
    }

    /// Resolve every placement into a snapshot, checking ids and tiles.
    pub fn build_units(&self, grid: &TileGrid, content: &dyn DataProvider) -> Result<Vec<CombatantSnapshot>, ScenarioError> {
        let mut ids = BTreeSet::new();
        let mut tiles = BTreeSet::new();
        let mut units = Vec::with_capacity(self.units.len());

        for placement in &self.units {
            if !ids.insert(placement.id.as_str()) {
                return Err(ScenarioError::InvalidUnit(format!("duplicate unit id '{}'", placement.id)));
            }
            let (x, y) = placement.position;
            let pos = GridPos::new(x, y);
            if grid.tile(pos).is_none() {
                return Err(ScenarioError::InvalidUnit(format!(
                    "unit '{}' placed outside the map at ({x}, {y})",
                    placement.id
                )));
            }
            if !tiles.insert(pos) {
                return Err(ScenarioError::InvalidUnit(format!(
                    "unit '{}' shares tile ({x}, {y}) with another unit",
                    placement.id
                )));
            }
            if placement.max_hp <= 0 {
                return Err(ScenarioError::InvalidUnit(format!("unit '{}' has no HP", placement.id)));
            }
            units.push(placement.to_snapshot(content)?);
        }

        Ok(units)
    }
}
