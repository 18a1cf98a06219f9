//! Combatant data as seen by combat and AI.
//!
//! A [`CombatantSnapshot`] is a read-only view of a unit captured at the
//! moment combat or an AI decision is requested. Nothing in this crate
//! mutates a snapshot; callers apply results to their own unit storage.

use serde::{Deserialize, Serialize};

use crate::grid::GridPos;
use crate::weapons::WeaponView;

/// Unique identifier for a unit.
pub type UnitId = String;

/// Side a unit fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Team {
    /// Player-controlled army.
    #[default]
    Player,
    /// Hostile army.
    Enemy,
    /// Computer-controlled units fighting alongside the player.
    Ally,
}

impl Team {
    /// Whether two teams fight on the same side.
    #[must_use]
    pub const fn is_friendly_with(self, other: Team) -> bool {
        !matches!(
            (self, other),
            (Team::Enemy, Team::Player)
                | (Team::Enemy, Team::Ally)
                | (Team::Player, Team::Enemy)
                | (Team::Ally, Team::Enemy)
        )
    }
}

/// How a unit crosses terrain. Weapons may be effective against a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MovementType {
    /// Foot soldiers.
    #[default]
    Infantry,
    /// Heavily armored foot soldiers.
    Armored,
    /// Mounted units.
    Cavalry,
    /// Pegasus and wyvern riders.
    Flying,
}

/// Tactical behavior assigned to computer-controlled units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AiBehavior {
    /// Close in and attack the most damaging target.
    #[default]
    Aggressive,
    /// Hold position, counter what comes in range, seek cover.
    Defensive,
    /// Heal injured allies, otherwise stay near the group.
    Support,
    /// Attack from the sides of enemies.
    Flanker,
    /// Stationary until badly hurt.
    Boss,
}

/// Unit class. Drives critical bonuses and healer detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ClassTag {
    /// Army leader.
    Lord,
    /// Sword infantry.
    #[default]
    Mercenary,
    /// Fast sword infantry.
    Myrmidon,
    /// Axe infantry.
    Fighter,
    /// Promoted axe infantry.
    Berserker,
    /// Lance armor.
    Knight,
    /// Lance cavalry.
    Cavalier,
    /// Lance flier.
    PegasusKnight,
    /// Axe flier.
    WyvernRider,
    /// Bow infantry.
    Archer,
    /// Promoted bow infantry.
    Sniper,
    /// Dagger infantry.
    Thief,
    /// Promoted thief.
    Assassin,
    /// Tome user.
    Mage,
    /// Dark tome user.
    Shaman,
    /// Staff user.
    Cleric,
    /// Staff user.
    Priest,
    /// Promoted staff and light tome user.
    Bishop,
}

impl ClassTag {
    /// Critical rate bonus granted by the class.
    #[must_use]
    pub const fn crit_bonus(self) -> i32 {
        match self {
            ClassTag::Berserker => 10,
            ClassTag::Assassin => 15,
            ClassTag::Sniper => 10,
            ClassTag::Thief => 5,
            _ => 0,
        }
    }

    /// Whether the class is one of the dedicated healer classes.
    #[must_use]
    pub const fn is_healer(self) -> bool {
        matches!(self, ClassTag::Cleric | ClassTag::Priest | ClassTag::Bishop)
    }
}

/// A single stat, used to pick a skill's scaling stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    /// Physical power.
    Strength,
    /// Magical power.
    Magic,
    /// Accuracy and critical chance.
    Skill,
    /// Evasion and doubling.
    Speed,
    /// Hit, avoid and critical avoid.
    Luck,
    /// Physical damage reduction.
    Defense,
    /// Magical damage reduction.
    Resistance,
}

/// Current stat block of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Stats {
    /// Physical power.
    pub strength: i32,
    /// Magical power.
    pub magic: i32,
    /// Accuracy and critical chance.
    pub skill: i32,
    /// Evasion and doubling.
    pub speed: i32,
    /// Hit, avoid and critical avoid.
    pub luck: i32,
    /// Physical damage reduction.
    pub defense: i32,
    /// Magical damage reduction.
    pub resistance: i32,
    /// Movement points per turn.
    pub movement: i32,
}

impl Stats {
    /// Read one stat by name.
    #[must_use]
    pub const fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Strength => self.strength,
            Stat::Magic => self.magic,
            Stat::Skill => self.skill,
            Stat::Speed => self.speed,
            Stat::Luck => self.luck,
            Stat::Defense => self.defense,
            Stat::Resistance => self.resistance,
        }
    }
}

/// Read-only view of a unit for combat and AI purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    /// Unique unit id.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Character definition id this unit was created from.
    pub character_id: String,
    /// Side.
    pub team: Team,
    /// Whether the unit is still in play.
    pub alive: bool,
    /// Tile the unit stands on, if deployed.
    pub position: Option<GridPos>,
    /// Character level.
    pub level: i32,
    /// Current hit points.
    pub current_hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Current stats.
    pub stats: Stats,
    /// Class tag.
    pub class: ClassTag,
    /// Movement type used for terrain costs and weapon effectiveness.
    pub movement_type: MovementType,
    /// Known skill identifiers.
    #[serde(default)]
    pub skills: Vec<String>,
    /// AI behavior for computer-controlled units.
    #[serde(default)]
    pub ai_behavior: Option<AiBehavior>,
    /// Equipped weapon.
    #[serde(default)]
    pub weapon: Option<WeaponView>,
}

impl CombatantSnapshot {
    /// Create a level 1 unit at full health with the given stats.
    #[must_use]
    pub fn new(id: impl Into<UnitId>, class: ClassTag, max_hp: i32, stats: Stats) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            character_id: id.clone(),
            id,
            team: Team::Player,
            alive: true,
            position: None,
            level: 1,
            current_hp: max_hp,
            max_hp,
            stats,
            class,
            movement_type: MovementType::Infantry,
            skills: Vec::new(),
            ai_behavior: None,
            weapon: None,
        }
    }

    /// Builder method to set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder method to set the character id.
    #[must_use]
    pub fn with_character_id(mut self, character_id: impl Into<String>) -> Self {
        self.character_id = character_id.into();
        self
    }

    /// Builder method to set the team.
    #[must_use]
    pub fn with_team(mut self, team: Team) -> Self {
        self.team = team;
        self
    }

    /// Builder method to place the unit on a tile.
    #[must_use]
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.position = Some(GridPos::new(x, y));
        self
    }

    /// Builder method to set the level.
    #[must_use]
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    /// Builder method to set current HP (clamped to `0..=max_hp`).
    #[must_use]
    pub fn with_hp(mut self, current_hp: i32) -> Self {
        self.current_hp = current_hp.clamp(0, self.max_hp);
        self
    }

    /// Builder method to set the movement type.
    #[must_use]
    pub fn with_movement_type(mut self, movement_type: MovementType) -> Self {
        self.movement_type = movement_type;
        self
    }

    /// Builder method to add a known skill.
    #[must_use]
    pub fn with_skill(mut self, skill_id: impl Into<String>) -> Self {
        self.skills.push(skill_id.into());
        self
    }

    /// Builder method to set the AI behavior.
    #[must_use]
    pub fn with_behavior(mut self, behavior: AiBehavior) -> Self {
        self.ai_behavior = Some(behavior);
        self
    }

    /// Builder method to equip a weapon.
    #[must_use]
    pub fn with_weapon(mut self, weapon: WeaponView) -> Self {
        self.weapon = Some(weapon);
        self
    }

    /// Builder method to mark the unit as fallen.
    #[must_use]
    pub fn defeated(mut self) -> Self {
        self.alive = false;
        self.current_hp = 0;
        self
    }

    /// Alive and deployed on the map.
    #[must_use]
    pub fn is_on_field(&self) -> bool {
        self.alive && self.position.is_some()
    }

    /// Whether HP is strictly below half of max HP.
    #[must_use]
    pub fn is_below_half_hp(&self) -> bool {
        self.current_hp * 2 < self.max_hp
    }
}
