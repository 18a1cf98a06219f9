//! Combat output types.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::units::{Stat, Stats, UnitId};

/// One strike (or one skill application) in an exchange.
///
/// `attacker_hp` and `defender_hp` always refer to the exchange's attacker
/// and defender, whichever side acted in this round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatRound {
    /// Unit that acted.
    pub actor_id: UnitId,
    /// Unit that received the strike.
    pub target_id: UnitId,
    /// Damage dealt. Zero on a miss, negative for healing.
    pub damage: i32,
    /// Whether the strike connected.
    pub hit: bool,
    /// Whether the strike was critical.
    pub critical: bool,
    /// Attacker HP after this round.
    pub attacker_hp: i32,
    /// Defender HP after this round.
    pub defender_hp: i32,
}

/// Stat gains from a level up.
///
/// The battle core never produces one; the field exists so a progression
/// layer can fill it in without changing the result shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelUp {
    /// Level reached.
    pub new_level: i32,
    /// Stat increases.
    pub gains: Stats,
}

/// Outcome of a resolved exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatResult {
    /// Initiating unit.
    pub attacker_id: UnitId,
    /// Unit that was attacked.
    pub defender_id: UnitId,
    /// Rounds in the order they happened (at most four).
    pub rounds: Vec<CombatRound>,
    /// Exp earned by the attacker.
    pub attacker_exp: i32,
    /// Exp earned by the defender. Counters award none.
    pub defender_exp: i32,
    /// Always `None` from this crate.
    pub attacker_level_up: Option<LevelUp>,
    /// Always `None` from this crate.
    pub defender_level_up: Option<LevelUp>,
    /// Attacker HP after the exchange.
    pub attacker_hp: i32,
    /// Defender HP after the exchange.
    pub defender_hp: i32,
}

impl CombatResult {
    /// Whether the defender fell.
    #[must_use]
    pub const fn defender_defeated(&self) -> bool {
        self.defender_hp <= 0
    }

    /// Whether the attacker fell to a counter.
    #[must_use]
    pub const fn attacker_defeated(&self) -> bool {
        self.attacker_hp <= 0
    }

    /// Total damage dealt by `unit_id` over the exchange.
    #[must_use]
    pub fn damage_dealt_by(&self, unit_id: &str) -> i32 {
        self.rounds
            .iter()
            .filter(|round| round.actor_id == unit_id)
            .map(|round| round.damage)
            .sum()
    }

    /// Stable hash of the whole result, used for replay verification.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// Preview numbers for one side of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ForecastSide {
    /// Damage per hit before criticals.
    pub damage: i32,
    /// Hit chance in percent.
    pub hit: i32,
    /// Critical chance in percent.
    pub crit: i32,
    /// Whether this side strikes twice.
    pub doubles: bool,
}

/// Non-mutating preview of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleForecast {
    /// The initiating side.
    pub attacker: ForecastSide,
    /// The counter, when the defender holds a weapon that reaches.
    pub defender: Option<ForecastSide>,
}

impl BattleForecast {
    /// Whether the attacker strikes twice.
    #[must_use]
    pub const fn attacker_doubles(&self) -> bool {
        self.attacker.doubles
    }

    /// Whether the defender can counter at all.
    #[must_use]
    pub const fn defender_can_counter(&self) -> bool {
        self.defender.is_some()
    }

    /// Whether the defender counters twice.
    #[must_use]
    pub const fn defender_doubles(&self) -> bool {
        match self.defender {
            Some(side) => side.doubles,
            None => false,
        }
    }
}

/// What a skill does to its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillEffect {
    /// `base + caster[scaling]` minus the target's matching defense.
    Damage {
        /// Flat power.
        base: i32,
        /// Caster stat added to the power.
        scaling: Stat,
    },
    /// `base + caster.magic`, capped at the target's max HP.
    Heal {
        /// Flat power.
        base: i32,
    },
}

/// A usable skill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillView {
    /// Skill id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Effect.
    pub effect: SkillEffect,
}

impl SkillView {
    /// Create a skill whose name equals its id.
    #[must_use]
    pub fn new(id: impl Into<String>, effect: SkillEffect) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            effect,
        }
    }

    /// Healing skill.
    #[must_use]
    pub fn heal(id: impl Into<String>, base: i32) -> Self {
        Self::new(id, SkillEffect::Heal { base })
    }

    /// Damaging skill.
    #[must_use]
    pub fn damage(id: impl Into<String>, base: i32, scaling: Stat) -> Self {
        Self::new(id, SkillEffect::Damage { base, scaling })
    }
}

/// Outcome of a skill cast.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillOutcome {
    /// Caster.
    pub caster_id: UnitId,
    /// Skill used.
    pub skill_id: String,
    /// One round per target, in target order. `defender_hp` is that
    /// target's HP afterwards.
    pub rounds: Vec<CombatRound>,
}

impl SkillOutcome {
    /// HP of `target_id` after the cast, if it was targeted.
    #[must_use]
    pub fn target_hp(&self, target_id: &str) -> Option<i32> {
        self.rounds
            .iter()
            .find(|round| round.target_id == target_id)
            .map(|round| round.defender_hp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(actor: &str, damage: i32) -> CombatRound {
        CombatRound {
            actor_id: actor.into(),
            target_id: "x".into(),
            damage,
            hit: damage != 0,
            critical: false,
            attacker_hp: 10,
            defender_hp: 10,
        }
    }

    #[test]
    fn test_damage_dealt_by_filters_actor() {
        let result = CombatResult {
            attacker_id: "a".into(),
            defender_id: "d".into(),
            rounds: vec![round("a", 5), round("d", 3), round("a", 0)],
            attacker_exp: 1,
            defender_exp: 0,
            attacker_level_up: None,
            defender_level_up: None,
            attacker_hp: 7,
            defender_hp: 0,
        };
        assert_eq!(result.damage_dealt_by("a"), 5);
        assert_eq!(result.damage_dealt_by("d"), 3);
        assert!(result.defender_defeated());
        assert!(!result.attacker_defeated());
    }

    #[test]
    fn test_state_hash_tracks_rounds() {
        let mut result = CombatResult {
            attacker_id: "a".into(),
            defender_id: "d".into(),
            rounds: vec![round("a", 5)],
            attacker_exp: 1,
            defender_exp: 0,
            attacker_level_up: None,
            defender_level_up: None,
            attacker_hp: 10,
            defender_hp: 5,
        };
        let before = result.state_hash();
        assert_eq!(before, result.clone().state_hash());
        result.rounds[0].critical = true;
        assert_ne!(before, result.state_hash());
    }

    #[test]
    fn test_forecast_helpers() {
        let forecast = BattleForecast {
            attacker: ForecastSide {
                doubles: true,
                ..ForecastSide::default()
            },
            defender: None,
        };
        assert!(forecast.attacker_doubles());
        assert!(!forecast.defender_can_counter());
        assert!(!forecast.defender_doubles());
    }
}
