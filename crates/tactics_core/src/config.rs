//! Combat rules configuration.
//!
//! Every tunable number used by the combat formulas lives in
//! [`CombatRules`]. The defaults reproduce the standard ruleset; a RON file
//! may override any subset of fields.
//!
//! # Example RON
//!
//! ```ron
//! CombatRules(
//!     triangle_hit_bonus: 20,
//!     double_threshold: 4,
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Hit bonus granted by weapon or magic triangle advantage.
pub const TRIANGLE_HIT_BONUS: i32 = 15;

/// Damage bonus granted by weapon or magic triangle advantage.
pub const TRIANGLE_DAMAGE_BONUS: i32 = 1;

/// Hit (and evasion) granted per adjacent supporting ally.
pub const SUPPORT_BONUS: i32 = 10;

/// Speed lead a unit must exceed to strike twice.
pub const DOUBLE_THRESHOLD: i32 = 5;

/// Damage multiplier applied on a critical hit.
pub const CRITICAL_MULTIPLIER: i32 = 3;

/// Might multiplier for weapons effective against the target's movement type.
pub const EFFECTIVE_MULTIPLIER: i32 = 3;

/// Flat hit modifier for attacking from higher (or lower) ground.
pub const HEIGHT_HIT_BONUS: i32 = 15;

/// Damage percentage applied when attacking from higher ground.
pub const HEIGHT_DAMAGE_PERCENT: i32 = 115;

/// Experience added on top of the base award for a kill.
pub const KILL_EXP_BONUS: i32 = 30;

/// Upper bound on experience from a single exchange.
pub const MAX_EXP_PER_COMBAT: i32 = 100;

/// Seed used by a freshly created combat engine.
pub const DEFAULT_RNG_SEED: u32 = 42;

/// Tunable combat formula parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    /// Hit bonus magnitude for triangle advantage.
    pub triangle_hit_bonus: i32,
    /// Damage bonus magnitude for triangle advantage.
    pub triangle_damage_bonus: i32,
    /// Hit/evasion per adjacent ally.
    pub support_bonus: i32,
    /// Speed difference that must be exceeded to double.
    pub double_threshold: i32,
    /// Critical damage multiplier.
    pub critical_multiplier: i32,
    /// Effective-weapon might multiplier.
    pub effective_multiplier: i32,
    /// Hit modifier for height advantage.
    pub height_hit_bonus: i32,
    /// Damage percentage for height advantage.
    pub height_damage_percent: i32,
    /// Flat exp bonus for a kill.
    pub kill_exp_bonus: i32,
    /// Exp cap per exchange.
    pub max_exp: i32,
    /// Initial RNG seed.
    pub default_seed: u32,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            triangle_hit_bonus: TRIANGLE_HIT_BONUS,
            triangle_damage_bonus: TRIANGLE_DAMAGE_BONUS,
            support_bonus: SUPPORT_BONUS,
            double_threshold: DOUBLE_THRESHOLD,
            critical_multiplier: CRITICAL_MULTIPLIER,
            effective_multiplier: EFFECTIVE_MULTIPLIER,
            height_hit_bonus: HEIGHT_HIT_BONUS,
            height_damage_percent: HEIGHT_DAMAGE_PERCENT,
            kill_exp_bonus: KILL_EXP_BONUS,
            max_exp: MAX_EXP_PER_COMBAT,
            default_seed: DEFAULT_RNG_SEED,
        }
    }
}

impl CombatRules {
    /// Parse rules from a RON string. Missing fields keep their defaults.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let rules: Self = ron::from_str(ron)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load rules from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let rules = Self::from_ron_str(&contents)?;
        tracing::debug!(path = %path.as_ref().display(), "Loaded combat rules");
        Ok(rules)
    }

    /// Check that multipliers and caps are usable.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRules`] for negative bonuses, multipliers
    /// below one, a height percentage below 100, or an exp cap below one.
    pub fn validate(&self) -> Result<()> {
        if self.triangle_hit_bonus < 0 || self.triangle_damage_bonus < 0 {
            return Err(GameError::InvalidRules(
                "triangle bonuses must not be negative".into(),
            ));
        }
        if self.support_bonus < 0 || self.height_hit_bonus < 0 {
            return Err(GameError::InvalidRules(
                "support and height hit bonuses must not be negative".into(),
            ));
        }
        if self.double_threshold < 0 {
            return Err(GameError::InvalidRules(
                "double_threshold must not be negative".into(),
            ));
        }
        if self.critical_multiplier < 1 || self.effective_multiplier < 1 {
            return Err(GameError::InvalidRules(
                "multipliers must be at least 1".into(),
            ));
        }
        if self.height_damage_percent < 100 {
            return Err(GameError::InvalidRules(format!(
                "height_damage_percent must be at least 100, got {}",
                self.height_damage_percent
            )));
        }
        if self.max_exp < 1 || self.kill_exp_bonus < 0 {
            return Err(GameError::InvalidRules(
                "exp cap must be positive and kill bonus non-negative".into(),
            ));
        }
        Ok(())
    }
}
