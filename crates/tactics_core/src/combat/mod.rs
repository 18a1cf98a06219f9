//! Combat resolution.
//!
//! Leaf calculators ([`triangle`], [`damage`], [`hit`], [`exp`]) are pure
//! functions over snapshots. [`CombatEngine`] combines them into forecasts
//! and fully resolved exchanges, drawing rolls from its own [`CombatRng`].

pub mod damage;
pub mod engine;
pub mod exp;
pub mod hit;
pub mod result;
pub mod rng;
pub mod triangle;

pub use damage::{apply_critical, calculate_damage, calculate_damage_with_height, effective_might};
pub use engine::{CombatEngine, Engagement};
pub use exp::calculate_exp_gain;
pub use hit::{calculate_crit_rate, calculate_hit_rate};
pub use result::{
    BattleForecast, CombatResult, CombatRound, ForecastSide, LevelUp, SkillEffect, SkillOutcome,
    SkillView,
};
pub use rng::CombatRng;
pub use triangle::{magic_triangle_bonus, matchup_bonus, weapon_triangle_bonus, TriangleBonus};
