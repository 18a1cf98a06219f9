//! # Tactics Core
//!
//! Deterministic battle core for a grid-based tactical RPG.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO outside explicit load/save helpers
//! - No system randomness (combat rolls come from a seeded [`combat::CombatRng`])
//! - No floating-point math (percent modifiers use fixed-point)
//!
//! This separation enables:
//! - Exact battle forecasts
//! - Replays that re-simulate bit for bit
//! - Headless batch runs for balance testing
//!
//! ## Crate Structure
//!
//! - [`combat`] - Triangle, damage, hit, exp calculators and the combat engine
//! - [`ai`] - Threat estimates and the five tactical policies
//! - [`grid`] - Map queries used by the AI, plus a reference tile grid
//! - [`units`], [`weapons`], [`terrain`] - Snapshot data model
//! - [`config`] - Tunable combat rules
//! - [`data`] - Content lookup
//! - [`replay`] - Recorded exchanges and verification

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod combat;
pub mod config;
pub mod data;
pub mod error;
pub mod grid;
pub mod math;
pub mod replay;
pub mod terrain;
pub mod units;
pub mod weapons;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::{AiSystem, CombatAction, DecisionContext, TacticalPolicy};
    pub use crate::combat::{
        BattleForecast, CombatEngine, CombatResult, CombatRng, CombatRound, Engagement,
        SkillEffect, SkillOutcome, SkillView, TriangleBonus,
    };
    pub use crate::config::CombatRules;
    pub use crate::data::{ContentTables, DataProvider};
    pub use crate::error::{GameError, Result};
    pub use crate::grid::{GridPos, GridQuery, GridType, TileGrid};
    pub use crate::math::Fixed;
    pub use crate::replay::BattleReplay;
    pub use crate::terrain::{TerrainKind, TerrainView};
    pub use crate::units::{
        AiBehavior, ClassTag, CombatantSnapshot, MovementType, Stat, Stats, Team, UnitId,
    };
    pub use crate::weapons::{Element, WeaponCategory, WeaponView};
}
