//! Cheap threat estimates for AI ranking.
//!
//! These numbers deliberately ignore weapons, terrain and the triangle. They
//! only order targets and tiles; real combat always goes through
//! [`crate::combat`].

use crate::units::CombatantSnapshot;

/// Flat might assumed for every attacker.
pub const ASSUMED_MIGHT: i32 = 10;

/// Weapon-agnostic damage estimate: `max(0, strength + 10 - defense)`.
#[must_use]
pub fn estimate_damage(attacker: &CombatantSnapshot, target: &CombatantSnapshot) -> i32 {
    (attacker.stats.strength + ASSUMED_MIGHT - target.stats.defense).max(0)
}

/// Whether one estimated hit would finish `target`.
#[must_use]
pub fn is_killable(attacker: &CombatantSnapshot, target: &CombatantSnapshot) -> bool {
    estimate_damage(attacker, target) >= target.current_hp
}

/// Whether `unit` is a leader or a healer.
///
/// Leaders are recognised by "lord" in the display name or character id,
/// ignoring case.
#[must_use]
pub fn is_lord_or_healer(unit: &CombatantSnapshot) -> bool {
    let is_lord = unit.name.to_lowercase().contains("lord")
        || unit.character_id.to_lowercase().contains("lord");
    is_lord || unit.class.is_healer()
}

/// Kill potential only: estimate, doubled for a kill.
#[must_use]
pub fn kill_score(attacker: &CombatantSnapshot, target: &CombatantSnapshot) -> i32 {
    let estimate = estimate_damage(attacker, target);
    if is_killable(attacker, target) {
        estimate * 2
    } else {
        estimate
    }
}

/// Full target priority: kill score, doubled again for leaders and healers.
#[must_use]
pub fn target_score(attacker: &CombatantSnapshot, target: &CombatantSnapshot) -> i32 {
    let score = kill_score(attacker, target);
    if is_lord_or_healer(target) {
        score * 2
    } else {
        score
    }
}

/// Whether `attacker` would live through one estimated counter from `target`.
#[must_use]
pub fn can_survive_counter(attacker: &CombatantSnapshot, target: &CombatantSnapshot) -> bool {
    estimate_damage(target, attacker) < attacker.current_hp
}
