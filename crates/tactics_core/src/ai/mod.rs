//! Tactical AI for computer-controlled units.
//!
//! Each [`AiBehavior`] maps to one [`TacticalPolicy`]. A policy looks at a
//! [`DecisionContext`] (the acting unit, its allies, its enemies and the
//! map) and returns a single [`CombatAction`]. Policies are pure: they
//! consult no RNG, so the same board always yields the same decision.
//!
//! Ranking uses the cheap estimates in [`threat`], never the real combat
//! formulas.

pub mod action;
pub mod aggressive;
pub mod boss;
pub mod defensive;
pub mod flanker;
pub mod support;
pub mod threat;

use std::collections::BTreeSet;

pub use action::CombatAction;
pub use aggressive::AggressivePolicy;
pub use boss::BossPolicy;
pub use defensive::DefensivePolicy;
pub use flanker::FlankerPolicy;
pub use support::SupportPolicy;

use crate::grid::{GridPos, GridQuery};
use crate::units::{AiBehavior, CombatantSnapshot};
use crate::weapons::WeaponRange;

/// A behavior's decision procedure.
pub trait TacticalPolicy {
    /// Behavior this policy implements.
    fn behavior(&self) -> AiBehavior;

    /// Choose an action. The acting unit is alive and on the map.
    fn decide(&self, ctx: &DecisionContext<'_>) -> CombatAction;
}

/// Board state seen by a policy.
pub struct DecisionContext<'a> {
    /// Acting unit.
    pub unit: &'a CombatantSnapshot,
    /// Where the acting unit stands.
    pub origin: GridPos,
    /// Units on the acting unit's side. May include the unit itself.
    pub allies: &'a [CombatantSnapshot],
    /// Opposing units.
    pub enemies: &'a [CombatantSnapshot],
    /// Map.
    pub grid: &'a dyn GridQuery,
}

impl<'a> DecisionContext<'a> {
    /// Context for `unit`, or `None` when it is fallen or off the map.
    #[must_use]
    pub fn new(
        unit: &'a CombatantSnapshot,
        allies: &'a [CombatantSnapshot],
        enemies: &'a [CombatantSnapshot],
        grid: &'a dyn GridQuery,
    ) -> Option<Self> {
        if !unit.alive {
            return None;
        }
        let origin = unit.position?;
        Some(Self {
            unit,
            origin,
            allies,
            enemies,
            grid,
        })
    }

    /// Enemies still on the field, paired with their tiles.
    pub fn living_enemies(&self) -> impl Iterator<Item = (&'a CombatantSnapshot, GridPos)> + '_ {
        on_field(self.enemies)
    }

    /// Allies still on the field, excluding the acting unit.
    pub fn living_allies(&self) -> impl Iterator<Item = (&'a CombatantSnapshot, GridPos)> + '_ {
        let id = &self.unit.id;
        on_field(self.allies).filter(move |(ally, _)| &ally.id != id)
    }

    /// Tiles held by other units.
    #[must_use]
    pub fn occupied_tiles(&self) -> Vec<GridPos> {
        self.living_allies()
            .chain(self.living_enemies())
            .map(|(_, pos)| pos)
            .collect()
    }

    /// Current tile plus every tile the unit can move to, sorted.
    #[must_use]
    pub fn reachable_tiles(&self) -> Vec<GridPos> {
        let movement = u32::try_from(self.unit.stats.movement).unwrap_or(0);
        let mut tiles: BTreeSet<GridPos> = self
            .grid
            .movement_range(self.origin, movement, self.unit.movement_type, &self.occupied_tiles())
            .into_iter()
            .collect();
        tiles.insert(self.origin);
        tiles.into_iter().collect()
    }

    /// Tiles the equipped weapon reaches from the current tile. Unarmed
    /// units reach adjacent tiles only.
    #[must_use]
    pub fn current_attack_tiles(&self) -> BTreeSet<GridPos> {
        let range = self.unit.weapon.as_ref().map_or(WeaponRange::MELEE, |weapon| weapon.range);
        self.grid
            .attack_range(&[self.origin], range.min, range.max)
            .into_iter()
            .collect()
    }

    /// Distance from the acting unit's tile.
    #[must_use]
    pub fn distance_from_origin(&self, pos: GridPos) -> u32 {
        self.grid.distance(self.origin, pos)
    }

    /// Wait without moving.
    #[must_use]
    pub fn wait_in_place(&self) -> CombatAction {
        CombatAction::wait_at(self.unit.id.clone(), self.origin)
    }
}

fn on_field<'u>(units: &'u [CombatantSnapshot]) -> impl Iterator<Item = (&'u CombatantSnapshot, GridPos)> + 'u {
    units
        .iter()
        .filter(|unit| unit.alive)
        .filter_map(|unit| unit.position.map(|pos| (unit, pos)))
}

/// First element with the greatest key.
///
/// `Iterator::max_by_key` keeps the last of equal maxima; policies prefer
/// input order on full ties.
pub(crate) fn first_max_by_key<T, K: Ord>(items: impl IntoIterator<Item = T>, mut key: impl FnMut(&T) -> K) -> Option<T> {
    let mut best: Option<(K, T)> = None;
    for item in items {
        let k = key(&item);
        if best.as_ref().map_or(true, |(best_key, _)| k > *best_key) {
            best = Some((k, item));
        }
    }
    best.map(|(_, item)| item)
}

/// Dispatches each unit to its behavior's policy.
#[derive(Debug, Clone, Default)]
pub struct AiSystem {
    aggressive: AggressivePolicy,
    defensive: DefensivePolicy,
    support: SupportPolicy,
    flanker: FlankerPolicy,
    boss: BossPolicy,
}

impl AiSystem {
    /// Create the dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy for a behavior.
    #[must_use]
    pub fn policy(&self, behavior: AiBehavior) -> &dyn TacticalPolicy {
        match behavior {
            AiBehavior::Aggressive => &self.aggressive,
            AiBehavior::Defensive => &self.defensive,
            AiBehavior::Support => &self.support,
            AiBehavior::Flanker => &self.flanker,
            AiBehavior::Boss => &self.boss,
        }
    }

    /// Decide what `unit` does this turn.
    ///
    /// Fallen or undeployed units wait with no destination. Units without a
    /// behavior act aggressively.
    #[must_use]
    pub fn calculate_action(
        &self,
        unit: &CombatantSnapshot,
        allies: &[CombatantSnapshot],
        enemies: &[CombatantSnapshot],
        grid: &dyn GridQuery,
    ) -> CombatAction {
        let Some(ctx) = DecisionContext::new(unit, allies, enemies, grid) else {
            tracing::debug!(unit = %unit.id, "Unit cannot act, waiting");
            return CombatAction::idle(unit.id.clone());
        };

        let behavior = unit.ai_behavior.unwrap_or_default();
        let action = self.policy(behavior).decide(&ctx);
        tracing::debug!(unit = %unit.id, ?behavior, ?action, "AI decision");
        action
    }
}
