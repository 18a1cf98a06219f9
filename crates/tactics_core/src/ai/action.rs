//! Decisions emitted by the tactical AI.

use serde::{Deserialize, Serialize};

use crate::grid::GridPos;
use crate::units::UnitId;

/// A unit's chosen action for its turn.
///
/// `target_position` is where the unit ends its move. For attacks and
/// skills it is the tile the unit acts from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatAction {
    /// Do nothing this turn, optionally after moving.
    Wait {
        /// Acting unit.
        unit_id: UnitId,
        /// Tile to move to, if any.
        target_position: Option<GridPos>,
    },
    /// Move, then attack an enemy.
    Attack {
        /// Acting unit.
        unit_id: UnitId,
        /// Unit to attack.
        target_unit_id: UnitId,
        /// Tile to attack from.
        target_position: GridPos,
    },
    /// Move, then use a skill on a unit.
    Skill {
        /// Acting unit.
        unit_id: UnitId,
        /// Unit the skill targets.
        target_unit_id: UnitId,
        /// Tile to act from.
        target_position: GridPos,
        /// Skill to use.
        skill_id: String,
    },
}

impl CombatAction {
    /// Wait without moving anywhere.
    #[must_use]
    pub fn idle(unit_id: impl Into<UnitId>) -> Self {
        Self::Wait {
            unit_id: unit_id.into(),
            target_position: None,
        }
    }

    /// Wait after moving to `position`.
    #[must_use]
    pub fn wait_at(unit_id: impl Into<UnitId>, position: GridPos) -> Self {
        Self::Wait {
            unit_id: unit_id.into(),
            target_position: Some(position),
        }
    }

    /// Acting unit.
    #[must_use]
    pub fn unit_id(&self) -> &str {
        match self {
            Self::Wait { unit_id, .. } | Self::Attack { unit_id, .. } | Self::Skill { unit_id, .. } => unit_id,
        }
    }

    /// Tile the unit ends on, if it moves.
    #[must_use]
    pub fn destination(&self) -> Option<GridPos> {
        match self {
            Self::Wait { target_position, .. } => *target_position,
            Self::Attack { target_position, .. } | Self::Skill { target_position, .. } => {
                Some(*target_position)
            }
        }
    }

    /// Unit acted upon, for attacks and skills.
    #[must_use]
    pub fn target_unit_id(&self) -> Option<&str> {
        match self {
            Self::Wait { .. } => None,
            Self::Attack { target_unit_id, .. } | Self::Skill { target_unit_id, .. } => {
                Some(target_unit_id)
            }
        }
    }

    /// Whether this is a wait.
    #[must_use]
    pub const fn is_wait(&self) -> bool {
        matches!(self, Self::Wait { .. })
    }
}
