//! Terrain data for map tiles.

use serde::{Deserialize, Serialize};

use crate::units::MovementType;

/// Canonical terrain classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TerrainKind {
    /// Open ground.
    #[default]
    Plain,
    /// Trees: cover for infantry, slow for horses.
    Forest,
    /// Fortified position: the best cover on the map.
    Fortress,
    /// Raised ground.
    Hill,
    /// High ground, impassable for armor and horses.
    Mountain,
    /// Settlement.
    Village,
    /// Only fliers can cross.
    Water,
    /// Impassable for everyone.
    Wall,
}

impl TerrainKind {
    /// Standard terrain stats for this kind.
    #[must_use]
    pub const fn view(self) -> TerrainView {
        let (defense_bonus, evasion_bonus, height_level, costs) = match self {
            TerrainKind::Plain => (0, 0, 0, MovementCosts::uniform(1)),
            TerrainKind::Forest => (1, 20, 0, MovementCosts::new(Some(2), Some(2), Some(3), Some(1))),
            TerrainKind::Fortress => (2, 20, 1, MovementCosts::new(Some(2), Some(2), Some(2), Some(1))),
            TerrainKind::Hill => (1, 10, 1, MovementCosts::new(Some(2), Some(3), Some(3), Some(1))),
            TerrainKind::Mountain => (2, 30, 2, MovementCosts::new(Some(4), None, None, Some(1))),
            TerrainKind::Village => (0, 10, 0, MovementCosts::uniform(1)),
            TerrainKind::Water => (0, 0, 0, MovementCosts::new(None, None, None, Some(1))),
            TerrainKind::Wall => (0, 0, 0, MovementCosts::new(None, None, None, None)),
        };
        TerrainView {
            kind: self,
            defense_bonus,
            evasion_bonus,
            height_level,
            costs,
        }
    }
}

/// Movement point cost to enter a tile, per movement type. `None` is impassable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementCosts {
    /// Foot soldiers.
    pub infantry: Option<u32>,
    /// Armored units.
    pub armored: Option<u32>,
    /// Mounted units.
    pub cavalry: Option<u32>,
    /// Fliers.
    pub flying: Option<u32>,
}

impl MovementCosts {
    /// Explicit costs per movement type.
    #[must_use]
    pub const fn new(
        infantry: Option<u32>,
        armored: Option<u32>,
        cavalry: Option<u32>,
        flying: Option<u32>,
    ) -> Self {
        Self {
            infantry,
            armored,
            cavalry,
            flying,
        }
    }

    /// Same cost for every movement type.
    #[must_use]
    pub const fn uniform(cost: u32) -> Self {
        Self::new(Some(cost), Some(cost), Some(cost), Some(cost))
    }

    /// Cost for one movement type.
    #[must_use]
    pub const fn for_type(&self, movement_type: MovementType) -> Option<u32> {
        match movement_type {
            MovementType::Infantry => self.infantry,
            MovementType::Armored => self.armored,
            MovementType::Cavalry => self.cavalry,
            MovementType::Flying => self.flying,
        }
    }
}

/// Terrain of one tile as seen by combat and movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainView {
    /// Terrain class.
    pub kind: TerrainKind,
    /// Flat damage reduction for the unit standing here.
    pub defense_bonus: i32,
    /// Hit reduction for attacks against the unit standing here.
    pub evasion_bonus: i32,
    /// Height level for height advantage.
    pub height_level: i32,
    /// Movement costs.
    pub costs: MovementCosts,
}

impl TerrainView {
    /// Open ground with no bonuses at height 0.
    #[must_use]
    pub const fn plain() -> Self {
        TerrainKind::Plain.view()
    }

    /// Builder method to override the height level.
    #[must_use]
    pub const fn with_height(mut self, height_level: i32) -> Self {
        self.height_level = height_level;
        self
    }

    /// Whether a unit of `movement_type` may enter this tile.
    #[must_use]
    pub const fn is_passable(&self, movement_type: MovementType) -> bool {
        self.costs.for_type(movement_type).is_some()
    }

    /// Cover value used by defensive AI: defense plus evasion.
    #[must_use]
    pub const fn cover(&self) -> i32 {
        self.defense_bonus + self.evasion_bonus
    }
}

impl Default for TerrainView {
    fn default() -> Self {
        Self::plain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_has_no_bonuses() {
        let plain = TerrainView::plain();
        assert_eq!(plain.defense_bonus, 0);
        assert_eq!(plain.evasion_bonus, 0);
        assert_eq!(plain.height_level, 0);
        assert!(plain.is_passable(MovementType::Armored));
    }

    #[test]
    fn test_mountain_blocks_cavalry() {
        let mountain = TerrainKind::Mountain.view();
        assert!(!mountain.is_passable(MovementType::Cavalry));
        assert!(!mountain.is_passable(MovementType::Armored));
        assert_eq!(mountain.costs.for_type(MovementType::Infantry), Some(4));
        assert_eq!(mountain.costs.for_type(MovementType::Flying), Some(1));
    }

    #[test]
    fn test_wall_blocks_everyone() {
        let wall = TerrainKind::Wall.view();
        assert!(!wall.is_passable(MovementType::Flying));
        assert!(!wall.is_passable(MovementType::Infantry));
    }

    #[test]
    fn test_cover_score() {
        assert_eq!(TerrainKind::Forest.view().cover(), 21);
        assert_eq!(TerrainKind::Fortress.view().cover(), 22);
    }
}
