//! Grid queries used by the AI for reachability and range.
//!
//! The AI only talks to the map through [`GridQuery`]. Implementors supply
//! tile lookup and adjacency; movement and attack ranges have default
//! implementations built on those two, so a custom map type gets the same
//! deterministic ordering as [`TileGrid`].
//!
//! All returned position lists are sorted, which keeps every AI decision
//! reproducible regardless of how the map stores its tiles.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::terrain::{TerrainKind, TerrainView};
use crate::units::MovementType;

/// Tile coordinates. `y` grows downward, so "north" is `y - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct GridPos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPos {
    /// Create a position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by a delta.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The tile directly north (one row up).
    #[must_use]
    pub const fn north(self) -> Self {
        self.offset(0, -1)
    }
}

/// Tiling of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GridType {
    /// Four-neighbor square grid with Manhattan distance.
    #[default]
    Square,
    /// Axial-coordinate hex grid with six neighbors.
    Hex,
}

/// Orthogonal neighbor offsets on a square grid: north, east, south, west.
const SQUARE_NEIGHBORS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Axial neighbor offsets on a hex grid.
const HEX_NEIGHBORS: [(i32, i32); 6] = [(0, -1), (1, -1), (1, 0), (0, 1), (-1, 1), (-1, 0)];

/// Distance between two tiles for the given grid type.
#[must_use]
pub fn grid_distance(a: GridPos, b: GridPos, grid_type: GridType) -> u32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    match grid_type {
        GridType::Square => dx.unsigned_abs() + dy.unsigned_abs(),
        GridType::Hex => (dx.unsigned_abs() + dy.unsigned_abs() + (dx + dy).unsigned_abs()) / 2,
    }
}

/// Neighbor offsets for a grid type.
#[must_use]
pub fn neighbor_offsets(grid_type: GridType) -> &'static [(i32, i32)] {
    match grid_type {
        GridType::Square => &SQUARE_NEIGHBORS,
        GridType::Hex => &HEX_NEIGHBORS,
    }
}

/// A node in the movement search frontier.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct RangeNode {
    cost: u32,
    pos: GridPos,
}

impl Ord for RangeNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for cheapest-first, then lowest position.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for RangeNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Map queries consumed by the tactical AI.
pub trait GridQuery {
    /// Tiling of this map.
    fn grid_type(&self) -> GridType {
        GridType::Square
    }

    /// Terrain at `pos`, or `None` outside the map.
    fn tile(&self, pos: GridPos) -> Option<&TerrainView>;

    /// In-bounds neighbors of `pos`, in a fixed order.
    fn adjacent_positions(&self, pos: GridPos) -> Vec<GridPos> {
        neighbor_offsets(self.grid_type())
            .iter()
            .map(|&(dx, dy)| pos.offset(dx, dy))
            .filter(|p| self.tile(*p).is_some())
            .collect()
    }

    /// Distance between two tiles.
    fn distance(&self, a: GridPos, b: GridPos) -> u32 {
        grid_distance(a, b, self.grid_type())
    }

    /// Tiles a unit can end its move on, excluding `origin`.
    ///
    /// Each step pays the entered tile's cost for `movement_type`; the total
    /// may not exceed `movement`. Tiles in `occupants` cannot be entered.
    fn movement_range(
        &self,
        origin: GridPos,
        movement: u32,
        movement_type: MovementType,
        occupants: &[GridPos],
    ) -> Vec<GridPos> {
        let blocked: BTreeSet<GridPos> = occupants.iter().copied().filter(|p| *p != origin).collect();
        let mut best: HashMap<GridPos, u32> = HashMap::new();
        let mut frontier = BinaryHeap::new();

        best.insert(origin, 0);
        frontier.push(RangeNode {
            cost: 0,
            pos: origin,
        });

        while let Some(RangeNode { cost, pos }) = frontier.pop() {
            if best.get(&pos).is_some_and(|&known| cost > known) {
                continue;
            }
            for next in self.adjacent_positions(pos) {
                if blocked.contains(&next) {
                    continue;
                }
                let Some(step) = self.tile(next).and_then(|t| t.costs.for_type(movement_type)) else {
                    continue;
                };
                let total = cost + step;
                if total > movement {
                    continue;
                }
                if best.get(&next).map_or(true, |&known| total < known) {
                    best.insert(next, total);
                    frontier.push(RangeNode {
                        cost: total,
                        pos: next,
                    });
                }
            }
        }

        let mut tiles: Vec<GridPos> = best.into_keys().filter(|p| *p != origin).collect();
        tiles.sort_unstable();
        tiles
    }

    /// Every in-bounds tile within `[min_range, max_range]` of any origin.
    fn attack_range(&self, origins: &[GridPos], min_range: u32, max_range: u32) -> Vec<GridPos> {
        let reach = max_range as i32;
        let mut tiles = BTreeSet::new();
        for &origin in origins {
            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let candidate = origin.offset(dx, dy);
                    let distance = self.distance(origin, candidate);
                    if distance < min_range || distance > max_range {
                        continue;
                    }
                    if self.tile(candidate).is_some() {
                        tiles.insert(candidate);
                    }
                }
            }
        }
        tiles.into_iter().collect()
    }
}

/// Rectangular tile map, the reference [`GridQuery`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    /// Width in tiles.
    width: u32,
    /// Height in tiles.
    height: u32,
    /// Tiles in row-major order.
    tiles: Vec<TerrainView>,
    /// Tiling.
    #[serde(default)]
    grid_type: GridType,
}

impl TileGrid {
    /// Create a square grid of plains.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0, "TileGrid width must be positive");
        assert!(height > 0, "TileGrid height must be positive");
        Self {
            width,
            height,
            tiles: vec![TerrainView::plain(); (width as usize) * (height as usize)],
            grid_type: GridType::Square,
        }
    }

    /// Build a grid from rows of terrain kinds.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidGrid`] if there are no rows, a row is
    /// empty, or rows differ in length.
    pub fn from_rows(rows: &[Vec<TerrainKind>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(GameError::InvalidGrid("grid must have at least one tile".into()));
        }
        let mut tiles = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GameError::InvalidGrid(format!(
                    "row {y} has {} tiles, expected {width}",
                    row.len()
                )));
            }
            tiles.extend(row.iter().map(|kind| kind.view()));
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
            tiles,
            grid_type: GridType::Square,
        })
    }

    /// Build a grid from a character layout.
    ///
    /// `.` plain, `F` forest, `T` fortress, `H` hill, `M` mountain,
    /// `V` village, `~` water, `#` wall.
    ///
    /// ```
    /// use tactics_core::grid::{GridPos, GridQuery, TileGrid};
    /// use tactics_core::terrain::TerrainKind;
    ///
    /// let grid = TileGrid::parse(&["..F", "#.T"]).unwrap();
    /// assert_eq!(grid.tile(GridPos::new(2, 0)).unwrap().kind, TerrainKind::Forest);
    /// assert_eq!(grid.tile(GridPos::new(0, 1)).unwrap().kind, TerrainKind::Wall);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidGrid`] for unknown characters or ragged rows.
    pub fn parse<S: AsRef<str>>(layout: &[S]) -> Result<Self> {
        let rows = layout
            .iter()
            .enumerate()
            .map(|(y, line)| {
                line.as_ref()
                    .chars()
                    .enumerate()
                    .map(|(x, c)| terrain_from_char(c).ok_or_else(|| {
                        GameError::InvalidGrid(format!("unknown terrain '{c}' at ({x}, {y})"))
                    }))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_rows(&rows)
    }

    /// Builder method to switch the tiling.
    #[must_use]
    pub fn with_grid_type(mut self, grid_type: GridType) -> Self {
        self.grid_type = grid_type;
        self
    }

    /// Grid width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Check if a position is within grid bounds.
    #[must_use]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    #[inline]
    fn index(&self, pos: GridPos) -> usize {
        (pos.y as usize) * (self.width as usize) + (pos.x as usize)
    }

    /// Replace the terrain at `pos`. Returns `false` if out of bounds.
    pub fn set_terrain(&mut self, pos: GridPos, terrain: TerrainView) -> bool {
        if self.in_bounds(pos) {
            let index = self.index(pos);
            self.tiles[index] = terrain;
            true
        } else {
            false
        }
    }
}

impl GridQuery for TileGrid {
    fn grid_type(&self) -> GridType {
        self.grid_type
    }

    fn tile(&self, pos: GridPos) -> Option<&TerrainView> {
        if self.in_bounds(pos) {
            self.tiles.get(self.index(pos))
        } else {
            None
        }
    }
}

fn terrain_from_char(c: char) -> Option<TerrainKind> {
    Some(match c {
        '.' => TerrainKind::Plain,
        'F' => TerrainKind::Forest,
        'T' => TerrainKind::Fortress,
        'H' => TerrainKind::Hill,
        'M' => TerrainKind::Mountain,
        'V' => TerrainKind::Village,
        '~' => TerrainKind::Water,
        '#' => TerrainKind::Wall,
        _ => return None,
    })
}
