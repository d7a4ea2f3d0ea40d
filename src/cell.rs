use crate::config::GridSize;
use crate::input::Direction;

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(bounds.width)
            && self.y < i32::from(bounds.height)
    }

    /// Returns the neighbouring position one step towards `direction`.
    #[must_use]
    pub fn stepped(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A point in continuous world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
}

impl WorldPoint {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// What currently sits on a cell.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum Occupancy {
    #[default]
    Empty,
    Snake,
    Food,
}

/// Stable handle to a cell inside its grid's arena.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct CellId(pub(crate) usize);

impl CellId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One addressable grid position.
///
/// The slot is the cell's own position inside whichever collection holds it.
/// It is stale while the cell is food and only the owning collection writes it.
#[derive(Debug, Clone)]
pub struct Cell {
    position: Position,
    center: WorldPoint,
    occupancy: Occupancy,
    slot: usize,
}

impl Cell {
    pub(crate) fn new(position: Position, center: WorldPoint) -> Self {
        Self {
            position,
            center,
            occupancy: Occupancy::Empty,
            slot: 0,
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// World-space center, fixed at grid construction.
    #[must_use]
    pub fn center(&self) -> WorldPoint {
        self.center
    }

    #[must_use]
    pub fn occupancy(&self) -> Occupancy {
        self.occupancy
    }

    /// Membership index inside the collection currently holding this cell.
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub(crate) fn set_occupancy(&mut self, occupancy: Occupancy) {
        self.occupancy = occupancy;
    }
}

/// Gives a collection write access to the membership index of its items.
pub trait Membership<K> {
    fn slot(&self, key: K) -> usize;
    fn set_slot(&mut self, key: K, slot: usize);
}

impl Membership<CellId> for [Cell] {
    fn slot(&self, key: CellId) -> usize {
        self[key.0].slot
    }

    fn set_slot(&mut self, key: CellId, slot: usize) {
        self[key.0].slot = slot;
    }
}
