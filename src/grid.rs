use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error};

use crate::cell::{Cell, CellId, Occupancy, Position, WorldPoint};
use crate::collection::IndexedCollection;
use crate::config::{GridSize, WorldExtent};
use crate::error::{ConsistencyError, GridError};

/// Result of a food spawn attempt.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FoodSpawn {
    Placed(Position),
    /// No free cell is left: the snake covers the whole board.
    BoardFull,
}

/// The board: an arena of cells plus the free/snake membership collections.
///
/// Cells are laid out column-major (`x * height + y`), which is also the
/// initial order of the free collection.
#[derive(Debug, Clone)]
pub struct Grid {
    size: GridSize,
    world: WorldExtent,
    cell_extent: (f32, f32),
    cells: Vec<Cell>,
    free: IndexedCollection<CellId>,
    snake: IndexedCollection<CellId>,
    food: Option<CellId>,
    rng: StdRng,
}

impl Grid {
    /// Builds an all-empty grid stretched over `world`.
    #[must_use]
    pub fn new(size: GridSize, world: WorldExtent, rng: StdRng) -> Self {
        debug_assert!(size.width > 0 && size.height > 0);

        let total = size.total_cells();
        let extent_x = world.width / (2.0 * f32::from(size.width));
        let extent_y = world.height / (2.0 * f32::from(size.height));
        let left = world.origin_x - world.width / 2.0;
        let bottom = world.origin_y - world.height / 2.0;

        let mut cells = Vec::with_capacity(total);
        for x in 0..i32::from(size.width) {
            for y in 0..i32::from(size.height) {
                let center = WorldPoint::new(
                    left + x as f32 * extent_x * 2.0 + extent_x,
                    bottom + y as f32 * extent_y * 2.0 + extent_y,
                );
                cells.push(Cell::new(Position::new(x, y), center));
            }
        }

        let mut free = IndexedCollection::with_capacity(total);
        for index in 0..total {
            // Capacity equals the cell count, so this cannot overflow.
            let _ = free.add(CellId(index), cells.as_mut_slice());
        }

        Self {
            size,
            world,
            cell_extent: (extent_x, extent_y),
            cells,
            free,
            snake: IndexedCollection::with_capacity(total),
            food: None,
            rng,
        }
    }

    /// Grid where every cell is one world unit, for drivers that don't care
    /// about world space.
    #[must_use]
    pub fn with_seed(size: GridSize, seed: u64) -> Self {
        let world = WorldExtent {
            width: f32::from(size.width),
            height: f32::from(size.height),
            ..WorldExtent::default()
        };
        Self::new(size, world, StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    #[must_use]
    pub fn world(&self) -> WorldExtent {
        self.world
    }

    /// Full width and height of one cell in world units.
    #[must_use]
    pub fn cell_size(&self) -> (f32, f32) {
        (self.cell_extent.0 * 2.0, self.cell_extent.1 * 2.0)
    }

    #[must_use]
    pub fn id_of(&self, position: Position) -> Option<CellId> {
        if !position.is_within_bounds(self.size) {
            return None;
        }
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        Some(CellId(x * usize::from(self.size.height) + y))
    }

    #[must_use]
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.0]
    }

    #[must_use]
    pub fn cell_at(&self, position: Position) -> Option<&Cell> {
        self.id_of(position).map(|id| self.cell(id))
    }

    /// Occupancy of `position`, or `None` outside the grid.
    #[must_use]
    pub fn occupancy_at(&self, position: Position) -> Option<Occupancy> {
        self.cell_at(position).map(Cell::occupancy)
    }

    /// All cells in column-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Nearest cell to a world-space point; points outside the grid clamp to
    /// the border cells.
    #[must_use]
    pub fn node_from_world_point(&self, point: WorldPoint) -> &Cell {
        let left = self.world.origin_x - self.world.width / 2.0;
        let bottom = self.world.origin_y - self.world.height / 2.0;
        let x = nearest_index(point.x - left, self.world.width, self.size.width);
        let y = nearest_index(point.y - bottom, self.world.height, self.size.height);
        &self.cells[x * usize::from(self.size.height) + y]
    }

    #[must_use]
    pub fn free_cells(&self) -> &IndexedCollection<CellId> {
        &self.free
    }

    /// Snake body from oldest (tail) to newest (head).
    #[must_use]
    pub fn snake_cells(&self) -> &IndexedCollection<CellId> {
        &self.snake
    }

    #[must_use]
    pub fn food_cell(&self) -> Option<CellId> {
        self.food
    }

    #[must_use]
    pub fn food_position(&self) -> Option<Position> {
        self.food.map(|id| self.cell(id).position())
    }

    #[must_use]
    pub fn snake_len(&self) -> usize {
        self.snake.len()
    }

    #[must_use]
    pub fn snake_head(&self) -> Option<Position> {
        self.snake.newest().map(|id| self.cell(id).position())
    }

    #[must_use]
    pub fn snake_tail(&self) -> Option<Position> {
        self.snake.oldest().map(|id| self.cell(id).position())
    }

    /// Snake positions from tail to head.
    pub fn snake_positions(&self) -> impl DoubleEndedIterator<Item = Position> + '_ {
        self.snake.iter().map(|id| self.cell(id).position())
    }

    /// Promotes the cell at `position` to a snake cell (appended as the head).
    pub fn add_snake_cell(&mut self, position: Position) -> Result<(), GridError> {
        let id = self.require_id(position)?;
        self.add_snake_node(id)
    }

    /// Promotes `id` to a snake cell. Empty cells leave the free collection
    /// first; a food cell also clears the food reference.
    pub fn add_snake_node(&mut self, id: CellId) -> Result<(), GridError> {
        let Position { x, y } = self.cell(id).position();
        match self.cell(id).occupancy() {
            Occupancy::Snake => return Err(violation(GridError::AlreadySnake { x, y })),
            Occupancy::Empty => {
                self.free
                    .remove(id, self.cells.as_mut_slice())
                    .map_err(|err| violation(err.into()))?;
            }
            Occupancy::Food => {
                if self.food == Some(id) {
                    self.food = None;
                }
            }
        }

        self.snake
            .add(id, self.cells.as_mut_slice())
            .map_err(|err| violation(err.into()))?;
        self.cells[id.0].set_occupancy(Occupancy::Snake);
        Ok(())
    }

    /// Eats the current food cell: it becomes the new head and the food
    /// reference is cleared. The tail is kept.
    pub fn consume_food(&mut self, id: CellId) -> Result<(), GridError> {
        if self.food != Some(id) {
            let Position { x, y } = self.cell(id).position();
            return Err(violation(GridError::CellNotFree { x, y }));
        }

        self.food = None;
        self.add_snake_node(id)
    }

    /// Slides the snake onto the empty cell `id`: the oldest snake cell goes
    /// back to the free collection and `id` becomes the head.
    ///
    /// Returns the position of the evicted tail.
    pub fn advance_into(&mut self, id: CellId) -> Result<Position, GridError> {
        let Position { x, y } = self.cell(id).position();
        if self.cell(id).occupancy() != Occupancy::Empty {
            return Err(violation(GridError::CellNotFree { x, y }));
        }

        let tail = self
            .snake
            .remove_oldest(self.cells.as_mut_slice())
            .map_err(|err| violation(err.into()))?;
        self.cells[tail.0].set_occupancy(Occupancy::Empty);
        // The tail just left, so the free collection has room for it.
        let _ = self.free.add(tail, self.cells.as_mut_slice());

        let _ = self.free.remove(id, self.cells.as_mut_slice());
        self.cells[id.0].set_occupancy(Occupancy::Snake);
        let _ = self.snake.add(id, self.cells.as_mut_slice());

        Ok(self.cell(tail).position())
    }

    /// Draws a uniformly random free cell and makes it the food cell.
    pub fn spawn_food(&mut self) -> Result<FoodSpawn, GridError> {
        if let Some(existing) = self.food {
            let Position { x, y } = self.cell(existing).position();
            return Err(violation(GridError::FoodAlreadyPresent { x, y }));
        }

        if self.free.is_empty() {
            return Ok(FoodSpawn::BoardFull);
        }

        let id = self
            .free
            .remove_random(&mut self.rng, self.cells.as_mut_slice())
            .map_err(GridError::from)?;
        self.cells[id.0].set_occupancy(Occupancy::Food);
        self.food = Some(id);

        let position = self.cell(id).position();
        debug!(x = position.x, y = position.y, "food spawned");
        Ok(FoodSpawn::Placed(position))
    }

    /// Puts the food on a specific empty cell instead of a random one.
    pub fn place_food(&mut self, position: Position) -> Result<(), GridError> {
        let id = self.require_id(position)?;
        if let Some(existing) = self.food {
            let Position { x, y } = self.cell(existing).position();
            return Err(violation(GridError::FoodAlreadyPresent { x, y }));
        }
        if self.cell(id).occupancy() != Occupancy::Empty {
            return Err(violation(GridError::CellNotFree {
                x: position.x,
                y: position.y,
            }));
        }

        self.free
            .remove(id, self.cells.as_mut_slice())
            .map_err(|err| violation(err.into()))?;
        self.cells[id.0].set_occupancy(Occupancy::Food);
        self.food = Some(id);
        Ok(())
    }

    /// Verifies the cell-count and tag/membership invariants.
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        let food = usize::from(self.food.is_some());
        let total = self.size.total_cells();
        if self.free.len() + self.snake.len() + food != total {
            return Err(ConsistencyError::CountMismatch {
                free: self.free.len(),
                snake: self.snake.len(),
                food,
                total,
            });
        }

        if let Some(id) = self.food {
            if self.cell(id).occupancy() != Occupancy::Food {
                let Position { x, y } = self.cell(id).position();
                return Err(ConsistencyError::DanglingFood { x, y });
            }
        }

        for (index, cell) in self.cells.iter().enumerate() {
            let id = CellId(index);
            let in_free = self.free.contains(id, self.cells.as_slice());
            let in_snake = self.snake.contains(id, self.cells.as_slice());
            let (tag, agrees) = match cell.occupancy() {
                Occupancy::Empty => ("empty", in_free && !in_snake),
                Occupancy::Snake => ("snake", in_snake && !in_free),
                Occupancy::Food => ("food", !in_free && !in_snake && self.food == Some(id)),
            };
            if !agrees {
                let Position { x, y } = cell.position();
                return Err(ConsistencyError::TagMismatch { x, y, tag });
            }
        }

        Ok(())
    }

    fn require_id(&self, position: Position) -> Result<CellId, GridError> {
        self.id_of(position).ok_or_else(|| {
            violation(GridError::OutOfBounds {
                x: position.x,
                y: position.y,
            })
        })
    }
}

fn nearest_index(offset: f32, extent: f32, count: u16) -> usize {
    let percent = (offset / extent).clamp(0.0, 1.0);
    // `percent` is within [0, 1], so the product fits the index range.
    (f32::from(count - 1) * percent).round() as usize
}

fn violation(err: GridError) -> GridError {
    error!(%err, "grid contract violation");
    err
}
