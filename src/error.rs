use std::io;

use thiserror::Error;

/// Failures raised by [`IndexedCollection`](crate::collection::IndexedCollection).
///
/// Every variant is a caller contract violation; the collection is left
/// untouched when one is returned.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum CollectionError {
    #[error("collection is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },
    #[error("collection is empty")]
    Empty,
    #[error("item does not belong to this collection (slot {slot})")]
    NotMember { slot: usize },
}

/// Precondition failures on [`Grid`](crate::grid::Grid) mutations.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum GridError {
    #[error("cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
    #[error("cell ({x}, {y}) is already part of the snake")]
    AlreadySnake { x: i32, y: i32 },
    #[error("food already present at ({x}, {y})")]
    FoodAlreadyPresent { x: i32, y: i32 },
    #[error("cell ({x}, {y}) is not free")]
    CellNotFree { x: i32, y: i32 },
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failures while assembling a [`SnakeSimulation`](crate::simulation::SnakeSimulation).
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("the grid holds no snake cells")]
    EmptySnake,
    #[error("invalid snake body: {0}")]
    InvalidSnakeBody(String),
}

/// First broken invariant found by [`Grid::check_consistency`](crate::grid::Grid::check_consistency).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConsistencyError {
    #[error("{free} free + {snake} snake + {food} food cells != {total} grid cells")]
    CountMismatch {
        free: usize,
        snake: usize,
        food: usize,
        total: usize,
    },
    #[error("cell ({x}, {y}) is tagged {tag} but its membership disagrees")]
    TagMismatch { x: i32, y: i32, tag: &'static str },
    #[error("food reference points at ({x}, {y}) which is not tagged food")]
    DanglingFood { x: i32, y: i32 },
}
