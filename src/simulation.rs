use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info};

use crate::cell::{CellId, Occupancy, Position};
use crate::config::{MovementMode, SimulationConfig};
use crate::error::{GridError, SimulationError};
use crate::events::{EventBus, GameEvent};
use crate::grid::{FoodSpawn, Grid};
use crate::input::Direction;

/// Why the snake died.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DeathCause {
    OutOfBounds,
    SelfCollision,
}

/// High-level simulation state. Everything but `Running` is terminal.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SimulationState {
    Running,
    Dead(DeathCause),
    Won,
}

/// What a single [`SnakeSimulation::tick`] did.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickOutcome {
    /// The simulation is no longer running; nothing happened.
    Idle,
    Moved,
    Ate,
    /// An out-of-bounds attempt was absorbed; the head stayed put.
    Blocked { attempts: u32 },
    Died(DeathCause),
    Won,
}

/// Shareable pending-direction slot.
///
/// The direction is a single atomic word, so an input thread can write it
/// while the driver ticks. Last write wins.
#[derive(Debug, Clone)]
pub struct DirectionInput(Arc<AtomicU8>);

impl DirectionInput {
    fn new(direction: Direction) -> Self {
        Self(Arc::new(AtomicU8::new(direction.index())))
    }

    pub fn request(&self, direction: Direction) {
        self.0.store(direction.index(), Ordering::Relaxed);
    }

    #[must_use]
    pub fn get(&self) -> Direction {
        Direction::from_index(self.0.load(Ordering::Relaxed))
    }
}

/// Per-tick snake state machine on top of a [`Grid`].
#[derive(Debug)]
pub struct SnakeSimulation {
    config: SimulationConfig,
    grid: Grid,
    current_direction: Direction,
    pending_direction: DirectionInput,
    head: Position,
    out_of_bounds_attempts: u32,
    can_move: bool,
    state: SimulationState,
    tick_count: u64,
}

impl SnakeSimulation {
    /// Builds a fresh game: initial body along the bottom edge and one food.
    ///
    /// Steered games put the head at (0, 0) with the body trailing to the
    /// right; cycle games put the tail at (0, 0) so the raster scan starts
    /// ahead of the body.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let length = i32::from(config.initial_length);
        let body: Vec<Position> = match config.movement {
            MovementMode::Steered => (0..length).rev().map(|x| Position::new(x, 0)).collect(),
            MovementMode::Cycle => (0..length).map(|x| Position::new(x, 0)).collect(),
        };

        let direction = config.initial_direction;
        Self::from_body(config, &body, direction, None)
    }

    /// Builds a game from an explicit body (tail first, head last).
    ///
    /// With `food` set, the food goes on that cell instead of a random one.
    pub fn from_body(
        config: SimulationConfig,
        body: &[Position],
        direction: Direction,
        food: Option<Position>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        check_body_shape(body)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut grid = Grid::new(config.grid, config.world, rng);
        for position in body {
            grid.add_snake_cell(*position)?;
        }
        let head = grid.snake_head().ok_or(SimulationError::EmptySnake)?;

        let mut state = SimulationState::Running;
        match food {
            Some(position) => grid.place_food(position)?,
            None => {
                if grid.spawn_food()? == FoodSpawn::BoardFull {
                    info!("initial snake already fills the board");
                    state = SimulationState::Won;
                }
            }
        }

        info!(
            width = config.grid.width,
            height = config.grid.height,
            length = body.len(),
            "new game"
        );

        Ok(Self {
            grid,
            current_direction: direction,
            pending_direction: DirectionInput::new(direction),
            head,
            out_of_bounds_attempts: 0,
            can_move: state == SimulationState::Running,
            state,
            tick_count: 0,
            config,
        })
    }

    /// Rebuilds the whole game from the stored configuration.
    ///
    /// Handles from [`SnakeSimulation::direction_input`] stay connected.
    pub fn restart(&mut self) -> Result<(), SimulationError> {
        let input = self.pending_direction.clone();
        *self = Self::new(self.config.clone())?;
        input.request(self.current_direction);
        self.pending_direction = input;
        Ok(())
    }

    /// Records the direction the next tick will use.
    pub fn request_direction(&self, direction: Direction) {
        self.pending_direction.request(direction);
    }

    /// Handle for writing the pending direction from another context.
    #[must_use]
    pub fn direction_input(&self) -> DirectionInput {
        self.pending_direction.clone()
    }

    /// Advances the snake by one cell and publishes what happened on `bus`.
    pub fn tick(&mut self, bus: &mut EventBus) -> TickOutcome {
        if !self.can_move {
            return TickOutcome::Idle;
        }
        self.tick_count += 1;

        match self.config.movement {
            MovementMode::Steered => self.steered_step(bus),
            MovementMode::Cycle => self.cycle_step(bus),
        }
    }

    fn steered_step(&mut self, bus: &mut EventBus) -> TickOutcome {
        let direction = self.pending_direction.get();
        let candidate = self.head.stepped(direction);

        let Some(target) = self.grid.id_of(candidate) else {
            self.out_of_bounds_attempts += 1;
            debug!(
                x = candidate.x,
                y = candidate.y,
                attempts = self.out_of_bounds_attempts,
                "out-of-bounds move absorbed"
            );
            if self.out_of_bounds_attempts > self.config.out_of_bounds_limit {
                return self.die(DeathCause::OutOfBounds, bus);
            }
            return TickOutcome::Blocked {
                attempts: self.out_of_bounds_attempts,
            };
        };

        self.out_of_bounds_attempts = 0;
        self.current_direction = direction;
        self.step_onto(target, bus)
    }

    fn cycle_step(&mut self, bus: &mut EventBus) -> TickOutcome {
        let size = self.grid.size();
        let Position { x, y } = self.head;
        let (next, direction) = if x + 1 < i32::from(size.width) {
            (Position::new(x + 1, y), Direction::Right)
        } else if y + 1 < i32::from(size.height) {
            (Position::new(0, y + 1), Direction::Up)
        } else {
            (Position::new(0, 0), Direction::Down)
        };

        let Some(target) = self.grid.id_of(next) else {
            return self.contract_broken(GridError::OutOfBounds {
                x: next.x,
                y: next.y,
            });
        };

        self.current_direction = direction;
        self.step_onto(target, bus)
    }

    fn step_onto(&mut self, target: CellId, bus: &mut EventBus) -> TickOutcome {
        let position = self.grid.cell(target).position();

        match self.grid.cell(target).occupancy() {
            Occupancy::Empty => match self.grid.advance_into(target) {
                Ok(tail) => {
                    self.head = position;
                    debug!(
                        x = position.x,
                        y = position.y,
                        tail_x = tail.x,
                        tail_y = tail.y,
                        "snake moved"
                    );
                    TickOutcome::Moved
                }
                Err(err) => self.contract_broken(err),
            },
            Occupancy::Snake => self.die(DeathCause::SelfCollision, bus),
            Occupancy::Food => {
                if let Err(err) = self.grid.consume_food(target) {
                    return self.contract_broken(err);
                }
                self.head = position;
                debug!(
                    x = position.x,
                    y = position.y,
                    length = self.grid.snake_len(),
                    "food eaten"
                );
                bus.publish(GameEvent::FoodEaten);

                match self.grid.spawn_food() {
                    Ok(FoodSpawn::Placed(_)) => TickOutcome::Ate,
                    Ok(FoodSpawn::BoardFull) => {
                        self.can_move = false;
                        self.state = SimulationState::Won;
                        info!(ticks = self.tick_count, "board filled");
                        bus.publish(GameEvent::BoardFilled);
                        TickOutcome::Won
                    }
                    Err(err) => self.contract_broken(err),
                }
            }
        }
    }

    fn die(&mut self, cause: DeathCause, bus: &mut EventBus) -> TickOutcome {
        self.can_move = false;
        self.state = SimulationState::Dead(cause);
        info!(
            ?cause,
            length = self.grid.snake_len(),
            ticks = self.tick_count,
            "snake died"
        );
        bus.publish(GameEvent::Death);
        TickOutcome::Died(cause)
    }

    fn contract_broken(&self, err: GridError) -> TickOutcome {
        error!(%err, "tick hit a grid contract violation");
        if cfg!(debug_assertions) {
            panic!("tick hit a grid contract violation: {err}");
        }
        TickOutcome::Idle
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> SimulationState {
        self.state
    }

    #[must_use]
    pub fn can_move(&self) -> bool {
        self.can_move
    }

    #[must_use]
    pub fn head(&self) -> Position {
        self.head
    }

    #[must_use]
    pub fn current_direction(&self) -> Direction {
        self.current_direction
    }

    #[must_use]
    pub fn pending_direction(&self) -> Direction {
        self.pending_direction.get()
    }

    #[must_use]
    pub fn out_of_bounds_attempts(&self) -> u32 {
        self.out_of_bounds_attempts
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[must_use]
    pub fn snake_len(&self) -> usize {
        self.grid.snake_len()
    }
}

fn check_body_shape(body: &[Position]) -> Result<(), SimulationError> {
    if body.is_empty() {
        return Err(SimulationError::EmptySnake);
    }

    for pair in body.windows(2) {
        let distance = (pair[0].x - pair[1].x).abs() + (pair[0].y - pair[1].y).abs();
        if distance != 1 {
            return Err(SimulationError::InvalidSnakeBody(format!(
                "({}, {}) and ({}, {}) are not adjacent",
                pair[0].x, pair[0].y, pair[1].x, pair[1].y
            )));
        }
    }

    Ok(())
}
