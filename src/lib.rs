//! Grid snake simulation core.
//!
//! A [`Grid`](grid::Grid) owns every cell and tracks which ones are free,
//! which form the snake body and which holds the food. A
//! [`SnakeSimulation`](simulation::SnakeSimulation) advances the snake one
//! cell per tick and reports food and death through an
//! [`EventBus`](events::EventBus) owned by the driver. The terminal
//! front-end modules (`input`, `renderer`, `terminal_runtime`) only read
//! that state.

pub mod cell;
pub mod collection;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod input;
pub mod renderer;
pub mod score;
pub mod simulation;
pub mod terminal_runtime;
