use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;
use crate::input::Direction;

/// Default grid width in cells.
pub const DEFAULT_GRID_WIDTH: u16 = 25;

/// Default grid height in cells.
pub const DEFAULT_GRID_HEIGHT: u16 = 15;

/// Base tick interval in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 200;

/// Default number of snake cells placed at game start.
pub const DEFAULT_INITIAL_LENGTH: u16 = 5;

/// Consecutive out-of-bounds attempts tolerated before the snake dies.
pub const DEFAULT_OUT_OF_BOUNDS_LIMIT: u32 = 2;

/// Score granted per food item.
pub const DEFAULT_FOOD_VALUE: u32 = 1;

/// Logical grid dimensions passed through the game as a named type.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
        }
    }
}

/// World-space rectangle the grid is stretched over, centred on `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldExtent {
    pub width: f32,
    pub height: f32,
    pub origin_x: f32,
    pub origin_y: f32,
}

impl Default for WorldExtent {
    fn default() -> Self {
        Self {
            width: f32::from(DEFAULT_GRID_WIDTH),
            height: f32::from(DEFAULT_GRID_HEIGHT),
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }
}

/// How the snake chooses its next cell.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Follows requested directions.
    #[default]
    Steered,
    /// Attract mode: raster-scans the grid and ignores input.
    Cycle,
}

/// Everything needed to build a fresh game.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub grid: GridSize,
    pub world: WorldExtent,
    pub initial_length: u16,
    pub initial_direction: Direction,
    pub out_of_bounds_limit: u32,
    pub tick_interval_ms: u64,
    pub food_value: u32,
    pub seed: Option<u64>,
    pub movement: MovementMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::default(),
            world: WorldExtent::default(),
            initial_length: DEFAULT_INITIAL_LENGTH,
            initial_direction: Direction::Up,
            out_of_bounds_limit: DEFAULT_OUT_OF_BOUNDS_LIMIT,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            food_value: DEFAULT_FOOD_VALUE,
            seed: None,
            movement: MovementMode::Steered,
        }
    }
}

impl SimulationConfig {
    /// Default configuration on a grid of the given size.
    ///
    /// The world extent follows the grid so each cell is one world unit.
    #[must_use]
    pub fn with_grid(width: u16, height: u16) -> Self {
        Self {
            grid: GridSize { width, height },
            world: WorldExtent {
                width: f32::from(width),
                height: f32::from(height),
                ..WorldExtent::default()
            },
            initial_length: DEFAULT_INITIAL_LENGTH.min(width),
            ..Self::default()
        }
    }

    /// Reads and validates a JSON config file. Missing fields take defaults.
    pub fn from_json_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the grid and simulation rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }

        let world_ok = |value: f32| value.is_finite() && value > 0.0;
        if !world_ok(self.world.width) || !world_ok(self.world.height) {
            return Err(ConfigError::Invalid(format!(
                "world extent must be positive, got {}x{}",
                self.world.width, self.world.height
            )));
        }

        if !self.world.origin_x.is_finite() || !self.world.origin_y.is_finite() {
            return Err(ConfigError::Invalid("world origin must be finite".to_owned()));
        }

        if self.initial_length == 0 || self.initial_length > self.grid.width {
            return Err(ConfigError::Invalid(format!(
                "initial length must be within 1..={}, got {}",
                self.grid.width, self.initial_length
            )));
        }

        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick interval must be greater than zero".to_owned(),
            ));
        }

        if self.initial_direction == Direction::Right && self.initial_length > 1 {
            warn!("initial direction Right points into the initial body and will be lethal");
        }

        Ok(())
    }

    /// Fixed delay between two ticks.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{GridSize, MovementMode, SimulationConfig};
    use crate::error::ConfigError;
    use crate::input::Direction;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SimulationConfig::from_json_str("{}").expect("defaults should validate");

        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.grid.total_cells(), 25 * 15);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = SimulationConfig::from_json_str(
            r#"{
                "grid": { "width": 8, "height": 6 },
                "world": { "width": 16.0, "height": 12.0 },
                "initial_length": 3,
                "initial_direction": "right",
                "movement": "cycle",
                "seed": 9
            }"#,
        )
        .expect("config should parse");

        assert_eq!(
            config.grid,
            GridSize {
                width: 8,
                height: 6
            }
        );
        assert_eq!(config.initial_length, 3);
        assert_eq!(config.initial_direction, Direction::Right);
        assert_eq!(config.movement, MovementMode::Cycle);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.out_of_bounds_limit, 2);
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        let config = SimulationConfig::with_grid(0, 4);

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn initial_length_must_fit_bottom_row() {
        let mut config = SimulationConfig::with_grid(4, 4);
        config.initial_length = 5;

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        assert!(matches!(
            SimulationConfig::from_json_str("not-json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn with_grid_clamps_initial_length() {
        let config = SimulationConfig::with_grid(3, 3);

        assert_eq!(config.initial_length, 3);
        assert!(config.validate().is_ok());
    }
}
