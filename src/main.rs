use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use grid_snake::config::{MovementMode, SimulationConfig};
use grid_snake::error::ConfigError;
use grid_snake::events::EventBus;
use grid_snake::input::{GameInput, InputHandler};
use grid_snake::renderer::{self, HudInfo};
use grid_snake::score::Scoreboard;
use grid_snake::simulation::SnakeSimulation;
use grid_snake::terminal_runtime::{TerminalSession, install_panic_hook};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(version, about = "Grid snake in the terminal")]
struct Cli {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width in cells.
    #[arg(long)]
    width: Option<u16>,

    /// Grid height in cells.
    #[arg(long)]
    height: Option<u16>,

    /// Consecutive out-of-bounds attempts tolerated before death.
    #[arg(long)]
    tolerance: Option<u32>,

    /// Seed for food placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Attract mode: the snake scans the board on its own.
    #[arg(long)]
    demo: bool,

    /// Write tracing output to this file (filtered by RUST_LOG).
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Invalid configuration: {error}");
            return Err(io::Error::new(io::ErrorKind::InvalidInput, error));
        }
    };

    install_panic_hook();
    let mut session = TerminalSession::enter()?;
    run(&mut session, config)
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn build_config(cli: &Cli) -> Result<SimulationConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_json_path(path)?,
        None => SimulationConfig::default(),
    };

    if cli.width.is_some() || cli.height.is_some() {
        let width = cli.width.unwrap_or(config.grid.width);
        let height = cli.height.unwrap_or(config.grid.height);
        let resized = SimulationConfig::with_grid(width, height);
        if config.initial_length > width {
            warn!(
                requested = config.initial_length,
                used = width,
                "initial length clamped to grid width"
            );
            config.initial_length = width;
        }
        config.grid = resized.grid;
        config.world = resized.world;
    }
    if let Some(tolerance) = cli.tolerance {
        config.out_of_bounds_limit = tolerance;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.demo {
        config.movement = MovementMode::Cycle;
    }

    config.validate()?;
    Ok(config)
}

fn run(session: &mut TerminalSession, config: SimulationConfig) -> io::Result<()> {
    let tick_interval = config.tick_interval();
    let food_value = config.food_value;
    let mut sim = SnakeSimulation::new(config)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

    let mut bus = EventBus::new();
    let score = Scoreboard::attach(&mut bus, food_value);
    let mut input = InputHandler::new(INPUT_POLL_TIMEOUT);
    let mut paused = false;
    let mut last_tick = Instant::now();

    loop {
        session.draw(|frame| {
            renderer::render(
                frame,
                &sim,
                HudInfo {
                    score: score.current(),
                    paused,
                },
            );
        })?;

        match input.poll_input()? {
            Some(GameInput::Quit) => break,
            Some(GameInput::Direction(direction)) => sim.request_direction(direction),
            Some(GameInput::Pause) if sim.can_move() => paused = !paused,
            Some(GameInput::Restart) if !sim.can_move() => {
                sim.restart()
                    .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
                score.reset();
                bus.begin_game();
                paused = false;
                last_tick = Instant::now();
            }
            Some(GameInput::Pause | GameInput::Restart) | None => {}
        }

        if !paused && last_tick.elapsed() >= tick_interval {
            sim.tick(&mut bus);
            last_tick = Instant::now();
        }
    }

    info!(score = score.final_score().unwrap_or(score.current()), "quit");
    Ok(())
}
