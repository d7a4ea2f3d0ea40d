use std::cell::RefCell;
use std::rc::Rc;

use grid_snake::cell::{Occupancy, Position};
use grid_snake::config::SimulationConfig;
use grid_snake::events::{EventBus, GameEvent};
use grid_snake::input::Direction;
use grid_snake::score::Scoreboard;
use grid_snake::simulation::{DeathCause, SimulationState, SnakeSimulation, TickOutcome};

fn five_by_five(limit: u32, seed: u64) -> SimulationConfig {
    SimulationConfig {
        out_of_bounds_limit: limit,
        seed: Some(seed),
        ..SimulationConfig::with_grid(5, 5)
    }
}

fn event_log(bus: &mut EventBus) -> Rc<RefCell<Vec<GameEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    bus.subscribe(move |event| sink.borrow_mut().push(event));
    log
}

#[test]
fn eating_food_grows_and_respawns_elsewhere() {
    let mut bus = EventBus::new();
    let events = event_log(&mut bus);
    let mut sim = SnakeSimulation::from_body(
        five_by_five(2, 42),
        &[Position::new(0, 0)],
        Direction::Up,
        Some(Position::new(1, 0)),
    )
    .expect("valid body");

    sim.request_direction(Direction::Right);
    assert_eq!(sim.tick(&mut bus), TickOutcome::Ate);

    assert_eq!(sim.head(), Position::new(1, 0));
    assert_eq!(sim.snake_len(), 2);
    assert_eq!(*events.borrow(), vec![GameEvent::FoodEaten]);

    let food = sim.grid().food_position().expect("new food placed");
    assert_ne!(food, Position::new(1, 0));
    assert_eq!(sim.grid().occupancy_at(food), Some(Occupancy::Food));
    assert_eq!(sim.grid().free_cells().len(), 25 - 2 - 1);
    sim.grid().check_consistency().expect("consistent after eating");
}

#[test]
fn zero_tolerance_kills_on_first_out_of_bounds_tick() {
    let mut bus = EventBus::new();
    let events = event_log(&mut bus);
    let mut sim = SnakeSimulation::from_body(
        five_by_five(0, 1),
        &[Position::new(4, 4)],
        Direction::Right,
        Some(Position::new(0, 0)),
    )
    .expect("valid body");

    assert_eq!(
        sim.tick(&mut bus),
        TickOutcome::Died(DeathCause::OutOfBounds)
    );
    sim.tick(&mut bus);

    assert_eq!(*events.borrow(), vec![GameEvent::Death]);
    assert!(bus.game_over());
    assert_eq!(sim.state(), SimulationState::Dead(DeathCause::OutOfBounds));
}

#[test]
fn turning_back_into_the_body_leaves_collections_untouched() {
    let mut bus = EventBus::new();
    let events = event_log(&mut bus);
    let mut sim = SnakeSimulation::from_body(
        five_by_five(2, 3),
        &[Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)],
        Direction::Right,
        Some(Position::new(4, 4)),
    )
    .expect("valid body");
    let body_before: Vec<_> = sim.grid().snake_positions().collect();
    let free_before: Vec<_> = sim.grid().free_cells().iter().collect();

    sim.request_direction(Direction::Left);
    assert_eq!(
        sim.tick(&mut bus),
        TickOutcome::Died(DeathCause::SelfCollision)
    );

    assert_eq!(*events.borrow(), vec![GameEvent::Death]);
    assert_eq!(sim.grid().snake_positions().collect::<Vec<_>>(), body_before);
    assert_eq!(sim.grid().free_cells().iter().collect::<Vec<_>>(), free_before);
    assert_eq!(sim.head(), Position::new(2, 0));
}

#[test]
fn death_comes_exactly_after_limit_plus_one_attempts() {
    for limit in 0..4 {
        let mut bus = EventBus::new();
        let mut sim = SnakeSimulation::from_body(
            five_by_five(limit, 5),
            &[Position::new(0, 2)],
            Direction::Left,
            Some(Position::new(4, 4)),
        )
        .expect("valid body");

        for attempt in 1..=limit {
            assert_eq!(
                sim.tick(&mut bus),
                TickOutcome::Blocked { attempts: attempt }
            );
            assert!(!bus.game_over());
        }
        assert_eq!(
            sim.tick(&mut bus),
            TickOutcome::Died(DeathCause::OutOfBounds)
        );
    }
}

#[test]
fn long_random_walk_preserves_grid_invariants() {
    let mut bus = EventBus::new();
    let score = Scoreboard::attach(&mut bus, 1);
    let config = SimulationConfig {
        seed: Some(99),
        out_of_bounds_limit: 1,
        ..SimulationConfig::with_grid(8, 6)
    };
    let mut sim = SnakeSimulation::new(config).expect("valid config");
    let total = sim.grid().size().total_cells();

    // Clockwise spiral-ish steering that keeps the snake mostly alive.
    let route = [
        Direction::Up,
        Direction::Up,
        Direction::Right,
        Direction::Right,
        Direction::Down,
        Direction::Down,
        Direction::Right,
    ];
    let mut eaten = 0;
    for step in 0..200 {
        sim.request_direction(route[step % route.len()]);
        let outcome = sim.tick(&mut bus);
        if outcome == TickOutcome::Ate {
            eaten += 1;
        }

        let grid = sim.grid();
        let food = usize::from(grid.food_cell().is_some());
        assert_eq!(grid.free_cells().len() + grid.snake_len() + food, total);
        grid.check_consistency().expect("invariants hold every tick");
        assert_eq!(grid.snake_head(), Some(sim.head()));

        if !sim.can_move() {
            break;
        }
    }

    assert_eq!(score.current(), eaten);
}

#[test]
fn demo_mode_eventually_fills_the_board() {
    let mut bus = EventBus::new();
    let events = event_log(&mut bus);
    let config = SimulationConfig {
        seed: Some(8),
        initial_length: 2,
        movement: grid_snake::config::MovementMode::Cycle,
        ..SimulationConfig::with_grid(4, 3)
    };
    let mut sim = SnakeSimulation::new(config).expect("valid config");

    let mut ticks = 0;
    while sim.can_move() && ticks < 10_000 {
        sim.tick(&mut bus);
        ticks += 1;
    }

    assert_eq!(sim.state(), SimulationState::Won);
    assert_eq!(sim.snake_len(), 12);
    let log = events.borrow();
    assert_eq!(
        log.iter().filter(|event| **event == GameEvent::FoodEaten).count(),
        10
    );
    assert_eq!(log.last(), Some(&GameEvent::BoardFilled));
}
