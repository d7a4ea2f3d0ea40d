use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};

use crate::cell::{Occupancy, Position};
use crate::config::GridSize;
use crate::simulation::{DeathCause, SimulationState, SnakeSimulation};

/// Terminal columns used by one grid cell, so cells look roughly square.
pub const CELL_COLUMNS: u16 = 2;

const GLYPH_SNAKE: &str = "██";
const GLYPH_FOOD: &str = "◆◆";
const GLYPH_EMPTY: &str = " ·";

/// Values owned by the driver that the frame shows alongside the board.
#[derive(Debug, Clone, Copy)]
pub struct HudInfo {
    pub score: u32,
    pub paused: bool,
}

/// Renders the board and a one-line status bar from read-only state.
pub fn render(frame: &mut Frame<'_>, sim: &SnakeSimulation, hud: HudInfo) {
    let [play_area, status_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());

    let block = Block::bordered().title(" grid-snake ");
    let inner = block.inner(play_area);
    frame.render_widget(block, play_area);

    render_cells(frame, inner, sim);

    frame.render_widget(
        Paragraph::new(status_line(sim, hud)).alignment(Alignment::Center),
        status_area,
    );
}

fn render_cells(frame: &mut Frame<'_>, inner: Rect, sim: &SnakeSimulation) {
    let grid = sim.grid();
    let size = grid.size();
    let head = sim.head();
    let buffer = frame.buffer_mut();

    for cell in grid.cells() {
        let Some((x, y)) = cell_to_terminal(inner, size, cell.position()) else {
            continue;
        };

        let (glyph, style) = match cell.occupancy() {
            Occupancy::Snake if cell.position() == head => (
                GLYPH_SNAKE,
                Style::new().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Occupancy::Snake => (GLYPH_SNAKE, Style::new().fg(Color::Green)),
            Occupancy::Food => (GLYPH_FOOD, Style::new().fg(Color::Red)),
            Occupancy::Empty => (GLYPH_EMPTY, Style::new().fg(Color::DarkGray)),
        };
        buffer.set_string(x, y, glyph, style);
    }
}

fn status_line(sim: &SnakeSimulation, hud: HudInfo) -> Line<'static> {
    let state = match sim.state() {
        SimulationState::Running if hud.paused => "paused [p] resume".to_owned(),
        SimulationState::Running => "[arrows] steer  [p] pause  [q] quit".to_owned(),
        SimulationState::Dead(DeathCause::OutOfBounds) => {
            "hit the wall  [r] restart  [q] quit".to_owned()
        }
        SimulationState::Dead(DeathCause::SelfCollision) => {
            "bit yourself  [r] restart  [q] quit".to_owned()
        }
        SimulationState::Won => "board filled!  [r] restart  [q] quit".to_owned(),
    };

    Line::from(format!(
        "score {}  length {}  {state}",
        hud.score,
        sim.snake_len()
    ))
}

/// Maps a grid position to the terminal cell of its left glyph column.
///
/// Row `height - 1` is drawn at the top. Returns `None` when the position is
/// off the grid or does not fit inside `inner`.
#[must_use]
pub fn cell_to_terminal(inner: Rect, size: GridSize, position: Position) -> Option<(u16, u16)> {
    if !position.is_within_bounds(size) {
        return None;
    }

    let column = u16::try_from(position.x).ok()?.checked_mul(CELL_COLUMNS)?;
    let row = size.height - 1 - u16::try_from(position.y).ok()?;

    let x = inner.x.checked_add(column)?;
    let y = inner.y.checked_add(row)?;
    if x.saturating_add(CELL_COLUMNS) > inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use super::cell_to_terminal;
    use crate::cell::Position;
    use crate::config::GridSize;

    const SIZE: GridSize = GridSize {
        width: 4,
        height: 3,
    };

    #[test]
    fn bottom_row_is_drawn_last() {
        let inner = Rect::new(1, 1, 8, 3);

        assert_eq!(
            cell_to_terminal(inner, SIZE, Position::new(0, 0)),
            Some((1, 3))
        );
        assert_eq!(
            cell_to_terminal(inner, SIZE, Position::new(3, 2)),
            Some((7, 1))
        );
    }

    #[test]
    fn cells_outside_the_area_are_skipped() {
        let narrow = Rect::new(0, 0, 5, 3);

        assert_eq!(cell_to_terminal(narrow, SIZE, Position::new(3, 0)), None);
        assert_eq!(cell_to_terminal(narrow, SIZE, Position::new(-1, 0)), None);
        assert!(cell_to_terminal(narrow, SIZE, Position::new(1, 0)).is_some());
    }
}
