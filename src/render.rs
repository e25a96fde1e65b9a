//! Text rendering of a board: a status header and a boxed grid.
//!
//! The renderer only reads the board. Every cell is printed `digit_width`
//! columns wide with the value centered, so the grid stays aligned as tiles
//! grow.

use std::fmt;

use crate::engine::{decimal_digits, Board, Cell, SIDE};

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const COLOR_RESET: &str = "\x1b[0m";

/// Borrowed view of a board that knows whether to emit ANSI colors.
#[derive(Debug, Clone, Copy)]
pub struct BoardView<'a> {
    board: &'a Board,
    color: bool,
}

impl<'a> BoardView<'a> {
    pub fn new(board: &'a Board, color: bool) -> Self {
        BoardView { board, color }
    }

    fn write_cell(&self, f: &mut fmt::Formatter<'_>, cell: &Cell, width: usize) -> fmt::Result {
        let value = cell.value();
        let digits = decimal_digits(value);
        let pad = width.saturating_sub(digits);
        let left = pad / 2;
        write!(f, "{:left$}", "")?;
        if cell.is_empty() {
            write!(f, "{:digits$}", "")?;
        } else {
            match tile_color(cell).filter(|_| self.color) {
                Some(color) => write!(f, "{color}{value}{COLOR_RESET}")?,
                None => write!(f, "{value}")?,
            }
        }
        write!(f, "{:right$}", "", right = pad - left)
    }
}

/// Color for a non-empty tile. Freshly seeded tiles always stand out.
fn tile_color(cell: &Cell) -> Option<&'static str> {
    if cell.is_new() {
        return Some(RED);
    }
    match cell.value() {
        16..=64 => Some(YELLOW),
        128..=1024 => Some(MAGENTA),
        2048 => Some(CYAN),
        4096 => Some(GREEN),
        v if v >= 8192 => Some(BLUE),
        _ => None,
    }
}

impl fmt::Display for BoardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = self.board;
        writeln!(f, "Get to block {}!", board.goal())?;
        writeln!(f, "Score: {}\t\tSteps taken: {}", board.score(), board.move_count())?;

        let width = board.digit_width();
        let rule = "-".repeat((width + 1) * SIDE);
        writeln!(f, " {rule}")?;
        for row in board.cells().chunks(SIDE) {
            f.write_str("|")?;
            for cell in row {
                self.write_cell(f, cell, width)?;
                f.write_str("|")?;
            }
            writeln!(f)?;
            writeln!(f, " {rule}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&BoardView::new(self, false), f)
    }
}
