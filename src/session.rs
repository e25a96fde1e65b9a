//! One game from first board to game over: key handling, the feasibility
//! gate, move + seed, and the text loop used by the binary.

use std::io::{BufRead, Write};

use rand::Rng;

use crate::config::{KeyAction, Keymap};
use crate::engine::{Board, EngineError, Move, MoveSummary};
use crate::render::BoardView;

/// Result of feeding one key to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Blank input line.
    Ignored,
    /// The board moved and a new cell was seeded at `seeded`.
    Moved { dir: Move, summary: MoveSummary, seeded: usize },
    /// Nothing can slide that way; the board is untouched.
    Blocked(Move),
    /// The key is not bound.
    Invalid(char),
    Quit,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub score: u64,
    pub moves: u32,
    pub largest_cell: u32,
    pub max_merges_per_move: u8,
    /// Left by the player (quit key or end of input) rather than by game over.
    pub quit: bool,
}

pub struct Session<R> {
    board: Board,
    rng: R,
    keys: Keymap,
    history_best: u64,
}

/// Key carried by an input line: its last character, ignoring the line ending.
pub fn last_key(line: &str) -> Option<char> {
    line.trim_end_matches(['\r', '\n']).chars().last()
}

impl<R: Rng> Session<R> {
    /// Start a fresh game. `history_best` is the stored best score shown
    /// alongside the board.
    pub fn new(mut rng: R, keys: Keymap, history_best: u64) -> Self {
        let board = Board::new(&mut rng);
        Self::with_board(board, rng, keys, history_best)
    }

    pub fn with_board(board: Board, rng: R, keys: Keymap, history_best: u64) -> Self {
        Session { board, rng, keys, history_best }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_over(&self) -> bool {
        self.board.no_moves_remain()
    }

    pub fn handle_line(&mut self, line: &str) -> Result<Turn, EngineError> {
        match last_key(line) {
            Some(key) => self.handle_key(key),
            None => Ok(Turn::Ignored),
        }
    }

    pub fn handle_key(&mut self, key: char) -> Result<Turn, EngineError> {
        let turn = match self.keys.action(key) {
            None => Turn::Invalid(key),
            Some(KeyAction::Quit) => Turn::Quit,
            Some(KeyAction::Move(dir)) if !self.board.move_possible(dir) => Turn::Blocked(dir),
            Some(KeyAction::Move(dir)) => {
                let summary = self.board.move_board(dir);
                // a feasible move always leaves at least one slot empty
                let seeded = self.board.seed_random_cell(&mut self.rng)?;
                Turn::Moved { dir, summary, seeded }
            }
        };
        log::debug!("key {key:?}: {turn:?}");
        Ok(turn)
    }

    pub fn outcome(&self, quit: bool) -> Outcome {
        Outcome {
            score: self.board.score(),
            moves: self.board.move_count(),
            largest_cell: self.board.largest_cell(),
            max_merges_per_move: self.board.max_merges_per_move(),
            quit,
        }
    }

    fn print_board<W: Write>(&self, out: &mut W, color: bool) -> std::io::Result<()> {
        if self.history_best > self.board.score() {
            writeln!(out, "\t\t\t\tHistory high: {}", self.history_best)?;
        }
        write!(out, "{}", BoardView::new(&self.board, color))
    }

    /// Play until game over, the quit key, or end of input.
    pub fn run<I: BufRead, W: Write>(&mut self, mut input: I, out: &mut W, color: bool) -> anyhow::Result<Outcome> {
        writeln!(out, "\t\t\t\tHistory high: {}", self.history_best)?;
        write!(out, "{}", BoardView::new(&self.board, color))?;

        let mut line = String::new();
        while !self.is_over() {
            out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                log::info!("input closed, ending session");
                return Ok(self.outcome(true));
            }
            match self.handle_line(&line)? {
                Turn::Ignored => continue,
                Turn::Quit => return Ok(self.outcome(true)),
                Turn::Invalid(key) => writeln!(out, "{key} is not a valid move")?,
                Turn::Blocked(_) => writeln!(out, "You cannot move that way!")?,
                Turn::Moved { .. } => {}
            }
            self.print_board(out, color)?;
        }

        writeln!(out, "No moves left. Game over!")?;
        Ok(self.outcome(false))
    }
}
