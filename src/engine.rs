use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of slots on the board.
pub const CELL_NUM: usize = 16;
/// Width and height of the grid.
pub const SIDE: usize = 4;
/// The first milestone shown to the player.
pub const INITIAL_GOAL: u32 = 2048;
/// Minimum render width of a cell, in columns.
pub const MIN_DIGIT_WIDTH: usize = 3;
/// Largest tile a 4x4 game can ever produce.
pub const MAX_TILE: u32 = 1 << 17;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// The direction pointing the other way.
    pub fn opposite(self) -> Move {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }
}

impl FromStr for Move {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "u" | "up" => Ok(Move::Up),
            "d" | "down" => Ok(Move::Down),
            "l" | "left" => Ok(Move::Left),
            "r" | "right" => Ok(Move::Right),
            _ => Err(EngineError::UnknownDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        };
        f.write_str(name)
    }
}

/// Caller-side contract violations. None of these are recoverable game states.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("cell index {0} is outside the 4x4 grid")]
    IndexOutOfRange(usize),
    #[error("no empty cell left to seed")]
    BoardFull,
    #[error("cell value {0} is not zero or a power of two between 2 and 131072")]
    InvalidValue(u32),
    #[error("unknown direction {0:?}")]
    UnknownDirection(String),
}

/// One slot of the grid. Flags travel with the value when it slides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    value: u32,
    is_new: bool,
    is_merged: bool,
}

impl Cell {
    /// Tile value, 0 when empty.
    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Placed by the latest seeding and not yet moved by a slide pass.
    #[inline]
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Produced by a merge during the current move.
    #[inline]
    pub fn is_merged(&self) -> bool {
        self.is_merged
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value == 0
    }
}

/// What a single `Board::move_board` pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveSummary {
    /// Whether any cell changed position or value.
    pub moved: bool,
    /// Number of merges performed.
    pub merges: u8,
    /// Score gained, i.e. the sum of all merged destination values.
    pub points: u64,
}

/// Index one step away from `index` in `dir`, or `None` when `index` is off
/// the grid or already on the boundary in that direction.
///
/// ```
/// use term_2048::engine::{neighbor, Move};
/// assert_eq!(neighbor(5, Move::Up), Some(1));
/// assert_eq!(neighbor(4, Move::Left), None);
/// assert_eq!(neighbor(16, Move::Down), None);
/// ```
pub fn neighbor(index: usize, dir: Move) -> Option<usize> {
    if index >= CELL_NUM {
        return None;
    }
    let (row, col) = (index / SIDE, index % SIDE);
    match dir {
        Move::Up if row > 0 => Some(index - SIDE),
        Move::Down if row < SIDE - 1 => Some(index + SIDE),
        Move::Left if col > 0 => Some(index - 1),
        Move::Right if col < SIDE - 1 => Some(index + 1),
        _ => None,
    }
}

/// Index on the boundary reached from `index` by moving in `dir` across an
/// otherwise empty line. The orthogonal coordinate is kept.
pub fn edge_index(index: usize, dir: Move) -> Result<usize, EngineError> {
    if index >= CELL_NUM {
        return Err(EngineError::IndexOutOfRange(index));
    }
    let (row, col) = (index / SIDE, index % SIDE);
    Ok(match dir {
        Move::Up => col,
        Move::Down => (SIDE - 1) * SIDE + col,
        Move::Left => row * SIDE,
        Move::Right => row * SIDE + SIDE - 1,
    })
}

/// Slots visited by a move in `dir`, nearest the destination edge first.
///
/// The edge line itself is skipped. A slot is only visited after every slot
/// between it and the edge has settled, so a single pass resolves merges and
/// vacated gaps correctly.
pub fn sweep_order(dir: Move) -> impl Iterator<Item = usize> {
    (1..SIDE).flat_map(move |depth| {
        (0..SIDE).map(move |line| {
            let (row, col) = match dir {
                Move::Up => (depth, line),
                Move::Down => (SIDE - 1 - depth, line),
                Move::Left => (line, depth),
                Move::Right => (line, SIDE - 1 - depth),
            };
            row * SIDE + col
        })
    })
}

/// Number of decimal digits in `n` (1 for 0).
pub fn decimal_digits(n: u32) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}

fn is_valid_value(value: u32) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

/// A 4x4 board plus the bookkeeping the player sees: score, move count,
/// the current goal and the column width needed to print the largest tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; CELL_NUM],
    score: u64,
    move_count: u32,
    goal: u32,
    largest_cell: u32,
    digit_width: usize,
    last_move_merges: u8,
    max_merges_per_move: u8,
}

impl Board {
    fn blank() -> Self {
        Board {
            cells: [Cell::default(); CELL_NUM],
            score: 0,
            move_count: 0,
            goal: INITIAL_GOAL,
            largest_cell: 0,
            digit_width: MIN_DIGIT_WIDTH,
            last_move_merges: 0,
            max_merges_per_move: 0,
        }
    }

    /// Start a game: empty grid with two seeded cells.
    ///
    /// ```
    /// use term_2048::engine::Board;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let board = Board::new(&mut rng);
    /// assert_eq!(board.count_empty(), 14);
    /// assert_eq!(board.goal(), 2048);
    /// ```
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut board = Self::blank();
        for _ in 0..2 {
            // a blank grid always has room for the opening cells
            let _ = board.seed_random_cell(rng);
        }
        board
    }

    /// Build a board from explicit row-major values. Score and move count
    /// start at zero; goal and width follow from the largest value.
    pub fn from_values(values: [u32; CELL_NUM]) -> Result<Self, EngineError> {
        let mut board = Self::blank();
        for (cell, &value) in board.cells.iter_mut().zip(values.iter()) {
            if !is_valid_value(value) {
                return Err(EngineError::InvalidValue(value));
            }
            cell.value = value;
        }
        let largest = values.iter().copied().max().unwrap_or(0);
        board.largest_cell = largest;
        board.digit_width = MIN_DIGIT_WIDTH.max(decimal_digits(largest));
        while largest >= board.goal {
            board.goal *= 2;
        }
        Ok(board)
    }

    /// Slide the cell at `index` toward `dir` until it reaches the edge or
    /// is blocked, merging at most once. Returns whether a merge happened.
    ///
    /// Sliding an empty slot is a no-op.
    pub fn slide_cell(&mut self, index: usize, dir: Move) -> Result<bool, EngineError> {
        let edge = edge_index(index, dir)?;
        let mut index = index;
        let mut merged = false;
        while index != edge {
            let Some(target) = neighbor(index, dir) else { break };
            let moving = self.cells[index];
            let dest = self.cells[target];
            if moving.is_empty() {
                break;
            }
            if dest.is_empty() {
                self.cells[target] = moving;
                self.cells[index] = Cell::default();
            } else if dest.value == moving.value && !merged && !dest.is_merged && !moving.is_merged {
                let value = dest.value * 2;
                self.cells[target] = Cell { value, is_new: false, is_merged: true };
                self.cells[index] = Cell::default();
                self.score += u64::from(value);
                merged = true;
                self.observe(value);
            } else {
                break;
            }
            index = target;
        }
        Ok(merged)
    }

    /// Slide the whole board in `dir`. The move counter always advances,
    /// even when nothing moves; callers gate on `move_possible` first.
    ///
    /// ```
    /// use term_2048::engine::{Board, Move};
    ///
    /// let mut b = Board::from_values([2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
    /// let summary = b.move_board(Move::Left);
    /// assert_eq!(b.values()[0], 4);
    /// assert_eq!((summary.merges, summary.points), (1, 4));
    /// ```
    pub fn move_board(&mut self, dir: Move) -> MoveSummary {
        for cell in self.cells.iter_mut() {
            cell.is_new = false;
            cell.is_merged = false;
        }
        let before = self.values();
        let score_before = self.score;

        let mut merges = 0u8;
        for index in sweep_order(dir) {
            if self.cells[index].is_empty() {
                continue;
            }
            if matches!(self.slide_cell(index, dir), Ok(true)) {
                merges += 1;
            }
        }

        self.move_count += 1;
        self.last_move_merges = merges;
        self.max_merges_per_move = self.max_merges_per_move.max(merges);

        let summary = MoveSummary {
            moved: self.values() != before,
            merges,
            points: self.score - score_before,
        };
        log::trace!("move {dir}: {summary:?}");
        summary
    }

    /// True if some cell could slide or merge in `dir`. Never mutates.
    pub fn move_possible(&self, dir: Move) -> bool {
        self.cells.iter().enumerate().any(|(index, cell)| {
            !cell.is_empty()
                && neighbor(index, dir).is_some_and(|target| {
                    let dest = self.cells[target];
                    dest.is_empty() || dest.value == cell.value
                })
        })
    }

    /// True when the game is over.
    ///
    /// An empty slot always leaves some slide available, so only a full
    /// board is inspected. On a full board, adjacency is symmetric: if no
    /// Up or Left move exists then no Down or Right move exists either.
    pub fn no_moves_remain(&self) -> bool {
        if self.cells.iter().any(Cell::is_empty) {
            return false;
        }
        !self.move_possible(Move::Up) && !self.move_possible(Move::Left)
    }

    /// Place a 2 (3/4) or 4 (1/4) into a uniformly chosen empty slot and
    /// return its index.
    pub fn seed_random_cell<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize, EngineError> {
        let empty: Vec<usize> = self.empty_indices().collect();
        if empty.is_empty() {
            return Err(EngineError::BoardFull);
        }
        let value = if rng.gen_range(0..4) == 3 { 4 } else { 2 };
        let index = empty[rng.gen_range(0..empty.len())];
        self.cells[index] = Cell { value, is_new: true, is_merged: false };
        self.observe(value);
        Ok(index)
    }

    fn observe(&mut self, value: u32) {
        if value <= self.largest_cell {
            return;
        }
        self.largest_cell = value;
        self.digit_width = self.digit_width.max(decimal_digits(value));
        if value >= self.goal {
            self.goal *= 2;
        }
    }

    fn empty_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(index, _)| index)
    }

    /// Slot at `index`, row-major.
    #[inline]
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    #[inline]
    pub fn cells(&self) -> &[Cell; CELL_NUM] {
        &self.cells
    }

    /// All tile values, row-major.
    pub fn values(&self) -> [u32; CELL_NUM] {
        self.cells.map(|cell| cell.value)
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[inline]
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    #[inline]
    pub fn goal(&self) -> u32 {
        self.goal
    }

    #[inline]
    pub fn largest_cell(&self) -> u32 {
        self.largest_cell
    }

    /// Column width needed to print every tile seen so far.
    #[inline]
    pub fn digit_width(&self) -> usize {
        self.digit_width
    }

    pub fn count_empty(&self) -> usize {
        self.empty_indices().count()
    }

    #[inline]
    pub fn last_move_merges(&self) -> u8 {
        self.last_move_merges
    }

    #[inline]
    pub fn max_merges_per_move(&self) -> u8 {
        self.max_merges_per_move
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn board(values: [u32; CELL_NUM]) -> Board {
        Board::from_values(values).unwrap()
    }

    fn row(values: [u32; 4]) -> Board {
        let mut all = [0; CELL_NUM];
        all[..4].copy_from_slice(&values);
        board(all)
    }

    fn first_row(b: &Board) -> [u32; 4] {
        let v = b.values();
        [v[0], v[1], v[2], v[3]]
    }

    const CHECKER: [u32; CELL_NUM] = [
        2, 4, 2, 4,
        4, 2, 4, 2,
        2, 4, 2, 4,
        4, 2, 4, 2,
    ];

    #[test]
    fn neighbor_respects_boundaries() {
        assert_eq!(neighbor(0, Move::Up), None);
        assert_eq!(neighbor(0, Move::Left), None);
        assert_eq!(neighbor(3, Move::Right), None);
        assert_eq!(neighbor(12, Move::Down), None);
        assert_eq!(neighbor(3, Move::Down), Some(7));
        assert_eq!(neighbor(7, Move::Right), None);
        assert_eq!(neighbor(8, Move::Right), Some(9));
        assert_eq!(neighbor(16, Move::Up), None);
        assert_eq!(neighbor(usize::MAX, Move::Left), None);
    }

    #[test]
    fn neighbor_is_symmetric() {
        for index in 0..CELL_NUM {
            for dir in Move::ALL {
                if let Some(next) = neighbor(index, dir) {
                    assert_eq!(neighbor(next, dir.opposite()), Some(index), "{index} {dir}");
                }
            }
        }
    }

    #[test]
    fn edge_index_holds_orthogonal_coordinate() {
        assert_eq!(edge_index(9, Move::Up), Ok(1));
        assert_eq!(edge_index(9, Move::Down), Ok(13));
        assert_eq!(edge_index(9, Move::Left), Ok(8));
        assert_eq!(edge_index(9, Move::Right), Ok(11));
        assert_eq!(edge_index(0, Move::Up), Ok(0));
        assert_eq!(edge_index(15, Move::Right), Ok(15));
        assert_eq!(edge_index(16, Move::Left), Err(EngineError::IndexOutOfRange(16)));
    }

    #[test]
    fn sweep_order_starts_next_to_edge() {
        let left: Vec<usize> = sweep_order(Move::Left).collect();
        assert_eq!(left, vec![1, 5, 9, 13, 2, 6, 10, 14, 3, 7, 11, 15]);
        let down: Vec<usize> = sweep_order(Move::Down).collect();
        assert_eq!(&down[..4], &[8, 9, 10, 11]);
        for dir in Move::ALL {
            let order: Vec<usize> = sweep_order(dir).collect();
            assert_eq!(order.len(), 12);
            assert!(order.iter().all(|&i| edge_index(i, dir) != Ok(i)));
        }
    }

    #[test]
    fn parse_move_tokens() {
        assert_eq!("u".parse::<Move>(), Ok(Move::Up));
        assert_eq!("Down".parse::<Move>(), Ok(Move::Down));
        assert_eq!(" left ".parse::<Move>(), Ok(Move::Left));
        assert_eq!("R".parse::<Move>(), Ok(Move::Right));
        assert!(matches!("x".parse::<Move>(), Err(EngineError::UnknownDirection(_))));
    }

    #[test]
    fn new_board_has_two_cells() {
        let mut rng = StdRng::seed_from_u64(7);
        let b = Board::new(&mut rng);
        assert_eq!(b.count_empty(), 14);
        assert_eq!(b.cells().iter().filter(|c| c.is_new()).count(), 2);
        assert!(b.largest_cell() == 2 || b.largest_cell() == 4);
        assert_eq!(b.digit_width(), MIN_DIGIT_WIDTH);
        assert_eq!((b.score(), b.move_count(), b.goal()), (0, 0, INITIAL_GOAL));
    }

    #[test]
    fn from_values_rejects_non_powers() {
        assert_eq!(Board::from_values([3; CELL_NUM]), Err(EngineError::InvalidValue(3)));
        let mut v = [0; CELL_NUM];
        v[5] = 1;
        assert_eq!(Board::from_values(v), Err(EngineError::InvalidValue(1)));
        v[5] = MAX_TILE * 2;
        assert!(Board::from_values(v).is_err());
    }

    #[test]
    fn adjacent_pair_merges_left() {
        let mut b = row([2, 2, 0, 0]);
        let summary = b.move_board(Move::Left);
        assert_eq!(first_row(&b), [4, 0, 0, 0]);
        assert_eq!(b.score(), 4);
        assert!(b.cells()[0].is_merged());
        assert_eq!(summary, MoveSummary { moved: true, merges: 1, points: 4 });
    }

    #[test]
    fn third_tile_does_not_merge_again() {
        let mut b = row([2, 2, 2, 0]);
        b.move_board(Move::Left);
        assert_eq!(first_row(&b), [4, 2, 0, 0]);

        let mut b = row([2, 2, 2, 0]);
        b.move_board(Move::Right);
        assert_eq!(first_row(&b), [0, 0, 2, 4]);
    }

    #[test]
    fn merge_result_does_not_cascade() {
        let mut b = row([2, 2, 4, 0]);
        b.move_board(Move::Left);
        assert_eq!(first_row(&b), [4, 4, 0, 0]);
        assert_eq!(b.score(), 4);
    }

    #[test]
    fn gap_closes_before_merge() {
        let mut b = row([2, 0, 0, 2]);
        b.move_board(Move::Left);
        assert_eq!(first_row(&b), [4, 0, 0, 0]);
    }

    #[test]
    fn full_row_merges_twice() {
        let mut b = row([4, 4, 4, 4]);
        let summary = b.move_board(Move::Left);
        assert_eq!(first_row(&b), [8, 8, 0, 0]);
        assert_eq!((summary.merges, summary.points), (2, 16));
        assert_eq!(b.max_merges_per_move(), 2);
    }

    #[test]
    fn move_left_and_right() {
        let start = [
            2, 4, 8, 16,
            2, 8, 8, 4,
            4, 0, 0, 4,
            2, 0, 0, 4,
        ];
        let mut b = board(start);
        b.move_board(Move::Left);
        assert_eq!(b.values(), [
            2, 4, 8, 16,
            2, 16, 4, 0,
            8, 0, 0, 0,
            2, 4, 0, 0,
        ]);

        let mut b = board(start);
        b.move_board(Move::Right);
        assert_eq!(b.values(), [
            2, 4, 8, 16,
            0, 2, 16, 4,
            0, 0, 0, 8,
            0, 0, 2, 4,
        ]);
    }

    #[test]
    fn move_up_and_down() {
        let start = [
            2, 2, 4, 2,
            4, 8, 0, 0,
            8, 8, 0, 0,
            16, 4, 4, 4,
        ];
        let mut b = board(start);
        b.move_board(Move::Up);
        assert_eq!(b.values(), [
            2, 2, 8, 2,
            4, 16, 0, 4,
            8, 4, 0, 0,
            16, 0, 0, 0,
        ]);

        let mut b = board(start);
        b.move_board(Move::Down);
        assert_eq!(b.values(), [
            2, 0, 0, 0,
            4, 2, 0, 0,
            8, 16, 0, 2,
            16, 4, 8, 4,
        ]);
    }

    #[test]
    fn move_count_advances_on_noop() {
        let mut b = row([2, 4, 0, 0]);
        assert!(!b.move_possible(Move::Left));
        let summary = b.move_board(Move::Left);
        assert!(!summary.moved);
        assert_eq!(b.move_count(), 1);
        assert_eq!(first_row(&b), [2, 4, 0, 0]);
    }

    #[test]
    fn move_clears_flags() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut b = row([2, 2, 0, 0]);
        b.move_board(Move::Left);
        b.seed_random_cell(&mut rng).unwrap();
        b.move_board(Move::Right);
        assert!(b.cells().iter().all(|c| !c.is_new()));
    }

    #[test]
    fn slide_cell_continues_after_merge() {
        let mut b = row([0, 0, 2, 2]);
        assert_eq!(b.slide_cell(3, Move::Left), Ok(true));
        assert_eq!(first_row(&b), [4, 0, 0, 0]);
        assert!(b.cells()[0].is_merged());
        assert_eq!(b.slide_cell(16, Move::Left), Err(EngineError::IndexOutOfRange(16)));
        assert_eq!(b.slide_cell(5, Move::Left), Ok(false));
    }

    #[test]
    fn slide_cell_carries_new_flag() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut b = board([0; CELL_NUM]);
        let seeded = b.seed_random_cell(&mut rng).unwrap();
        let edge = edge_index(seeded, Move::Right).unwrap();
        b.slide_cell(seeded, Move::Right).unwrap();
        assert!(b.cells()[edge].is_new());
    }

    #[test]
    fn reaching_goal_doubles_it() {
        let mut b = row([1024, 1024, 0, 0]);
        assert_eq!(b.goal(), 2048);
        assert_eq!(b.digit_width(), 4);
        b.move_board(Move::Left);
        assert_eq!(b.largest_cell(), 2048);
        assert_eq!(b.goal(), 4096);

        let mut b = row([8192, 8192, 0, 0]);
        assert_eq!(b.goal(), 16384);
        b.move_board(Move::Left);
        assert_eq!((b.largest_cell(), b.digit_width(), b.goal()), (16384, 5, 32768));
    }

    #[test]
    fn move_possible_does_not_mutate() {
        let b = row([2, 0, 4, 4]);
        let copy = b.clone();
        assert!(b.move_possible(Move::Left));
        assert!(b.move_possible(Move::Right));
        assert!(b.move_possible(Move::Down));
        assert!(!b.move_possible(Move::Up));
        assert_eq!(b, copy);
    }

    #[test]
    fn checkerboard_is_terminal() {
        let b = board(CHECKER);
        for dir in Move::ALL {
            assert!(!b.move_possible(dir), "{dir}");
        }
        assert!(b.no_moves_remain());
    }

    #[test]
    fn equal_pair_keeps_game_alive() {
        let mut v = CHECKER;
        v[15] = 4;
        let b = board(v);
        assert!(!b.no_moves_remain());
        assert!(b.move_possible(Move::Right));
        assert!(b.move_possible(Move::Down));
    }

    #[test]
    fn empty_slot_keeps_game_alive() {
        let mut v = CHECKER;
        v[6] = 0;
        assert!(!board(v).no_moves_remain());
    }

    #[test]
    fn seeding_full_board_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut b = board(CHECKER);
        assert_eq!(b.seed_random_cell(&mut rng), Err(EngineError::BoardFull));
        assert_eq!(b.values(), CHECKER);
    }

    #[test]
    fn seeding_fills_every_slot() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut b = board([0; CELL_NUM]);
        let mut fours = 0;
        for n in 1..=CELL_NUM {
            let index = b.seed_random_cell(&mut rng).unwrap();
            let cell = b.cells()[index];
            assert!(cell.is_new());
            assert!(cell.value() == 2 || cell.value() == 4);
            if cell.value() == 4 {
                fours += 1;
            }
            assert_eq!(b.count_empty(), CELL_NUM - n);
        }
        assert!(fours < CELL_NUM);
        assert!(b.seed_random_cell(&mut rng).is_err());
    }

    #[test]
    fn decimal_digit_counts() {
        assert_eq!(decimal_digits(0), 1);
        assert_eq!(decimal_digits(8), 1);
        assert_eq!(decimal_digits(64), 2);
        assert_eq!(decimal_digits(1024), 4);
        assert_eq!(decimal_digits(131_072), 6);
    }

    proptest! {
        #[test]
        fn random_play_keeps_invariants(seed in any::<u64>(), dirs in prop::collection::vec(0usize..4, 1..300)) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut b = Board::new(&mut rng);
            for d in dirs {
                let dir = Move::ALL[d];
                if b.no_moves_remain() {
                    break;
                }
                if !b.move_possible(dir) {
                    continue;
                }
                let before = b.clone();
                let occupied_before = CELL_NUM - before.count_empty();
                let max_before = before.largest_cell();

                let summary = b.move_board(dir);
                prop_assert!(summary.moved);

                let occupied_after = CELL_NUM - b.count_empty();
                prop_assert_eq!(occupied_after, occupied_before - summary.merges as usize);
                prop_assert_eq!(b.score(), before.score() + summary.points);
                let merged: Vec<&Cell> = b.cells().iter().filter(|c| c.is_merged()).collect();
                prop_assert_eq!(merged.len(), summary.merges as usize);
                prop_assert_eq!(merged.iter().map(|c| u64::from(c.value())).sum::<u64>(), summary.points);
                for cell in b.cells() {
                    prop_assert!(cell.value() <= max_before * 2);
                    prop_assert!(is_valid_value(cell.value()));
                }
                prop_assert!(b.goal() == before.goal() || b.goal() == before.goal() * 2);
                prop_assert!(b.goal() > b.largest_cell());
                prop_assert!(b.largest_cell() >= before.largest_cell());

                b.seed_random_cell(&mut rng).unwrap();
                let max = b.values().iter().copied().max().unwrap_or(0);
                prop_assert_eq!(b.largest_cell(), max);
                prop_assert_eq!(b.digit_width(), MIN_DIGIT_WIDTH.max(decimal_digits(max)));
                prop_assert!(b.digit_width() >= before.digit_width());
            }
        }
    }
}
