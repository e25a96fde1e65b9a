//! term-2048: the 2048 rule engine and a terminal front end
//!
//! This crate provides:
//! - A `Board` type with the move/merge engine (`engine` module)
//! - A text renderer with optional ANSI colors (`render` module)
//! - A session driver mapping keys to moves (`session` module)
//! - A checksummed per-user save file (`save` module)
//! - TOML configuration (`config` module)
//!
//! Quick start:
//! ```
//! use term_2048::engine::{Board, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut board = Board::new(&mut rng);
//!
//! // Gate on feasibility, move, then seed a new cell
//! for dir in Move::ALL {
//!     if board.move_possible(dir) {
//!         board.move_board(dir);
//!         board.seed_random_cell(&mut rng).unwrap();
//!         break;
//!     }
//! }
//! assert_eq!(board.move_count(), 1);
//! assert!(!board.no_moves_remain());
//! println!("{board}");
//! ```
//!
pub mod config;
pub mod engine;
pub mod render;
pub mod save;
pub mod session;
