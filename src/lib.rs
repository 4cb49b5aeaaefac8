//! Infinite tic-tac-toe: gomoku on an unbounded grid, decided by score.
//!
//! Stones are placed on an unbounded integer grid. A game ends when somebody
//! has a run of the required length, but the winner is whoever has the higher
//! score at that moment. A player's score is the accumulated cell weight of
//! their *best line*, which the board maintains incrementally and which drops
//! to zero once the opponent blocks it at both ends.
//!
//! ## Modules
//!
//! - [`constants`] - Weight formula and solver tuning
//! - [`rules`] - Per-game rule configuration
//! - [`field`] - Sparse heuristic weight field
//! - [`line`] - Line geometry
//! - [`board`] - Game state and the best-line engine
//! - [`heuristics`] - Pure scoring helpers for candidate cells
//! - [`solver`] - Layered heuristic move selection
//! - [`protocol`] - Text command protocol
//!
//! ## Example
//!
//! ```
//! use infinite_ttt::{Board, Player, Solver};
//!
//! let mut board = Board::default();
//! board.make_move(0, 0);
//! board.make_move(5, 5);
//! board.make_move(1, 0);
//! assert!(board.score_of(Player::X) > 0.0);
//!
//! let mut solver = Solver::new();
//! let reply = solver.find_best_move(&board, 200).unwrap();
//! assert_eq!(reply.player, Player::O);
//! ```

pub mod board;
pub mod constants;
pub mod error;
pub mod field;
pub mod heuristics;
pub mod line;
pub mod protocol;
pub mod rules;
pub mod solver;

pub use board::{Board, GameResult, Move, MoveError, Player};
pub use error::{Error, Result};
pub use field::{Cell, WeightField};
pub use line::{Direction, Line};
pub use rules::RuleConfig;
pub use solver::{Layer, SearchReport, Solver, TieBreak};
