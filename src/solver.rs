//! Layered heuristic move selection.
//!
//! The solver runs a fixed cascade of tactical checks. The first layer that
//! produces a candidate decides the move:
//!
//! 1. **Immediate win**: a legal move after which the mover wins.
//! 2. **Forced block**: the opponent has a winning cell. Block it, or play a
//!    neighbor of it that defuses the win. Winning cells come first.
//! 3. **Threat block**: occupy an extension cell of the opponent's lines.
//! 4. **Line extension**: extend the mover's own lines.
//! 5. **Weighted evaluation**: score the heaviest candidates by weight,
//!    blocking value, own-line value and closeness to the origin.
//! 6. **Fallback**: the legal move with the best composite priority.
//!
//! Every simulation runs on a [`Board::fork`], so the caller's board is never
//! touched.
//! The time budget is soft: only the weighted layer checks the clock, and it
//! always scores at least one candidate before giving up.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::board::{Board, GameResult, Move, Player};
use crate::constants::{
    EVAL_BLOCK_SCALE, EVAL_CENTER_BONUS, EVAL_LINE_SCALE, EVAL_WEIGHT_SCALE, EXTENSION_PADDING,
    WEIGHTED_CANDIDATES,
};
use crate::field::{Cell, NEIGHBORS};
use crate::heuristics::{blocking_value, composite_priority, own_line_value};

/// Layer of the cascade that produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    ImmediateWin,
    ForcedBlock,
    ThreatBlock,
    LineExtension,
    Weighted,
    Fallback,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layer::ImmediateWin => "immediate-win",
            Layer::ForcedBlock => "forced-block",
            Layer::ThreatBlock => "threat-block",
            Layer::LineExtension => "line-extension",
            Layer::Weighted => "weighted",
            Layer::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// How equally ranked candidates are separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// First candidate in enumeration order
    #[default]
    Deterministic,
    /// Uniformly random among the best, from a seeded generator
    Random,
}

/// Outcome and statistics of one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    /// Chosen move, `None` if the game is over or no move exists
    pub best_move: Option<Move>,
    /// Layer that chose the move
    pub layer: Option<Layer>,
    /// Wall time spent
    pub elapsed: Duration,
    /// Candidates simulated or scored
    pub candidates: usize,
}

/// Heuristic move finder.
#[derive(Debug, Clone)]
pub struct Solver {
    tie_break: TieBreak,
    rng: fastrand::Rng,
    last: Option<SearchReport>,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Create a solver with deterministic tie-breaking.
    pub fn new() -> Self {
        Self {
            tie_break: TieBreak::Deterministic,
            rng: fastrand::Rng::with_seed(0),
            last: None,
        }
    }

    /// Create a solver that breaks ties randomly, reproducibly per `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            tie_break: TieBreak::Random,
            rng: fastrand::Rng::with_seed(seed),
            last: None,
        }
    }

    #[inline]
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Report of the most recent search.
    #[inline]
    pub fn last_report(&self) -> Option<&SearchReport> {
        self.last.as_ref()
    }

    /// Find a move for the player to move within a soft budget of
    /// `time_budget_ms` milliseconds. `None` when the game is already over
    /// or there is nothing to play.
    pub fn find_best_move(&mut self, board: &Board, time_budget_ms: u64) -> Option<Move> {
        self.search(board, Duration::from_millis(time_budget_ms))
            .best_move
    }

    /// Run the cascade and return its full report.
    #[instrument(skip_all, fields(player = %board.current_player(), stones = board.move_count()))]
    pub fn search(&mut self, board: &Board, budget: Duration) -> SearchReport {
        let start = Instant::now();
        let mut candidates = 0;

        let found = if board.check_winner().is_over() {
            None
        } else {
            self.cascade(board, start, budget, &mut candidates)
        };
        if let Some((mv, layer)) = found {
            debug!(%mv, %layer, candidates, "move selected");
        }

        let report = SearchReport {
            best_move: found.map(|(mv, _)| mv),
            layer: found.map(|(_, layer)| layer),
            elapsed: start.elapsed(),
            candidates,
        };
        self.last = Some(report.clone());
        report
    }

    fn cascade(
        &mut self,
        board: &Board,
        start: Instant,
        budget: Duration,
        candidates: &mut usize,
    ) -> Option<(Move, Layer)> {
        let me = board.current_player();
        let opponent = me.opponent();
        let moves = board.possible_moves();

        // Layer 1
        for mv in &moves {
            *candidates += 1;
            if wins_after(board, mv.cell(), me) {
                return Some((*mv, Layer::ImmediateWin));
            }
        }

        // Layer 2
        let win_cells: Vec<Cell> = moves
            .iter()
            .map(Move::cell)
            .filter(|&cell| {
                *candidates += 1;
                wins_after(board, cell, opponent)
            })
            .collect();
        if !win_cells.is_empty() {
            let blocks = self.blocking_moves(board, &win_cells, candidates);
            let scored: Vec<(Cell, (bool, f64))> = blocks
                .into_iter()
                .map(|cell| {
                    let on_win_cell = win_cells.contains(&cell);
                    (cell, (on_win_cell, composite_priority(board, cell, me)))
                })
                .collect();
            if let Some(cell) = self.pick(&scored) {
                return Some((Move::new(cell.0, cell.1, me), Layer::ForcedBlock));
            }
        }

        // Layers 3 and 4
        let radius = extension_radius(board);
        for (owner, layer) in [(opponent, Layer::ThreatBlock), (me, Layer::LineExtension)] {
            let ranked = self.ranked_extensions(board, owner, radius);
            *candidates += ranked.len();
            if let Some(cell) = self.pick(&ranked) {
                return Some((Move::new(cell.0, cell.1, me), layer));
            }
        }

        // Layer 5
        let mut scored = Vec::new();
        for (mv, weight) in board.weighted_moves().into_iter().take(WEIGHTED_CANDIDATES) {
            if !scored.is_empty() && start.elapsed() >= budget {
                debug!(scored = scored.len(), "time budget spent in weighted layer");
                break;
            }
            *candidates += 1;
            scored.push((mv.cell(), weighted_score(board, mv.cell(), weight, me)));
        }
        if let Some(cell) = self.pick(&scored) {
            return Some((Move::new(cell.0, cell.1, me), Layer::Weighted));
        }

        // Layer 6
        let scored: Vec<(Cell, f64)> = moves
            .iter()
            .map(|mv| (mv.cell(), composite_priority(board, mv.cell(), me)))
            .collect();
        *candidates += scored.len();
        self.pick(&scored)
            .map(|cell| (Move::new(cell.0, cell.1, me), Layer::Fallback))
    }

    /// Cells that stop the opponent from winning: each winning cell itself,
    /// plus any neighbor after which the opponent's winning move no longer
    /// wins.
    fn blocking_moves(&self, board: &Board, win_cells: &[Cell], candidates: &mut usize) -> Vec<Cell> {
        let me = board.current_player();
        let opponent = me.opponent();
        let mut blocks: Vec<Cell> = Vec::new();
        let mut add = |cell: Cell| {
            if !blocks.contains(&cell) {
                blocks.push(cell);
            }
        };

        for &(wx, wy) in win_cells {
            add((wx, wy));
            for (dx, dy) in NEIGHBORS {
                let (bx, by) = (wx + dx, wy + dy);
                if !board.is_legal(bx, by) {
                    continue;
                }
                *candidates += 1;
                let mut next = board.fork();
                next.make_move_for(bx, by, me);
                next.make_move_for(wx, wy, opponent);
                if next.check_winner() != GameResult::win_for(opponent) {
                    add((bx, by));
                }
            }
        }
        blocks
    }

    /// Empty extension cells of `owner`'s lines of 2+ cells within `radius`
    /// of the origin, ranked by how many lines they extend and then by
    /// composite priority for the mover.
    fn ranked_extensions(&self, board: &Board, owner: Player, radius: i32) -> Vec<(Cell, (usize, f64))> {
        let mut counts: Vec<(Cell, usize)> = Vec::new();
        for line in board.player_lines(owner).filter(|line| line.len() >= 2) {
            for cell in [line.back_extension(), line.front_extension()] {
                if cell.0.abs() > radius || cell.1.abs() > radius {
                    continue;
                }
                if !board.is_legal(cell.0, cell.1) {
                    continue;
                }
                match counts.iter_mut().find(|(c, _)| *c == cell) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((cell, 1)),
                }
            }
        }

        let me = board.current_player();
        counts
            .into_iter()
            .map(|(cell, n)| (cell, (n, composite_priority(board, cell, me))))
            .collect()
    }

    /// The best-ranked cell, ties resolved by the tie-break mode.
    fn pick<K: PartialOrd + Copy>(&mut self, ranked: &[(Cell, K)]) -> Option<Cell> {
        let (_, best) = ranked.iter().copied().reduce(|acc, item| {
            if item.1 > acc.1 { item } else { acc }
        })?;

        match self.tie_break {
            TieBreak::Deterministic => ranked.iter().find(|(_, k)| *k == best).map(|&(c, _)| c),
            TieBreak::Random => {
                let tied: Vec<Cell> = ranked
                    .iter()
                    .filter(|(_, k)| *k == best)
                    .map(|&(c, _)| c)
                    .collect();
                let i = self.rng.usize(..tied.len());
                tied.get(i).copied()
            }
        }
    }
}

/// Whether `player` wins right after playing `cell`.
fn wins_after(board: &Board, (x, y): Cell, player: Player) -> bool {
    let mut next = board.fork();
    next.make_move_for(x, y, player) && next.check_winner() == GameResult::win_for(player)
}

/// Score of a candidate in the weighted layer.
fn weighted_score(board: &Board, cell: Cell, weight: f64, me: Player) -> f64 {
    let mut score = weight * EVAL_WEIGHT_SCALE
        + blocking_value(board, cell, me.opponent()) * EVAL_BLOCK_SCALE
        + own_line_value(board, cell, me) * EVAL_LINE_SCALE;
    if cell.0.abs() <= 1 && cell.1.abs() <= 1 {
        score += EVAL_CENTER_BONUS;
    }
    score
}

/// Half the nominal field, widened so stones played far out still count.
fn extension_radius(board: &Board) -> i32 {
    let half = (board.rules().field_size() / 2) as i32;
    half.max(board.field().radius() + EXTENSION_PADDING)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(moves: &[Cell]) -> Board {
        let mut board = Board::default();
        for &(x, y) in moves {
            assert!(board.make_move(x, y));
        }
        board
    }

    #[test]
    fn test_empty_board_opens_at_origin() {
        let mut solver = Solver::new();
        let mv = solver.find_best_move(&Board::default(), 100).unwrap();
        assert_eq!(mv.cell(), (0, 0));
        assert_eq!(mv.player, Player::X);

        let report = solver.last_report().unwrap();
        assert_eq!(report.layer, Some(Layer::Weighted));
        assert!(report.candidates > 0);
    }

    #[test]
    fn test_pick_first_max() {
        let mut solver = Solver::new();
        let ranked = [((0, 0), 1.0), ((1, 0), 3.0), ((2, 0), 3.0)];
        assert_eq!(solver.pick(&ranked), Some((1, 0)));
        assert_eq!(solver.pick::<f64>(&[]), None);
    }

    #[test]
    fn test_pick_random_stays_among_best() {
        let mut solver = Solver::with_seed(7);
        assert_eq!(solver.tie_break(), TieBreak::Random);
        let ranked = [((0, 0), (1, 5.0)), ((1, 0), (2, 1.0)), ((2, 0), (2, 1.0))];
        for _ in 0..20 {
            let cell = solver.pick(&ranked).unwrap();
            assert!(cell == (1, 0) || cell == (2, 0));
        }
    }

    #[test]
    fn test_threat_block_takes_line_end() {
        // O holds an open pair, X has nothing to extend
        let board = board_with(&[(0, 0), (3, 3), (6, 0), (4, 3)]);
        let mut solver = Solver::new();
        let report = solver.search(&board, Duration::from_millis(100));
        assert_eq!(report.layer, Some(Layer::ThreatBlock));
        let cell = report.best_move.unwrap().cell();
        assert!(cell == (2, 3) || cell == (5, 3));
    }

    #[test]
    fn test_extension_radius() {
        let mut board = Board::default();
        assert_eq!(extension_radius(&board), 10);
        board.make_move(30, -4);
        assert_eq!(extension_radius(&board), 32);
    }

    #[test]
    fn test_finished_board_has_no_move() {
        let board = board_with(&[
            (0, 0),
            (0, 5),
            (1, 0),
            (1, 5),
            (2, 0),
            (9, 9),
            (3, 0),
            (9, -9),
            (4, 0),
        ]);
        assert!(board.check_winner().is_over());
        let mut solver = Solver::new();
        assert_eq!(solver.find_best_move(&board, 100), None);
        assert_eq!(solver.last_report().unwrap().layer, None);
    }
}
