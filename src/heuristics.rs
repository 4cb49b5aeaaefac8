//! Pure scoring helpers used by the solver to rank candidate cells.
//!
//! None of these functions mutate the board. [`own_line_value`] simulates
//! the move on a fork.

use crate::board::{Board, Player};
use crate::constants::{
    ADJACENCY_BONUS, BLOCK_PER_CELL, LINE_FOUR_BONUS, LINE_PER_CELL, LINE_THREE_BONUS,
    POSITION_BANDS, POSITION_NEAR_ORIGIN, POSITION_ORIGIN, POTENTIAL_EMPTY, POTENTIAL_FOUR_BONUS,
    POTENTIAL_REACH, POTENTIAL_STONE, POTENTIAL_THREE_BONUS, PRIORITY_WEIGHT_SCALE,
};
use crate::field::{Cell, NEIGHBORS, in_play_area};
use crate::line::Direction;

/// Bonus for playing near the origin.
///
/// The origin gets the most, then the 8 cells around it, then bands by
/// Euclidean distance up to 5. Farther cells get nothing.
pub fn position_bonus((x, y): Cell) -> f64 {
    if x == 0 && y == 0 {
        return POSITION_ORIGIN;
    }
    if x.unsigned_abs() <= 1 && y.unsigned_abs() <= 1 {
        return POSITION_NEAR_ORIGIN;
    }
    let distance = (x as f64).hypot(y as f64);
    POSITION_BANDS
        .iter()
        .zip([2.0, 3.0, 4.0, 5.0])
        .find(|&(_, limit)| distance <= limit)
        .map_or(0.0, |(&bonus, _)| bonus)
}

/// Number of `player`'s stones in the 8-neighborhood of `cell`.
pub fn adjacency_count(board: &Board, (x, y): Cell, player: Player) -> usize {
    if !in_play_area(x, y) {
        return 0;
    }
    NEIGHBORS
        .iter()
        .filter(|&&(dx, dy)| board.cell(x + dx, y + dy) == Some(player))
        .count()
}

/// How promising `cell` is for building a line of `player`.
///
/// Looks [`POTENTIAL_REACH`] cells each way along every axis. Axes with at
/// least 2 own stones score per stone and per empty cell lying between
/// `cell` and the farthest own stone on that side, with step bonuses at 3
/// and 4 stones.
pub fn line_potential(board: &Board, cell: Cell, player: Player) -> f64 {
    if !in_play_area(cell.0, cell.1) {
        return 0.0;
    }
    let mut potential = 0.0;
    for dir in Direction::ALL {
        let mut count = 0usize;
        let mut empty = 0usize;
        for sign in [1, -1] {
            let mut gaps = 0usize;
            for i in 1..=POTENTIAL_REACH {
                let (x, y) = dir.offset(cell, sign * i);
                match board.cell(x, y) {
                    Some(p) if p == player => {
                        count += 1;
                        empty += gaps;
                        gaps = 0;
                    }
                    Some(_) => {}
                    None => gaps += 1,
                }
            }
        }

        if count >= 2 {
            potential += count as f64 * POTENTIAL_STONE + empty as f64 * POTENTIAL_EMPTY;
        }
        if count >= 3 {
            potential += POTENTIAL_THREE_BONUS;
        }
        if count >= 4 {
            potential += POTENTIAL_FOUR_BONUS;
        }
    }
    potential
}

/// Value of `cell` as a block against `opponent`: every tracked opponent line
/// of 2+ cells touching the 8-neighborhood of `cell` counts by its length.
pub fn blocking_value(board: &Board, (x, y): Cell, opponent: Player) -> f64 {
    if !in_play_area(x, y) {
        return 0.0;
    }
    board
        .player_lines(opponent)
        .filter(|line| line.len() >= 2)
        .filter(|line| {
            line.cells()
                .iter()
                .any(|&(cx, cy)| (cx - x).abs().max((cy - y).abs()) == 1)
        })
        .map(|line| BLOCK_PER_CELL * line.len() as f64)
        .sum()
}

/// Value of `player`'s tracked lines after `player` plays `cell`.
pub fn own_line_value(board: &Board, (x, y): Cell, player: Player) -> f64 {
    let mut next = board.fork();
    if !next.make_move_for(x, y, player) {
        return 0.0;
    }

    next.player_lines(player)
        .map(|line| {
            let mut value = line.len() as f64 * LINE_PER_CELL;
            if line.len() >= 4 {
                value += LINE_FOUR_BONUS;
            }
            if line.len() >= 3 {
                value += LINE_THREE_BONUS;
            }
            value
        })
        .sum()
}

/// Blended rank of `cell` for `player`: scaled cell weight, position bonus,
/// adjacency to own stones and line potential.
pub fn composite_priority(board: &Board, cell: Cell, player: Player) -> f64 {
    board.weight(cell.0, cell.1) * PRIORITY_WEIGHT_SCALE
        + position_bonus(cell)
        + adjacency_count(board, cell, player) as f64 * ADJACENCY_BONUS
        + line_potential(board, cell, player)
}
