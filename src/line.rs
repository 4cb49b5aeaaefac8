//! Lines: contiguous colinear runs of one player's stones.
//!
//! A [`Line`] is the unit the board scores with. Its cells are kept ordered
//! from the back end to the front end along its [`Direction`], so the line is
//! always exactly the walk `first, first + step, first + 2*step, ...`.

use std::fmt;

use crate::board::Player;
use crate::field::Cell;

/// One of the four line axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Step (1, 0)
    Horizontal,
    /// Step (0, 1)
    Vertical,
    /// Step (1, 1)
    Diagonal,
    /// Step (1, -1)
    AntiDiagonal,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::Diagonal,
        Direction::AntiDiagonal,
    ];

    /// Unit step `(dx, dy)` of this axis.
    #[inline]
    pub fn step(self) -> (i32, i32) {
        match self {
            Direction::Horizontal => (1, 0),
            Direction::Vertical => (0, 1),
            Direction::Diagonal => (1, 1),
            Direction::AntiDiagonal => (1, -1),
        }
    }

    /// The cell `n` steps from `cell` (negative `n` walks backwards).
    #[inline]
    pub fn offset(self, (x, y): Cell, n: i32) -> Cell {
        let (dx, dy) = self.step();
        (x + n * dx, y + n * dy)
    }

    /// Axis through two distinct colinear cells, if they are colinear.
    pub fn between(a: Cell, b: Cell) -> Option<Direction> {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        if dx == 0 && dy == 0 {
            return None;
        }
        if dy == 0 {
            Some(Direction::Horizontal)
        } else if dx == 0 {
            Some(Direction::Vertical)
        } else if dx == dy {
            Some(Direction::Diagonal)
        } else if dx == -dy {
            Some(Direction::AntiDiagonal)
        } else {
            None
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Horizontal => "horizontal",
            Direction::Vertical => "vertical",
            Direction::Diagonal => "diagonal",
            Direction::AntiDiagonal => "anti-diagonal",
        };
        f.write_str(name)
    }
}

/// A player's contiguous run of stones along one axis.
///
/// Every cell carries the weight it had when it joined the line; the line's
/// total weight is their sum. Lines are built and replaced by the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    player: Player,
    direction: Direction,
    /// Ordered from back to front along `direction`
    cells: Vec<Cell>,
    /// Weight captured when the matching cell joined
    weights: Vec<f64>,
    total_weight: f64,
    required_length: usize,
    active: bool,
    fully_blocked: bool,
}

impl Line {
    /// Build a line from cells already ordered back to front, each paired
    /// with its weight. Returns `None` unless the cells form a contiguous
    /// walk along `direction` with at least 2 cells.
    pub fn from_run(
        player: Player,
        direction: Direction,
        required_length: usize,
        run: Vec<(Cell, f64)>,
    ) -> Option<Self> {
        let (cells, weights): (Vec<Cell>, Vec<f64>) = run.into_iter().unzip();
        let line = Self {
            player,
            direction,
            total_weight: weights.iter().sum(),
            cells,
            weights,
            required_length,
            active: true,
            fully_blocked: false,
        };
        (line.len() >= 2 && line.is_contiguous()).then_some(line)
    }

    #[inline]
    pub fn player(&self) -> Player {
        self.player
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Cells from back to front.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    #[inline]
    pub fn required_length(&self) -> usize {
        self.required_length
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_fully_blocked(&self) -> bool {
        self.fully_blocked
    }

    pub fn is_complete(&self) -> bool {
        self.len() >= self.required_length
    }

    /// Accumulated weight while active and not fully blocked, else zero.
    pub fn score(&self) -> f64 {
        if self.active && !self.fully_blocked {
            self.total_weight
        } else {
            0.0
        }
    }

    /// Fraction of the required length already covered.
    pub fn completion(&self) -> f64 {
        self.len() as f64 / self.required_length as f64
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Back end of the line.
    pub fn first(&self) -> Cell {
        self.cells[0]
    }

    /// Front end of the line.
    pub fn last(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }

    /// The cell one step past the front end.
    pub fn front_extension(&self) -> Cell {
        self.direction.offset(self.last(), 1)
    }

    /// The cell one step before the back end.
    pub fn back_extension(&self) -> Cell {
        self.direction.offset(self.first(), -1)
    }

    /// Whether the cells are exactly the walk from the first cell.
    pub fn is_contiguous(&self) -> bool {
        self.cells
            .windows(2)
            .all(|w| self.direction.offset(w[0], 1) == w[1])
    }

    pub(crate) fn set_fully_blocked(&mut self, blocked: bool) {
        self.fully_blocked = blocked;
    }

    /// Permanently retire the line: it scores zero from now on.
    pub(crate) fn invalidate(&mut self) {
        self.active = false;
        self.fully_blocked = true;
    }

    /// A copy of this line grown by `cell` at whichever end it extends.
    /// Returns `None` if `cell` is not an extension cell.
    pub(crate) fn extended(&self, cell: Cell, weight: f64) -> Option<Line> {
        let mut line = self.clone();
        if cell == self.front_extension() {
            line.cells.push(cell);
            line.weights.push(weight);
        } else if cell == self.back_extension() {
            line.cells.insert(0, cell);
            line.weights.insert(0, weight);
        } else {
            return None;
        }
        line.total_weight += weight;
        Some(line)
    }

    /// This line without `cell`.
    ///
    /// Removing an end cell shrinks the line; removing an inner cell splits it
    /// and the heavier side is kept. `None` when fewer than 2 cells remain.
    pub(crate) fn without(&self, cell: Cell) -> Option<Line> {
        let idx = self.cells.iter().position(|&c| c == cell)?;
        let back = &self.weights[..idx];
        let front = &self.weights[idx + 1..];
        let back_sum: f64 = back.iter().sum();
        let front_sum: f64 = front.iter().sum();

        let range = if back.len() >= 2 && (front.len() < 2 || back_sum >= front_sum) {
            0..idx
        } else {
            idx + 1..self.cells.len()
        };
        if range.len() < 2 {
            return None;
        }

        let run = self.cells[range.clone()]
            .iter()
            .copied()
            .zip(self.weights[range].iter().copied())
            .collect();
        let mut line = Line::from_run(self.player, self.direction, self.required_length, run)?;
        line.active = self.active;
        Some(line)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} line {}/{}: weight {:.1}, blocked {}, active {} [",
            self.player,
            self.direction,
            self.len(),
            self.required_length,
            self.total_weight,
            self.fully_blocked,
            self.active
        )?;
        for (i, (x, y)) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{x},{y}")?;
        }
        f.write_str("]")
    }
}
