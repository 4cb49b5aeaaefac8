//! Sparse game board with incremental best-line tracking.
//!
//! The board maps cells to stones, remembers whose turn it is, and keeps for
//! each player at most one tracked [`Line`] (its *best line*). Scores come
//! from those lines, not from enumerating every run on the board:
//!
//! - A player's move either extends its best line at one end, or produces a
//!   candidate line through the new stone which replaces the best line only
//!   when it scores strictly more.
//! - After every move the opponent's best line is checked for a full block.
//!   A blocked line is retired and a replacement is searched among all of the
//!   opponent's stones.
//!
//! Win detection is a separate geometric scan for a physical run of the
//! required length, but the *winner* is whoever has the higher score at that
//! moment.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, trace};

use crate::constants::{
    ADJACENT_ONLY_MOVES, BLOCK_LOOKAHEAD, COORDINATE_LIMIT, DRAW_MOVE_CEILING, FAR_PADDING,
    MAX_RENDER_SPAN, NEAR_PADDING, NEAR_PADDING_MOVES, PLAYED_REWARD, UNDO_DECAY,
};
use crate::field::{Bounds, Cell, WeightField, in_play_area};
use crate::line::{Direction, Line};
use crate::rules::RuleConfig;

/// A player (stone color).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the other player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            Player::X => 0,
            Player::O => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => f.write_str("X"),
            Player::O => f.write_str("O"),
        }
    }
}

impl FromStr for Player {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Player::X),
            "o" => Ok(Player::O),
            _ => Err(crate::error::Error::InvalidPlayer {
                input: s.to_string(),
            }),
        }
    }
}

/// Outcome of [`Board::check_winner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    /// Nobody has a full run yet
    Undecided,
    XWins,
    OWins,
    Draw,
}

impl GameResult {
    /// The result in which `player` wins.
    #[inline]
    pub fn win_for(player: Player) -> GameResult {
        match player {
            Player::X => GameResult::XWins,
            Player::O => GameResult::OWins,
        }
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::XWins => Some(Player::X),
            GameResult::OWins => Some(Player::O),
            _ => None,
        }
    }

    #[inline]
    pub fn is_over(self) -> bool {
        self != GameResult::Undecided
    }
}

/// A move: a cell and the player placing the stone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub x: i32,
    pub y: i32,
    pub player: Player,
}

impl Move {
    pub fn new(x: i32, y: i32, player: Player) -> Self {
        Self { x, y, player }
    }

    #[inline]
    pub fn cell(&self) -> Cell {
        (self.x, self.y)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{} {}", self.x, self.y, self.player)
    }
}

/// Why a move was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("cell ({x}, {y}) is already occupied")]
    Occupied { x: i32, y: i32 },

    #[error("cell ({x}, {y}) is outside the play area (|x|, |y| <= {limit})", limit = COORDINATE_LIMIT)]
    OutOfRange { x: i32, y: i32 },
}

/// Best lines as they were before a move, for exact undo.
#[derive(Debug, Clone)]
struct MoveRecord {
    cell: Cell,
    lines: [Option<Line>; 2],
}

/// Game state on the unbounded grid.
///
/// `Clone` produces a fully independent copy (cells, weights, lines and
/// history), which is what the solver relies on for its simulations.
#[derive(Debug, Clone)]
pub struct Board {
    cells: HashMap<Cell, Player>,
    current: Player,
    field: WeightField,
    rules: RuleConfig,
    best_lines: [Option<Line>; 2],
    history: Vec<MoveRecord>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(RuleConfig::default())
    }
}

impl Board {
    /// Create an empty board. X moves first.
    pub fn new(rules: RuleConfig) -> Self {
        Self {
            cells: HashMap::new(),
            current: Player::X,
            field: WeightField::new(rules.position_bonuses()),
            rules,
            best_lines: [None, None],
            history: Vec::new(),
        }
    }

    /// Independent copy for look-ahead. Like `clone`, but the undo history
    /// is left behind, so the copy's cost does not grow with the game.
    /// Undo on the copy still works, through the older-stone path.
    pub fn fork(&self) -> Self {
        Self {
            cells: self.cells.clone(),
            current: self.current,
            field: self.field.clone(),
            rules: self.rules,
            best_lines: self.best_lines.clone(),
            history: Vec::new(),
        }
    }

    /// Remove every stone and start over with X to move.
    pub fn clear(&mut self) {
        *self = Self::new(self.rules);
    }

    #[inline]
    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    #[inline]
    pub fn field(&self) -> &WeightField {
        &self.field
    }

    #[inline]
    pub fn current_player(&self) -> Player {
        self.current
    }

    /// Number of stones on the board.
    #[inline]
    pub fn move_count(&self) -> usize {
        self.cells.len()
    }

    /// Stone at `(x, y)`, `None` for an empty cell.
    #[inline]
    pub fn cell(&self, x: i32, y: i32) -> Option<Player> {
        self.cells.get(&(x, y)).copied()
    }

    #[inline]
    fn stone_at(&self, cell: Cell) -> Option<Player> {
        self.cells.get(&cell).copied()
    }

    /// Whether a stone may be placed at `(x, y)`: the cell is empty and
    /// inside the play area.
    #[inline]
    pub fn is_legal(&self, x: i32, y: i32) -> bool {
        in_play_area(x, y) && !self.cells.contains_key(&(x, y))
    }

    /// Current heuristic weight of `(x, y)`.
    #[inline]
    pub fn weight(&self, x: i32, y: i32) -> f64 {
        self.field.weight(x, y)
    }

    /// Cells holding one of `player`'s stones, in no particular order.
    pub fn stones(&self, player: Player) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .filter(move |&(_, &p)| p == player)
            .map(|(&c, _)| c)
    }

    /// Place a stone for the player to move.
    ///
    /// # Errors
    /// [`MoveError::OutOfRange`] outside the play area and
    /// [`MoveError::Occupied`] if the cell already holds a stone. The board
    /// is left untouched in both cases.
    pub fn play(&mut self, x: i32, y: i32) -> Result<(), MoveError> {
        if !in_play_area(x, y) {
            return Err(MoveError::OutOfRange { x, y });
        }
        if self.cells.contains_key(&(x, y)) {
            return Err(MoveError::Occupied { x, y });
        }
        let player = self.current;
        self.history.push(MoveRecord {
            cell: (x, y),
            lines: self.best_lines.clone(),
        });

        self.cells.insert((x, y), player);
        self.field.mark_occupied(x, y);
        self.field.increase_weight(x, y, PLAYED_REWARD);

        self.update_best_line((x, y), player);
        self.reset_if_blocked(player.opponent());

        self.current = player.opponent();
        Ok(())
    }

    /// Place a stone for the player to move. Returns `false` (and changes
    /// nothing) if the cell is not legal.
    pub fn make_move(&mut self, x: i32, y: i32) -> bool {
        self.play(x, y).is_ok()
    }

    /// Place a stone for `player` regardless of whose turn it is. Afterwards
    /// it is `player`'s opponent's turn.
    pub fn make_move_for(&mut self, x: i32, y: i32, player: Player) -> bool {
        if !self.is_legal(x, y) {
            return false;
        }
        self.current = player;
        self.make_move(x, y)
    }

    /// Take back the stone at `(x, y)`. Returns `false` if the cell is empty.
    ///
    /// Undoing the most recent move restores both best lines exactly. Undoing
    /// an older stone removes it from its owner's line instead, keeping the
    /// heavier contiguous part (or dropping the line below 2 cells).
    pub fn undo_move(&mut self, x: i32, y: i32) -> bool {
        let Some(player) = self.cells.remove(&(x, y)) else {
            return false;
        };
        self.field.mark_free(x, y);
        self.field.decrease_weight(x, y, UNDO_DECAY);

        if self.history.last().is_some_and(|r| r.cell == (x, y)) {
            if let Some(record) = self.history.pop() {
                self.best_lines = record.lines;
            }
        } else {
            // Older snapshots may reference this stone
            self.history.clear();
            let idx = player.index();
            if let Some(line) = &self.best_lines[idx] {
                if line.contains((x, y)) {
                    let mut shrunk = line.without((x, y));
                    if let Some(l) = &mut shrunk {
                        let blocked = self.is_line_blocked(l);
                        l.set_fully_blocked(blocked);
                    }
                    self.best_lines[idx] = shrunk;
                }
            }
        }

        self.current = self.current.opponent();
        true
    }

    /// The tracked best line of `player`, if any.
    #[inline]
    pub fn best_line(&self, player: Player) -> Option<&Line> {
        self.best_lines[player.index()].as_ref()
    }

    /// Lines tracked for `player` (currently at most the best line).
    pub fn player_lines(&self, player: Player) -> impl Iterator<Item = &Line> + '_ {
        self.best_lines[player.index()].iter()
    }

    /// Score of `player`.
    ///
    /// With single-line scoring this is the best line's score (zero when it
    /// is absent, inactive or fully blocked). Otherwise every maximal run of
    /// at least 2 stones contributes its own score.
    pub fn score_of(&self, player: Player) -> f64 {
        if self.rules.single_line_scoring() {
            self.best_line(player).map_or(0.0, Line::score)
        } else {
            self.all_lines(player, 2).iter().map(Line::score).sum()
        }
    }

    /// Whether `player`'s best line is live and one or two stones short.
    pub fn is_close_to_win(&self, player: Player) -> bool {
        match self.best_line(player) {
            Some(line) if line.score() > 0.0 => {
                let missing = self.rules.required_line_length().saturating_sub(line.len());
                (1..=2).contains(&missing)
            }
            _ => false,
        }
    }

    /// Fraction of the required length covered by `player`'s best line.
    pub fn line_completion(&self, player: Player) -> f64 {
        self.best_line(player).map_or(0.0, Line::completion)
    }

    /// Every maximal run of at least `min_len` (and at least 2) stones of
    /// `player`, weighted with the current cell weights.
    pub fn all_lines(&self, player: Player, min_len: usize) -> Vec<Line> {
        let min_len = min_len.max(2);
        let mut stones: Vec<Cell> = self.stones(player).collect();
        stones.sort_unstable();

        let mut lines = Vec::new();
        for &start in &stones {
            for dir in Direction::ALL {
                // Only walk from the back end of a run
                if self.stone_at(dir.offset(start, -1)) == Some(player) {
                    continue;
                }
                let mut run = Vec::new();
                let mut cell = start;
                while self.stone_at(cell) == Some(player) {
                    run.push((cell, self.field.weight(cell.0, cell.1)));
                    cell = dir.offset(cell, 1);
                }
                if run.len() < min_len {
                    continue;
                }
                if let Some(mut line) =
                    Line::from_run(player, dir, self.rules.required_line_length(), run)
                {
                    let blocked = self.is_line_blocked(&line);
                    line.set_fully_blocked(blocked);
                    lines.push(line);
                }
            }
        }
        lines
    }

    /// Check whether the game is over.
    ///
    /// The game ends once some player has a physical run of the required
    /// length. The winner is then decided by score, not by who owns the run:
    /// the higher score wins and equal scores are a draw.
    pub fn check_winner(&self) -> GameResult {
        let x_run = self.has_run(Player::X);
        let o_run = self.has_run(Player::O);

        if !x_run && !o_run {
            if self.move_count() >= DRAW_MOVE_CEILING && self.field.free_positions_near(1).is_empty()
            {
                return GameResult::Draw;
            }
            return GameResult::Undecided;
        }

        let x_score = self.score_of(Player::X);
        let o_score = self.score_of(Player::O);
        if x_score > o_score {
            GameResult::XWins
        } else if o_score > x_score {
            GameResult::OWins
        } else {
            GameResult::Draw
        }
    }

    /// Whether `player` has at least `required_line_length` stones in a row.
    pub fn has_run(&self, player: Player) -> bool {
        let n = self.rules.required_line_length() as i32;
        self.stones(player).any(|start| {
            Direction::ALL
                .iter()
                .any(|&dir| (1..n).all(|i| self.stone_at(dir.offset(start, i)) == Some(player)))
        })
    }

    /// Legal moves for the player to move, best first.
    pub fn possible_moves(&self) -> Vec<Move> {
        self.weighted_moves().into_iter().map(|(m, _)| m).collect()
    }

    /// Legal moves paired with their cell weight, heaviest first.
    ///
    /// The search area grows with the game: first the neighborhoods of the
    /// stones, then the padded bounding box. Ties are broken by distance from
    /// the origin, then by coordinates.
    pub fn weighted_moves(&self) -> Vec<(Move, f64)> {
        let n = self.move_count();
        let positions: Vec<Cell> = if n < ADJACENT_ONLY_MOVES {
            self.field.adjacent_to_occupied().into_iter().collect()
        } else if n < NEAR_PADDING_MOVES {
            self.field.free_positions_near(NEAR_PADDING)
        } else {
            self.field.free_positions_near(FAR_PADDING)
        };

        let mut moves: Vec<(Move, f64)> = positions
            .into_iter()
            .filter(|c| !self.cells.contains_key(c))
            .map(|(x, y)| (Move::new(x, y, self.current), self.field.weight(x, y)))
            .collect();
        moves.sort_by(|(a, wa), (b, wb)| {
            wb.total_cmp(wa)
                .then_with(|| chebyshev(a.cell()).cmp(&chebyshev(b.cell())))
                .then_with(|| a.cell().cmp(&b.cell()))
        });
        moves
    }

    // -------------------------------------------------------------------------
    // Best-line maintenance
    // -------------------------------------------------------------------------

    fn update_best_line(&mut self, cell: Cell, player: Player) {
        let idx = player.index();
        let replacement = match &self.best_lines[idx] {
            Some(line) if line.is_active() => self.next_line(line, cell, player),
            _ => self.best_line_from(cell, player),
        };

        if let Some(mut line) = replacement {
            let blocked = self.is_line_blocked(&line);
            line.set_fully_blocked(blocked);
            trace!(%player, line = %line, "best line updated");
            self.best_lines[idx] = Some(line);
        }
    }

    /// The line that should replace `line` after `player` played `cell`, or
    /// `None` to keep `line` unchanged.
    fn next_line(&self, line: &Line, cell: Cell, player: Player) -> Option<Line> {
        let current_score = line.score();

        if cell == line.front_extension() || cell == line.back_extension() {
            if self.has_opponent_between(line, cell, player.opponent()) {
                return self
                    .best_line_from(cell, player)
                    .filter(|candidate| candidate.score() > current_score);
            }
            let weight = self.field.weight(cell.0, cell.1);
            if let Some(extended) = line.extended(cell, weight).filter(Line::is_contiguous) {
                return Some(extended);
            }
            return self
                .best_line_from(cell, player)
                .filter(|candidate| candidate.total_weight() > line.total_weight());
        }

        self.potential_line_from(cell, player)
            .filter(|candidate| candidate.score() > current_score)
    }

    /// The heaviest contiguous run of at least 2 stones through `cell`.
    fn best_line_from(&self, cell: Cell, player: Player) -> Option<Line> {
        let mut best: Option<Line> = None;
        for dir in Direction::ALL {
            if let Some(line) = self.contiguous_run(cell, dir, player) {
                if line.total_weight() > best.as_ref().map_or(0.0, Line::total_weight) {
                    best = Some(line);
                }
            }
        }
        best
    }

    /// `player`'s stones touching `cell` along `dir`, walking at most
    /// `required_line_length - 1` steps each way.
    fn contiguous_run(&self, cell: Cell, dir: Direction, player: Player) -> Option<Line> {
        let reach = self.rules.required_line_length() as i32;

        let mut back = Vec::new();
        for i in 1..reach {
            let c = dir.offset(cell, -i);
            if self.stone_at(c) != Some(player) {
                break;
            }
            back.push(c);
        }

        let mut run: Vec<(Cell, f64)> = back
            .into_iter()
            .rev()
            .map(|c| (c, self.field.weight(c.0, c.1)))
            .collect();
        for i in 0..reach {
            let c = dir.offset(cell, i);
            if self.stone_at(c) != Some(player) {
                break;
            }
            run.push((c, self.field.weight(c.0, c.1)));
        }

        Line::from_run(player, dir, self.rules.required_line_length(), run)
    }

    /// Pick a direction by the speculative run through `cell` (own stones
    /// with empty gaps allowed, opponent stones ending the walk), and return
    /// the contiguous run through `cell` in that direction.
    fn potential_line_from(&self, cell: Cell, player: Player) -> Option<Line> {
        let reach = self.rules.required_line_length() as i32;
        let opponent = player.opponent();

        let mut best: Option<(f64, Line)> = None;
        for dir in Direction::ALL {
            let mut speculative = self.field.weight(cell.0, cell.1);
            let mut offsets = vec![0];
            for sign in [1, -1] {
                for i in 1..reach {
                    let c = dir.offset(cell, sign * i);
                    match self.stone_at(c) {
                        Some(p) if p == player => {
                            speculative += self.field.weight(c.0, c.1);
                            offsets.push(sign * i);
                        }
                        Some(_) => break,
                        None => {}
                    }
                }
            }

            if offsets.len() < 2 || !self.is_span_clear(cell, dir, &offsets, opponent) {
                continue;
            }
            let Some(line) = self.contiguous_run(cell, dir, player) else {
                continue;
            };
            if best.as_ref().is_none_or(|(score, _)| speculative > *score) {
                best = Some((speculative, line));
            }
        }
        best.map(|(_, line)| line)
    }

    /// No opponent stone lies between the outermost `offsets` along `dir`.
    fn is_span_clear(&self, cell: Cell, dir: Direction, offsets: &[i32], opponent: Player) -> bool {
        let (Some(&lo), Some(&hi)) = (offsets.iter().min(), offsets.iter().max()) else {
            return true;
        };
        (lo..=hi).all(|k| self.stone_at(dir.offset(cell, k)) != Some(opponent))
    }

    /// Whether an opponent stone sits strictly between `cell` and the nearest
    /// cell of `line`.
    fn has_opponent_between(&self, line: &Line, cell: Cell, opponent: Player) -> bool {
        let Some(nearest) = line
            .cells()
            .iter()
            .copied()
            .min_by_key(|&(x, y)| (x - cell.0).abs() + (y - cell.1).abs())
        else {
            return false;
        };

        let (dx, dy) = ((cell.0 - nearest.0).signum(), (cell.1 - nearest.1).signum());
        let steps = (cell.0 - nearest.0).abs().max((cell.1 - nearest.1).abs());
        (1..steps).any(|i| self.stone_at((nearest.0 + i * dx, nearest.1 + i * dy)) == Some(opponent))
    }

    /// Retire `player`'s best line if the last move fully blocked it, and
    /// adopt the best run among all of `player`'s stones instead.
    fn reset_if_blocked(&mut self, player: Player) {
        let idx = player.index();
        let Some(line) = &self.best_lines[idx] else {
            return;
        };
        if !line.is_active() || !self.is_line_blocked(line) {
            return;
        }
        debug!(%player, line = %line, "best line fully blocked, rebuilding");

        let mut replacement = self.rebuild_line(player);
        if let Some(line) = &mut replacement {
            let blocked = self.is_line_blocked(line);
            line.set_fully_blocked(blocked);
            if blocked {
                line.invalidate();
            }
        }
        self.best_lines[idx] = replacement;
    }

    /// The heaviest contiguous run through any of `player`'s stones.
    fn rebuild_line(&self, player: Player) -> Option<Line> {
        let mut stones: Vec<Cell> = self.stones(player).collect();
        stones.sort_unstable();

        let mut best: Option<Line> = None;
        for stone in stones {
            if let Some(line) = self.best_line_from(stone, player) {
                if line.total_weight() > best.as_ref().map_or(0.0, Line::total_weight) {
                    best = Some(line);
                }
            }
        }
        best
    }

    /// Whether `line` can no longer be extended.
    ///
    /// An end is dead when, within [`BLOCK_LOOKAHEAD`] cells past it, an
    /// opponent stone comes before any empty cell. Depending on the rules
    /// both ends or a single end must be dead. Blocking is only tracked when
    /// the rules reset blocked lines.
    fn is_line_blocked(&self, line: &Line) -> bool {
        if !self.rules.reset_on_full_block() || line.len() < 2 {
            return false;
        }
        if !line.is_active() {
            return true;
        }

        let opponent = line.player().opponent();
        let front = self.is_end_dead(line.last(), line.direction(), 1, opponent);
        let back = self.is_end_dead(line.first(), line.direction(), -1, opponent);
        if self.rules.both_ends_required() {
            front && back
        } else {
            front || back
        }
    }

    fn is_end_dead(&self, end: Cell, dir: Direction, sign: i32, opponent: Player) -> bool {
        for i in 1..=BLOCK_LOOKAHEAD {
            match self.stone_at(dir.offset(end, sign * i)) {
                None => return false,
                Some(p) if p == opponent => return true,
                Some(_) => {}
            }
        }
        false
    }
}

#[inline]
fn chebyshev((x, y): Cell) -> i32 {
    x.abs().max(y.abs())
}

impl Board {
    /// Region drawn by `Display`: the stones' bounding box plus a margin of
    /// one, cut down to [`MAX_RENDER_SPAN`] around the latest stone when the
    /// stones are spread wider than that.
    fn view(&self) -> Bounds {
        let Some(bounds) = self.field.bounds() else {
            return Bounds {
                min_x: -3,
                max_x: 3,
                min_y: -3,
                max_y: 3,
            };
        };
        let padded = bounds.padded(1);
        let span = i64::from(MAX_RENDER_SPAN);
        if padded.width() <= span && padded.height() <= span {
            return padded;
        }

        let focus = self
            .history
            .last()
            .map(|r| r.cell)
            .filter(|&c| self.cells.contains_key(&c))
            .or_else(|| self.cells.keys().copied().min_by_key(|&c| (chebyshev(c), c)))
            .unwrap_or((0, 0));
        let half = MAX_RENDER_SPAN / 2;
        Bounds {
            min_x: padded.min_x.max(focus.0 - half),
            max_x: padded.max_x.min(focus.0 + half),
            min_y: padded.min_y.max(focus.1 - half),
            max_y: padded.max_y.min(focus.1 + half),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.view();
        let (min_x, max_x, min_y, max_y) = (view.min_x, view.max_x, view.min_y, view.max_y);

        for y in (min_y..=max_y).rev() {
            write!(f, "{y:>4} ")?;
            for x in min_x..=max_x {
                let ch = match self.cell(x, y) {
                    Some(Player::X) => 'X',
                    Some(Player::O) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "     ")?;
        for x in min_x..=max_x {
            write!(f, "{} ", x.rem_euclid(10))?;
        }
        writeln!(f)?;

        let hidden = self.cells.keys().filter(|&&c| !view.contains(c)).count();
        if hidden > 0 {
            writeln!(f, "({hidden} stones outside x {min_x}..{max_x}, y {min_y}..{max_y})")?;
        }
        Ok(())
    }
}
