//! Constants for the weight field, move generation, and the solver.
//!
//! The engine is tuned through these values. Game rules that a caller may
//! legitimately change per game (line length, blocking variant, ...) live in
//! [`crate::rules::RuleConfig`] instead.

// =============================================================================
// Weight Field
// =============================================================================

/// Numerator of the distance-decay term `SCALE / (1 + distance)`.
pub const WEIGHT_DECAY_SCALE: f64 = 10.0;

/// Lower bound of the distance-decay term before bonuses are applied.
pub const WEIGHT_DECAY_MIN: f64 = 0.5;

/// Multiplier for cells on an axis or one of the two main diagonals.
pub const AXIS_BONUS: f64 = 1.2;

/// Multiplier for the origin.
pub const ORIGIN_BONUS: f64 = 2.0;

/// Multiplier for the four orthogonal unit cells around the origin.
pub const ORTHOGONAL_BONUS: f64 = 1.5;

/// Weight of every untouched cell under the flat profile.
pub const FLAT_WEIGHT: f64 = 1.0;

/// No stored weight ever drops below this value.
pub const WEIGHT_FLOOR: f64 = 0.1;

/// Factor applied to a cell's own weight when a stone lands on it.
pub const OCCUPIED_DECAY: f64 = 0.3;

/// Weight added to each of the 8 neighbors of a freshly occupied cell.
pub const NEIGHBOR_BOOST: f64 = 0.5;

/// Extra weight given to the cell that was just played.
pub const PLAYED_REWARD: f64 = 3.0;

/// Weight removed from a cell after its stone is undone.
pub const UNDO_DECAY: f64 = 1.0;

// =============================================================================
// Move Generation
// =============================================================================

/// Below this many stones only the 8-neighborhoods of stones are searched.
pub const ADJACENT_ONLY_MOVES: usize = 8;

/// Below this many stones the bounding box is padded by [`NEAR_PADDING`].
pub const NEAR_PADDING_MOVES: usize = 20;

/// Padding around the occupied bounding box in the middle game.
pub const NEAR_PADDING: i32 = 2;

/// Padding around the occupied bounding box in the late game.
pub const FAR_PADDING: i32 = 3;

/// Radius of the square scanned around the origin while the board is empty.
pub const EMPTY_BOARD_RADIUS: i32 = 3;

/// Largest `|x|` or `|y|` a stone may be placed at.
pub const COORDINATE_LIMIT: i32 = 100_000_000;

/// Padded bounding boxes with more cells than this are not scanned. Move
/// generation falls back to the padded neighborhoods of the stones.
pub const MAX_SCAN_AREA: i64 = 4096;

// =============================================================================
// Lines and Results
// =============================================================================

/// How many cells past each end of a line are inspected for blocking.
pub const BLOCK_LOOKAHEAD: i32 = 2;

/// A board with at least this many stones and no free cell around its stones
/// is a draw.
pub const DRAW_MOVE_CEILING: usize = 50;

/// Longest line length a rule set may require.
pub const MAX_LINE_LENGTH: usize = 64;

/// Largest nominal field size a rule set may declare.
pub const MAX_FIELD_SIZE: u32 = 1001;

/// Widest (and tallest) region drawn by the board's text rendering.
pub const MAX_RENDER_SPAN: i32 = 41;

// =============================================================================
// Solver
// =============================================================================

/// Candidates examined by the weighted evaluation layer.
pub const WEIGHTED_CANDIDATES: usize = 15;

/// Padding added to the occupied radius when filtering line extensions.
pub const EXTENSION_PADDING: i32 = 2;

/// Weighted layer: multiplier of the raw cell weight.
pub const EVAL_WEIGHT_SCALE: f64 = 100.0;

/// Weighted layer: multiplier of the blocking value.
pub const EVAL_BLOCK_SCALE: f64 = 1000.0;

/// Weighted layer: multiplier of the own-line value.
pub const EVAL_LINE_SCALE: f64 = 100.0;

/// Weighted layer: flat bonus for the 3x3 square around the origin.
pub const EVAL_CENTER_BONUS: f64 = 500.0;

// =============================================================================
// Composite Priority
// =============================================================================

/// Multiplier of the cell weight in the composite priority.
pub const PRIORITY_WEIGHT_SCALE: f64 = 100.0;

/// Bonus per same-player stone in the 8-neighborhood.
pub const ADJACENCY_BONUS: f64 = 50.0;

/// Position bonus of the origin.
pub const POSITION_ORIGIN: f64 = 1000.0;

/// Position bonus of the 8 cells around the origin.
pub const POSITION_NEAR_ORIGIN: f64 = 500.0;

/// Position bonus by Euclidean distance band (<= 2, <= 3, <= 4, <= 5).
pub const POSITION_BANDS: [f64; 4] = [60.0, 40.0, 20.0, 10.0];

/// Cells scanned on each side of a candidate for line potential.
pub const POTENTIAL_REACH: i32 = 4;

// =============================================================================
// Line Evaluation
// =============================================================================

/// Line potential: value of each own stone near the candidate (needs 2+).
pub const POTENTIAL_STONE: f64 = 25.0;

/// Line potential: value of each empty cell between the candidate and its
/// farthest own stone on the axis.
pub const POTENTIAL_EMPTY: f64 = 10.0;

/// Line potential: extra value with 3+ own stones on the axis.
pub const POTENTIAL_THREE_BONUS: f64 = 50.0;

/// Line potential: further value with 4+ own stones on the axis.
pub const POTENTIAL_FOUR_BONUS: f64 = 150.0;

/// Blocking value per cell of a touched opponent line.
pub const BLOCK_PER_CELL: f64 = 100.0;

/// Own-line value per cell of a line after the candidate is played.
pub const LINE_PER_CELL: f64 = 50.0;

/// Own-line value bonus for lines of 3+ cells.
pub const LINE_THREE_BONUS: f64 = 100.0;

/// Own-line value bonus for lines of 4+ cells (on top of the 3+ bonus).
pub const LINE_FOUR_BONUS: f64 = 200.0;
