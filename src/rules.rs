//! Game rules consumed by the board.
//!
//! A [`RuleConfig`] is built once and then only read. It is a small `Copy`
//! value, so every board (and every clone of a board) carries its own copy.

use crate::constants::{MAX_FIELD_SIZE, MAX_LINE_LENGTH};
use crate::error::{Error, Result};

/// Rules of a game on the unbounded grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleConfig {
    field_size: u32,
    required_line_length: usize,
    single_line_scoring: bool,
    reset_on_full_block: bool,
    both_ends_required: bool,
    position_bonuses: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            field_size: 21,
            required_line_length: 5,
            single_line_scoring: true,
            reset_on_full_block: true,
            both_ends_required: true,
            position_bonuses: true,
        }
    }
}

impl RuleConfig {
    /// Create rules with the given line length and default flags.
    ///
    /// The field size grows to at least the line length.
    pub fn new(required_line_length: usize) -> Result<Self> {
        let defaults = Self::default();
        Self {
            required_line_length,
            field_size: defaults.field_size.max(required_line_length as u32),
            ..defaults
        }
        .validated()
    }

    /// Plain rules: flat cell weights and blocked lines keep their score.
    pub fn simple() -> Self {
        Self {
            reset_on_full_block: false,
            position_bonuses: false,
            ..Self::default()
        }
    }

    pub fn with_field_size(self, field_size: u32) -> Result<Self> {
        Self { field_size, ..self }.validated()
    }

    pub fn with_line_length(self, required_line_length: usize) -> Result<Self> {
        Self {
            required_line_length,
            ..self
        }
        .validated()
    }

    pub fn with_single_line_scoring(self, on: bool) -> Self {
        Self {
            single_line_scoring: on,
            ..self
        }
    }

    pub fn with_reset_on_full_block(self, on: bool) -> Self {
        Self {
            reset_on_full_block: on,
            ..self
        }
    }

    pub fn with_both_ends_required(self, on: bool) -> Self {
        Self {
            both_ends_required: on,
            ..self
        }
    }

    pub fn with_position_bonuses(self, on: bool) -> Self {
        Self {
            position_bonuses: on,
            ..self
        }
    }

    fn validated(self) -> Result<Self> {
        if self.required_line_length < 2 {
            return Err(Error::InvalidRules {
                message: format!(
                    "line length must be at least 2 (got {})",
                    self.required_line_length
                ),
            });
        }
        if self.required_line_length > MAX_LINE_LENGTH {
            return Err(Error::InvalidRules {
                message: format!(
                    "line length must be at most {MAX_LINE_LENGTH} (got {})",
                    self.required_line_length
                ),
            });
        }
        if self.field_size > MAX_FIELD_SIZE {
            return Err(Error::InvalidRules {
                message: format!(
                    "field size must be at most {MAX_FIELD_SIZE} (got {})",
                    self.field_size
                ),
            });
        }
        if (self.field_size as usize) < self.required_line_length {
            return Err(Error::InvalidRules {
                message: format!(
                    "field size {} is shorter than the line length {}",
                    self.field_size, self.required_line_length
                ),
            });
        }
        Ok(self)
    }

    /// Nominal side of the playing area around the origin.
    #[inline]
    pub fn field_size(&self) -> u32 {
        self.field_size
    }

    /// Number of contiguous stones that ends the game.
    #[inline]
    pub fn required_line_length(&self) -> usize {
        self.required_line_length
    }

    /// Whether a player's score comes from its single best line only.
    #[inline]
    pub fn single_line_scoring(&self) -> bool {
        self.single_line_scoring
    }

    /// Whether fully blocked lines are detected (and then score zero).
    #[inline]
    pub fn reset_on_full_block(&self) -> bool {
        self.reset_on_full_block
    }

    /// Whether both ends must be dead for a line to count as fully blocked.
    #[inline]
    pub fn both_ends_required(&self) -> bool {
        self.both_ends_required
    }

    /// Whether untouched cells use the distance-decay weight formula.
    #[inline]
    pub fn position_bonuses(&self) -> bool {
        self.position_bonuses
    }
}

impl std::fmt::Display for RuleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line={} field={} single_line={} reset_on_block={} both_ends={} position_bonuses={}",
            self.required_line_length,
            self.field_size,
            self.single_line_scoring,
            self.reset_on_full_block,
            self.both_ends_required,
            self.position_bonuses
        )
    }
}
