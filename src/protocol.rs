//! Line-oriented text protocol for driving the engine.
//!
//! The protocol follows the shape of GTP: each request is an optional numeric
//! id, a command and its arguments. A reply is `=id message` on success or
//! `?id message` on failure, followed by an empty line.
//!
//! Coordinates are written `x,y` (or as two arguments `x y`), players as
//! `x` or `o`.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `clear_board` - Remove all stones
//! - `line_length <n>` - Change the winning line length (clears the board)
//! - `play <x,y>` - Play a stone for the player to move
//! - `undo <x,y>` - Take back a stone
//! - `genmove [budget_ms]` - Let the solver pick and play a move
//! - `winner` - `none`, `x`, `o` or `draw`
//! - `score [x|o]` - Current score(s)
//! - `best_line <x|o>` - The tracked best line
//! - `moves [n]` - Top candidate moves with their weights
//! - `hotspots [n]` - Heaviest free cells of the weight field
//! - `showboard` - Text rendering of the stones

use std::io::{self, BufRead, Write};

use anyhow::{Context, bail};
use tracing::{debug, warn};

use crate::board::{Board, GameResult, Player};
use crate::error::Error;
use crate::field::Cell;
use crate::rules::RuleConfig;
use crate::solver::Solver;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "best_line",
    "clear_board",
    "genmove",
    "hotspots",
    "known_command",
    "line_length",
    "list_commands",
    "moves",
    "name",
    "play",
    "protocol_version",
    "quit",
    "score",
    "showboard",
    "undo",
    "version",
    "winner",
];

/// Default thinking time for `genmove`.
pub const DEFAULT_BUDGET_MS: u64 = 1000;

/// Default number of entries listed by `moves` and `hotspots`.
const DEFAULT_LISTING: usize = 10;

/// Protocol engine state.
pub struct ProtocolEngine {
    board: Board,
    solver: Solver,
    budget_ms: u64,
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new(RuleConfig::default(), Solver::new(), DEFAULT_BUDGET_MS)
    }
}

impl ProtocolEngine {
    pub fn new(rules: RuleConfig, solver: Solver, budget_ms: u64) -> Self {
        Self {
            board: Board::new(rules),
            solver,
            budget_ms,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Serve requests from stdin until `quit` or end of input.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Serve requests from `input`, writing replies to `output`.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n").context("failed to write reply")?;
            output.flush().context("failed to flush reply")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());

        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute a command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match self.dispatch(command, args) {
            Ok(message) => (true, message),
            Err(err) => {
                warn!(command, error = %err, "command failed");
                (false, format!("{err:#}"))
            }
        }
    }

    fn dispatch(&mut self, command: &str, args: &[&str]) -> anyhow::Result<String> {
        debug!(command, ?args, "dispatching");
        match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),

            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => Ok("2".to_string()),

            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(name) = args.first() else {
                    bail!("missing argument");
                };
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                Ok(known.to_string())
            }

            "quit" => Ok(String::new()),

            "clear_board" => {
                self.board.clear();
                Ok(String::new())
            }

            "line_length" => {
                let Some(arg) = args.first() else {
                    bail!("missing argument");
                };
                let length: usize = arg
                    .parse()
                    .with_context(|| format!("invalid line length '{arg}'"))?;
                let rules = self.board.rules().with_line_length(length)?;
                self.board = Board::new(rules);
                Ok(String::new())
            }

            "play" => {
                let (x, y) = parse_cell(args)?;
                self.board.play(x, y)?;
                Ok(String::new())
            }

            "undo" => {
                let (x, y) = parse_cell(args)?;
                if !self.board.undo_move(x, y) {
                    bail!("no stone at {x},{y}");
                }
                Ok(String::new())
            }

            "genmove" => {
                let budget_ms = match args.first() {
                    Some(arg) => arg
                        .parse()
                        .with_context(|| format!("invalid time budget '{arg}'"))?,
                    None => self.budget_ms,
                };
                let Some(mv) = self.solver.find_best_move(&self.board, budget_ms) else {
                    return Ok("none".to_string());
                };
                self.board.play(mv.x, mv.y)?;
                Ok(format!("{},{}", mv.x, mv.y))
            }

            "winner" => {
                let result = match self.board.check_winner() {
                    GameResult::Undecided => "none",
                    GameResult::XWins => "x",
                    GameResult::OWins => "o",
                    GameResult::Draw => "draw",
                };
                Ok(result.to_string())
            }

            "score" => match args.first() {
                Some(arg) => {
                    let player: Player = arg.parse()?;
                    Ok(format!("{:.2}", self.board.score_of(player)))
                }
                None => Ok(format!(
                    "x {:.2} o {:.2}",
                    self.board.score_of(Player::X),
                    self.board.score_of(Player::O)
                )),
            },

            "best_line" => {
                let Some(arg) = args.first() else {
                    bail!("missing argument");
                };
                let player: Player = arg.parse()?;
                Ok(self
                    .board
                    .best_line(player)
                    .map_or_else(|| "none".to_string(), |line| line.to_string()))
            }

            "moves" => {
                let count = parse_count(args)?;
                let listing: Vec<String> = self
                    .board
                    .weighted_moves()
                    .into_iter()
                    .take(count)
                    .map(|(mv, weight)| format!("{},{} {weight:.2}", mv.x, mv.y))
                    .collect();
                Ok(listing.join("\n"))
            }

            "hotspots" => {
                let count = parse_count(args)?;
                let half = (self.board.rules().field_size() / 2) as i32;
                let listing: Vec<String> = self
                    .board
                    .field()
                    .top_cells(count, half)
                    .into_iter()
                    .map(|((x, y), weight)| format!("{x},{y} {weight:.2}"))
                    .collect();
                Ok(listing.join("\n"))
            }

            "showboard" => Ok(format!("\n{}", self.board)),

            _ => bail!("unknown command: {command}"),
        }
    }
}

/// Parse `x,y` from one argument or `x y` from two.
fn parse_cell(args: &[&str]) -> Result<Cell, Error> {
    let joined = args.join(" ");
    let invalid = || Error::InvalidCoordinate {
        input: joined.clone(),
    };

    let mut parts = joined
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    match (x.parse(), y.parse()) {
        (Ok(x), Ok(y)) => Ok((x, y)),
        _ => Err(invalid()),
    }
}

fn parse_count(args: &[&str]) -> anyhow::Result<usize> {
    match args.first() {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid count '{arg}'")),
        None => Ok(DEFAULT_LISTING),
    }
}
