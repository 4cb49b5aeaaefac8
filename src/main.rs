//! Infinite tic-tac-toe engine.
//!
//! ## Usage
//!
//! - `infinite-ttt` - Self-play demo
//! - `infinite-ttt play` - Serve the text protocol on stdin/stdout
//! - `infinite-ttt demo --moves 40` - Longer self-play demo
//!
//! Logs go to stderr; repeat `-v` for more detail.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{Level, info};

use infinite_ttt::protocol::{DEFAULT_BUDGET_MS, ProtocolEngine};
use infinite_ttt::{Board, Player, RuleConfig, Solver};

/// Infinite tic-tac-toe: gomoku on an unbounded grid, decided by score
#[derive(Parser)]
#[command(name = "infinite-ttt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the text protocol on stdin/stdout
    Play(EngineArgs),
    /// Let the solver play against itself
    Demo {
        #[command(flatten)]
        engine: EngineArgs,

        /// Maximum number of moves to play
        #[arg(long, default_value_t = 30)]
        moves: usize,
    },
}

#[derive(Args, Clone)]
struct EngineArgs {
    /// Stones in a row needed to end the game
    #[arg(long, default_value_t = 5)]
    length: usize,

    /// Soft thinking time per move in milliseconds
    #[arg(long, default_value_t = DEFAULT_BUDGET_MS)]
    budget_ms: u64,

    /// Flat cell weights and no line resets on blocks
    #[arg(long)]
    simple: bool,

    /// Break ties randomly with this seed
    #[arg(long)]
    seed: Option<u64>,
}

impl Default for EngineArgs {
    fn default() -> Self {
        Self {
            length: 5,
            budget_ms: DEFAULT_BUDGET_MS,
            simple: false,
            seed: None,
        }
    }
}

impl EngineArgs {
    fn rules(&self) -> anyhow::Result<RuleConfig> {
        let base = if self.simple {
            RuleConfig::simple()
        } else {
            RuleConfig::default()
        };
        base.with_line_length(self.length)
            .context("invalid --length")
    }

    fn solver(&self) -> Solver {
        match self.seed {
            Some(seed) => Solver::with_seed(seed),
            None => Solver::new(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Play(args)) => {
            let mut engine = ProtocolEngine::new(args.rules()?, args.solver(), args.budget_ms);
            engine.run()
        }
        Some(Commands::Demo { engine, moves }) => run_demo(&engine, moves),
        None => run_demo(&EngineArgs::default(), 30),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run_demo(args: &EngineArgs, max_moves: usize) -> anyhow::Result<()> {
    let rules = args.rules()?;
    println!("Infinite tic-tac-toe self-play ({rules})\n");

    let mut board = Board::new(rules);
    let mut solver = args.solver();

    for turn in 1..=max_moves {
        let Some(mv) = solver.find_best_move(&board, args.budget_ms) else {
            break;
        };
        board
            .play(mv.x, mv.y)
            .with_context(|| format!("solver chose an illegal move {mv}"))?;

        if let Some(report) = solver.last_report() {
            info!(turn, %mv, layer = ?report.layer, elapsed = ?report.elapsed, "played");
            println!(
                "{turn:>3}. {:<10} via {:<15} {:>6.1} ms",
                mv.to_string(),
                report.layer.map(|l| l.to_string()).unwrap_or_default(),
                report.elapsed.as_secs_f64() * 1000.0
            );
        }
        if board.check_winner().is_over() {
            break;
        }
    }

    println!("\n{board}");
    println!(
        "Result: {:?} (X {:.2}, O {:.2})",
        board.check_winner(),
        board.score_of(Player::X),
        board.score_of(Player::O)
    );
    Ok(())
}
