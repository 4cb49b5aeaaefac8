//! Integration tests for the board and its best-line engine.
//!
//! Positions are written as move lists in play order (X first, alternating).

use infinite_ttt::{Board, Direction, GameResult, MoveError, Player, RuleConfig};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

fn setup_board(moves: &[(i32, i32)]) -> Board {
    setup_board_with(RuleConfig::default(), moves)
}

fn setup_board_with(rules: RuleConfig, moves: &[(i32, i32)]) -> Board {
    let mut board = Board::new(rules);
    for &(x, y) in moves {
        assert!(board.make_move(x, y), "illegal setup move {x},{y}");
    }
    board
}

// =============================================================================
// Scoring scenarios
// =============================================================================

#[test]
fn test_first_pair_scores() {
    let board = setup_board(&[(0, 0), (5, 5), (1, 0)]);

    let line = board.best_line(Player::X).unwrap();
    assert_eq!(line.direction(), Direction::Horizontal);
    assert_eq!(line.cells(), &[(0, 0), (1, 0)]);
    assert!(board.score_of(Player::X) > 0.0);
    assert_eq!(board.score_of(Player::X), line.total_weight());
    assert_eq!(board.score_of(Player::O), 0.0);
    assert!(board.best_line(Player::O).is_none());
    assert_eq!(board.check_winner(), GameResult::Undecided);
}

#[test]
fn test_blocking_both_ends_zeroes_score() {
    let mut board = setup_board(&[
        (0, 0),
        (4, 0),
        (1, 0),
        (10, 10),
        (2, 0),
        (10, 11),
        (3, 0),
    ]);
    // One end is closed, the other still open
    assert!(!board.best_line(Player::X).unwrap().is_fully_blocked());
    let before = board.score_of(Player::X);
    assert!(before > 0.0);

    assert!(board.make_move(-1, 0));

    let line = board.best_line(Player::X).unwrap();
    assert!(line.is_fully_blocked());
    assert!(!line.is_active());
    assert_eq!(board.score_of(Player::X), 0.0);
    // O's vertical pair is untouched
    assert!(board.score_of(Player::O) > 0.0);
}

#[test]
fn test_dead_line_gives_way_to_open_run() {
    // X builds a row that gets closed, plus a separate vertical pair
    let mut board = setup_board(&[
        (0, 0),
        (-1, 0),
        (1, 0),
        (8, 8),
        (2, 0),
        (8, -8),
        (0, 3),
        (-8, 8),
        (0, 4),
    ]);
    assert_eq!(board.best_line(Player::X).unwrap().len(), 3);

    // O closes the row; the rebuild still prefers the heavier, dead row
    assert!(board.make_move(3, 0));
    let line = board.best_line(Player::X).unwrap();
    assert_eq!(line.len(), 3);
    assert!(!line.is_active());
    assert_eq!(board.score_of(Player::X), 0.0);

    // The next X stone starts over from the open column
    assert!(board.make_move(0, 5));
    let line = board.best_line(Player::X).unwrap();
    assert_eq!(line.cells(), &[(0, 3), (0, 4), (0, 5)]);
    assert!(line.is_active());
    assert!(board.score_of(Player::X) > 0.0);
}

#[test]
fn test_score_decides_the_winner() {
    // X completes five, but the run is closed at both ends
    let board = setup_board(&[
        (0, 0),
        (-1, 0),
        (1, 0),
        (5, 0),
        (2, 0),
        (0, 3),
        (3, 0),
        (1, 3),
        (4, 0),
    ]);
    assert!(board.has_run(Player::X));
    assert_eq!(board.score_of(Player::X), 0.0);
    assert!(board.score_of(Player::O) > 0.0);
    assert_eq!(board.check_winner(), GameResult::OWins);
}

#[test]
fn test_open_five_wins() {
    let board = setup_board(&[
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
    assert_eq!(board.check_winner(), GameResult::XWins);
    assert_eq!(board.check_winner().winner(), Some(Player::X));
}

#[test]
fn test_shorter_line_length() {
    let rules = RuleConfig::new(3).unwrap();
    let board = setup_board_with(rules, &[(0, 0), (5, 5), (1, 1), (6, 6), (2, 2)]);
    assert!(board.has_run(Player::X));
    assert_eq!(board.check_winner(), GameResult::XWins);
    assert_eq!(board.line_completion(Player::X), 1.0);
}

#[test]
fn test_simple_rules_never_block() {
    let board = setup_board_with(
        RuleConfig::simple(),
        &[(0, 0), (-1, 0), (1, 0), (2, 0)],
    );
    let line = board.best_line(Player::X).unwrap();
    assert!(!line.is_fully_blocked());
    // Closed at both ends, still scoring
    assert!(board.score_of(Player::X) > 0.0);
    assert_eq!(board.weight(10, 10), 1.0);
}

// =============================================================================
// Undo and clone
// =============================================================================

#[test]
fn test_undo_restores_state() {
    let mut board = setup_board(&[(0, 0), (5, 5), (1, 0), (5, 6)]);
    let score_x = board.score_of(Player::X);
    let score_o = board.score_of(Player::O);
    let line = board.best_line(Player::X).cloned();

    assert!(board.make_move(2, 0));
    assert!(board.score_of(Player::X) > score_x);
    assert!(board.undo_move(2, 0));

    assert_eq!(board.current_player(), Player::X);
    assert_eq!(board.move_count(), 4);
    assert_eq!(board.cell(2, 0), None);
    assert_eq!(board.score_of(Player::X), score_x);
    assert_eq!(board.score_of(Player::O), score_o);
    assert_eq!(board.best_line(Player::X).cloned(), line);
}

#[test]
fn test_undo_whole_game() {
    let moves = [(0, 0), (1, 1), (1, 0), (2, 2), (2, 0), (0, 2), (-1, 0)];
    let mut board = setup_board(&moves);
    for &(x, y) in moves.iter().rev() {
        assert!(board.undo_move(x, y));
    }
    assert_eq!(board.move_count(), 0);
    assert_eq!(board.current_player(), Player::X);
    assert!(board.best_line(Player::X).is_none());
    assert!(board.best_line(Player::O).is_none());
    assert!(board.field().bounds().is_none());
}

#[test]
fn test_clone_does_not_alias() {
    let board = setup_board(&[(0, 0), (5, 5), (1, 0)]);
    let mut copy = board.clone();
    assert!(copy.make_move(1, 1));
    assert!(copy.make_move(2, 0));

    assert_eq!(board.move_count(), 3);
    assert_eq!(board.cell(2, 0), None);
    assert_eq!(board.best_line(Player::X).unwrap().len(), 2);
    assert_eq!(copy.best_line(Player::X).unwrap().len(), 3);
    assert_ne!(board.weight(2, 0), copy.weight(2, 0));
}

#[test]
fn test_clone_round_trip() {
    let mut board = setup_board(&[(0, 0), (5, 5), (1, 0), (4, 4)]);
    let mut copy = board.clone();
    assert!(copy.make_move(2, 0));
    assert!(board.make_move(2, 0));

    assert_eq!(copy.check_winner(), board.check_winner());
    assert_eq!(copy.score_of(Player::X), board.score_of(Player::X));
    assert_eq!(copy.score_of(Player::O), board.score_of(Player::O));
}

// =============================================================================
// Error signalling
// =============================================================================

#[test]
fn test_illegal_actions_are_values() {
    let mut board = Board::default();
    assert_eq!(board.check_winner(), GameResult::Undecided);
    assert_eq!(board.score_of(Player::X), 0.0);
    assert!(!board.undo_move(0, 0));

    assert!(board.make_move(0, 0));
    assert!(!board.make_move(0, 0));
    assert_eq!(board.play(0, 0), Err(MoveError::Occupied { x: 0, y: 0 }));
    assert_eq!(board.move_count(), 1);
    assert_eq!(board.current_player(), Player::O);
}

#[test]
fn test_invalid_rules() {
    assert!(RuleConfig::new(1).is_err());
    let err = RuleConfig::default().with_field_size(3).unwrap_err();
    assert!(err.to_string().contains("field size"));
    assert!("z".parse::<Player>().is_err());
    assert_eq!("O".parse::<Player>().unwrap(), Player::O);
}

// =============================================================================
// Move generation
// =============================================================================

#[test]
fn test_moves_follow_weights() {
    let board = setup_board(&[(0, 0), (3, 3), (1, 0)]);
    let moves = board.weighted_moves();
    assert!(!moves.is_empty());
    assert!(moves.windows(2).all(|w| w[0].1 >= w[1].1));
    assert!(moves.iter().all(|(m, _)| board.cell(m.x, m.y).is_none()));
    assert!(moves.iter().all(|(m, _)| m.player == Player::O));
}

#[test]
fn test_move_area_grows_with_the_game() {
    let early = setup_board(&[(0, 0)]);
    // Only the neighbors of the single stone
    assert_eq!(early.possible_moves().len(), 8);

    let moves: Vec<(i32, i32)> = (0..8).map(|i| (i * 2 - 8, (i % 2) * 6)).collect();
    let middle = setup_board(&moves);
    let bounds = middle.field().bounds().unwrap();
    let area = ((bounds.width() + 4) * (bounds.height() + 4)) as usize;
    assert_eq!(middle.possible_moves().len(), area - 8);
}

#[test]
fn test_distant_groups_keep_move_generation_local() {
    let board = setup_board(&[
        (0, 0),
        (50_000, 50_000),
        (1, 0),
        (50_001, 50_000),
        (2, 0),
        (50_002, 50_000),
        (0, 5),
        (50_000, 50_005),
    ]);
    // Two padded neighborhoods of 60 cells each, minus the 4 stones in each
    let moves = board.possible_moves();
    assert_eq!(moves.len(), 112);
    assert!(moves.iter().all(|m| m.x <= 4 || m.x >= 49_998));
    assert!(!board.to_string().is_empty());
}

#[test]
fn test_extreme_coordinates_are_refused() {
    let mut board = setup_board(&[(0, 0)]);
    assert_eq!(
        board.play(i32::MAX, 0),
        Err(MoveError::OutOfRange { x: i32::MAX, y: 0 })
    );
    assert!(!board.make_move(i32::MIN, i32::MIN));
    assert_eq!(board.move_count(), 1);
    assert_eq!(board.current_player(), Player::O);
}

#[test]
fn test_stones_and_lines() {
    let board = setup_board(&[(0, 0), (0, 1), (1, 0), (1, 1), (2, 0)]);
    let mut x_stones: Vec<_> = board.stones(Player::X).collect();
    x_stones.sort();
    assert_eq!(x_stones, vec![(0, 0), (1, 0), (2, 0)]);
    assert_eq!(board.player_lines(Player::X).count(), 1);
    assert_eq!(board.all_lines(Player::O, 2).len(), 1);
}
