//! Whole-board properties checked over every reachable position.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use xoxo_tictactoe::{Board, Outcome, Player, Position, evaluate, is_draw, opponent, rules};

/// Collects every board reachable by alternating play from an empty board,
/// starting with either mark. Play stops once a round has an outcome.
fn reachable_boards() -> HashSet<Board> {
    fn walk(board: Board, to_move: Player, seen: &mut HashSet<Board>) {
        if !seen.insert(board) || rules::outcome(&board).is_some() {
            return;
        }
        for pos in board.empty_positions() {
            let next = board.apply_move(pos, to_move).expect("empty square");
            walk(next, to_move.opponent(), seen);
        }
    }

    let mut seen = HashSet::new();
    walk(Board::new(), Player::X, &mut seen);
    walk(Board::new(), Player::O, &mut seen);
    seen
}

fn has_line(board: &Board, player: Player) -> bool {
    rules::LINES
        .iter()
        .any(|line| line.iter().all(|pos| board.get(*pos).player() == Some(player)))
}

#[test]
fn test_reachable_boards_never_have_two_winners() {
    for board in reachable_boards() {
        assert!(
            !(has_line(&board, Player::X) && has_line(&board, Player::O)),
            "both players have a line on {board}"
        );
        assert!(board.is_alternating(), "marks out of step on {board}");
    }
}

#[test]
fn test_encoding_roundtrips_for_reachable_boards() {
    for board in reachable_boards() {
        let encoded = board.encode();
        assert_eq!(encoded.len(), 9);
        assert_eq!(Board::decode(&encoded), Ok(board));
    }
}

#[test]
fn test_evaluate_is_idempotent() {
    for board in reachable_boards() {
        assert_eq!(evaluate(&board), evaluate(&board));
    }
}

#[test]
fn test_top_row_scenario() {
    let moves = [
        (0, Player::X),
        (4, Player::O),
        (1, Player::X),
        (8, Player::O),
        (2, Player::X),
    ];
    let board = moves.iter().fold(Board::new(), |board, (index, player)| {
        let pos = Position::try_from_index(*index).expect("in bounds");
        board.apply_move(pos, *player).expect("legal move")
    });

    let result = evaluate(&board);
    assert_eq!(result.winner, Some(Player::X));
    assert_eq!(
        result.line.map(|line| line.map(Position::to_index)),
        Some([0, 1, 2])
    );
}

#[test]
fn test_full_board_draw_scenario() {
    let board: Board = "XOXXOOOXX".parse().expect("valid encoding");
    assert_eq!(evaluate(&board).winner, None);
    assert!(is_draw(&board));
}

#[test]
fn test_opponent_never_loses_an_immediate_win() {
    let mut rng = StdRng::seed_from_u64(11);
    for board in reachable_boards() {
        if rules::outcome(&board).is_some() {
            continue;
        }
        let (x, o) = board.mark_counts();
        let me = if x > o { Player::O } else { Player::X };
        let pos = opponent::choose_move(&board, me, &mut rng).expect("board not full");
        assert!(board.is_empty(pos));

        let can_win = board.empty_positions().into_iter().any(|candidate| {
            let next = board.apply_move(candidate, me).expect("empty square");
            evaluate(&next).winner == Some(me)
        });
        if can_win {
            let next = board.apply_move(pos, me).expect("empty square");
            assert_eq!(rules::outcome(&next), Some(Outcome::Winner(me)));
        }
    }
}
