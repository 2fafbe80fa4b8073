//! Greedy computer opponent.
//!
//! One-ply lookahead only: take a win, block a loss, then prefer center,
//! corners and anything else. It can be beaten.

use super::rules::evaluate;
use super::{Board, Player, Position};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, instrument};

/// Picks a square for `me`.
///
/// Returns `None` only when the board is full. Ties among corners and among
/// the remaining squares are broken uniformly at random with `rng`.
#[instrument(skip(rng))]
pub fn choose_move<R: Rng + ?Sized>(board: &Board, me: Player, rng: &mut R) -> Option<Position> {
    let empty = board.empty_positions();
    if empty.is_empty() {
        debug!("Board is full, no move");
        return None;
    }

    if let Some(pos) = completing_move(board, &empty, me) {
        debug!(position = %pos, "Taking the win");
        return Some(pos);
    }

    if let Some(pos) = completing_move(board, &empty, me.opponent()) {
        debug!(position = %pos, "Blocking");
        return Some(pos);
    }

    if board.is_empty(Position::Center) {
        debug!("Taking center");
        return Some(Position::Center);
    }

    let corners: Vec<Position> = Position::CORNERS
        .into_iter()
        .filter(|pos| board.is_empty(*pos))
        .collect();
    if let Some(pos) = corners.choose(rng) {
        debug!(position = %pos, "Taking a corner");
        return Some(*pos);
    }

    let pos = empty.choose(rng).copied();
    debug!(position = ?pos, "Taking a remaining square");
    pos
}

/// First empty square that would give `player` a line.
///
/// Candidates are tried in the evaluator's line order so the result matches
/// the line [`evaluate`] would report.
fn completing_move(board: &Board, empty: &[Position], player: Player) -> Option<Position> {
    super::rules::LINES
        .iter()
        .flatten()
        .copied()
        .filter(|pos| empty.contains(pos))
        .find(|pos| {
            board
                .apply_move(*pos, player)
                .is_ok_and(|next| evaluate(&next).winner == Some(player))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_full_board_has_no_move() {
        let board: Board = "XOXXOOOXX".parse().unwrap();
        assert_eq!(choose_move(&board, Player::O, &mut rng()), None);
    }

    #[test]
    fn test_blocks_column() {
        // X O _ / X O _ / _ _ _ with O to move: X threatens 6, O threatens 7.
        // Winning beats blocking.
        let board: Board = "XO-XO----".parse().unwrap();
        assert_eq!(
            choose_move(&board, Player::O, &mut rng()),
            Some(Position::BottomCenter)
        );
        // X to move takes its own win at 6.
        assert_eq!(
            choose_move(&board, Player::X, &mut rng()),
            Some(Position::BottomLeft)
        );
    }

    #[test]
    fn test_blocks_when_no_win() {
        // X X _ / _ O _ / _ _ _ with O to move.
        let board: Board = "XX--O----".parse().unwrap();
        assert_eq!(
            choose_move(&board, Player::O, &mut rng()),
            Some(Position::TopRight)
        );
    }

    #[test]
    fn test_takes_center_on_open_board() {
        assert_eq!(
            choose_move(&Board::new(), Player::O, &mut rng()),
            Some(Position::Center)
        );
    }

    #[test]
    fn test_takes_a_corner_when_center_gone() {
        let board: Board = "----X----".parse().unwrap();
        for seed in 0..32 {
            let pos = choose_move(&board, Player::O, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(Position::CORNERS.contains(&pos), "{pos} is not a corner");
        }
    }

    #[test]
    fn test_falls_back_to_edges() {
        // O X O / _ X _ / X O X: center and corners taken, nothing to win
        // or block on 3 or 5.
        let board: Board = "OXO-X-XOX".parse().unwrap();
        let pos = choose_move(&board, Player::O, &mut rng()).unwrap();
        assert!(matches!(pos, Position::MiddleLeft | Position::MiddleRight));
    }
}
