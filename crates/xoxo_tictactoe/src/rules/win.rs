//! Win detection logic for tic-tac-toe.

use super::super::{Board, Position, Square, WinResult};
use tracing::instrument;

/// The eight winning lines in evaluation order: rows top to bottom,
/// columns left to right, then the two diagonals.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
    ],
    [
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ],
    // Columns
    [
        Position::TopLeft,
        Position::MiddleLeft,
        Position::BottomLeft,
    ],
    [
        Position::TopCenter,
        Position::Center,
        Position::BottomCenter,
    ],
    [
        Position::TopRight,
        Position::MiddleRight,
        Position::BottomRight,
    ],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Evaluates the board.
///
/// Returns the owner and positions of the first complete line in
/// [`LINES`] order, or an empty [`WinResult`].
#[instrument]
pub fn evaluate(board: &Board) -> WinResult {
    for line @ [a, b, c] in LINES {
        let sq = board.get(a);
        if let Square::Occupied(player) = sq
            && sq == board.get(b)
            && sq == board.get(c)
        {
            return WinResult::won(player, line);
        }
    }

    WinResult::none()
}
