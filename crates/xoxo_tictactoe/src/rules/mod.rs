//! Game rules for tic-tac-toe.
//!
//! This module contains pure functions for evaluating board state
//! according to tic-tac-toe rules. Rules are separated from board
//! storage so the local controller, the online coordinator and the
//! computer opponent all judge boards the same way.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, evaluate};

use super::{Board, Outcome};
use tracing::instrument;

/// Returns the round outcome, or `None` while play continues.
///
/// A winner takes precedence over a full board.
#[instrument]
pub fn outcome(board: &Board) -> Option<Outcome> {
    if let Some(winner) = evaluate(board).winner {
        Some(Outcome::Winner(winner))
    } else if is_full(board) {
        Some(Outcome::Draw)
    } else {
        None
    }
}
