//! Results of evaluating a board.

use super::{Player, Position};
use serde::{Deserialize, Serialize};

/// Outcome of a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Player won the round.
    Winner(Player),
    /// Round ended in a draw.
    Draw,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Player> {
        match self {
            Outcome::Winner(player) => Some(*player),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the round was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(player) => write!(f, "Player {} wins", player),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}

/// Winner and winning line found on a board, if any.
///
/// `winner` and `line` are either both present or both absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WinResult {
    /// The player owning the line.
    pub winner: Option<Player>,
    /// The three positions of the first complete line in evaluation order.
    pub line: Option<[Position; 3]>,
}

impl WinResult {
    /// A result with no winner.
    pub fn none() -> Self {
        Self::default()
    }

    /// A result crediting `player` with `line`.
    pub fn won(player: Player, line: [Position; 3]) -> Self {
        Self {
            winner: Some(player),
            line: Some(line),
        }
    }

    /// True when the line contains `pos`.
    pub fn contains(&self, pos: Position) -> bool {
        self.line.is_some_and(|line| line.contains(&pos))
    }
}
