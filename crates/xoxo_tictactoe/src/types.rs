//! Core domain types for tic-tac-toe.

use super::action::MoveError;
use super::position::Position;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the two marks.
///
/// `X` is the first mark and `O` the second. Which of them moves first in a
/// given round is decided by the caller, not by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
pub enum Player {
    /// First mark.
    X,
    /// Second mark.
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Single-character symbol used by the board encoding.
    pub fn symbol(self) -> char {
        match self {
            Player::X => 'X',
            Player::O => 'O',
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a player.
    Occupied(Player),
}

impl Square {
    /// Returns the occupying player, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Square::Empty => None,
            Square::Occupied(player) => Some(player),
        }
    }
}

impl From<Option<Player>> for Square {
    fn from(value: Option<Player>) -> Self {
        value.map_or(Square::Empty, Square::Occupied)
    }
}

/// 3x3 tic-tac-toe board.
///
/// Boards are values: [`Board::apply_move`] returns a new board and never
/// edits the one it was called on, so a board handed to another reader
/// stays valid.
///
/// The serialized form is an array of nine `"X"`, `"O"` or `null` entries,
/// which is the shape stored in shared game documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[Option<Player>; 9]", into = "[Option<Player>; 9]")]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; 9],
        }
    }

    /// Gets the square at the given position.
    pub fn get(&self, pos: Position) -> Square {
        self.squares[pos.to_index()]
    }

    /// Sets the square at the given position in place.
    ///
    /// Only used while building boards inside this crate; public callers go
    /// through [`Board::apply_move`].
    pub(crate) fn set(&mut self, pos: Position, square: Square) {
        self.squares[pos.to_index()] = square;
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Places `player` at `pos`, returning the resulting board.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::CellOccupied`] if the square is taken.
    #[instrument(skip(self))]
    pub fn apply_move(&self, pos: Position, player: Player) -> Result<Board, MoveError> {
        if !self.is_empty(pos) {
            return Err(MoveError::CellOccupied(pos));
        }
        let mut next = *self;
        next.set(pos, Square::Occupied(player));
        Ok(next)
    }

    /// Empty positions in board order.
    pub fn empty_positions(&self) -> Vec<Position> {
        Position::ALL
            .iter()
            .copied()
            .filter(|pos| self.is_empty(*pos))
            .collect()
    }

    /// Number of X and O marks on the board, in that order.
    pub fn mark_counts(&self) -> (usize, usize) {
        self.squares
            .iter()
            .fold((0, 0), |(x, o), square| match square {
                Square::Occupied(Player::X) => (x + 1, o),
                Square::Occupied(Player::O) => (x, o + 1),
                Square::Empty => (x, o),
            })
    }

    /// True when the mark counts differ by at most one.
    ///
    /// Every board produced by alternating turns satisfies this, whichever
    /// mark led the round.
    pub fn is_alternating(&self) -> bool {
        let (x, o) = self.mark_counts();
        x.abs_diff(o) <= 1
    }

    /// Formats the board as a human-readable grid.
    ///
    /// Empty squares show their index so a terminal player knows what to type.
    pub fn render(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                match self.squares[pos] {
                    Square::Empty => result.push_str(&pos.to_string()),
                    Square::Occupied(player) => result.push(player.symbol()),
                }
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[Option<Player>; 9]> for Board {
    fn from(cells: [Option<Player>; 9]) -> Self {
        Self {
            squares: cells.map(Square::from),
        }
    }
}

impl From<Board> for [Option<Player>; 9] {
    fn from(board: Board) -> Self {
        board.squares.map(Square::player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_move_leaves_original_untouched() {
        let board = Board::new();
        let next = board.apply_move(Position::Center, Player::X).unwrap();
        assert!(board.is_empty(Position::Center));
        assert_eq!(next.get(Position::Center), Square::Occupied(Player::X));
    }

    #[test]
    fn test_apply_move_rejects_occupied() {
        let board = Board::new().apply_move(Position::TopLeft, Player::X).unwrap();
        let result = board.apply_move(Position::TopLeft, Player::O);
        assert_eq!(result, Err(MoveError::CellOccupied(Position::TopLeft)));
    }

    #[test]
    fn test_serializes_as_nullable_array() {
        let board = Board::new()
            .apply_move(Position::TopLeft, Player::X)
            .unwrap()
            .apply_move(Position::BottomRight, Player::O)
            .unwrap();
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, r#"["X",null,null,null,null,null,null,null,"O"]"#);
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn test_mark_counts_and_alternation() {
        let board = Board::new()
            .apply_move(Position::TopLeft, Player::O)
            .unwrap()
            .apply_move(Position::Center, Player::X)
            .unwrap()
            .apply_move(Position::TopRight, Player::O)
            .unwrap();
        assert_eq!(board.mark_counts(), (1, 2));
        assert!(board.is_alternating());

        let lopsided = board.apply_move(Position::BottomLeft, Player::O).unwrap();
        assert!(!lopsided.is_alternating());
    }

    #[test]
    fn test_render_shows_indices_for_empty_squares() {
        let board = Board::new().apply_move(Position::Center, Player::X).unwrap();
        assert_eq!(board.render(), "0|1|2\n-+-+-\n3|X|5\n-+-+-\n6|7|8");
    }
}
