//! Nine-character board encoding.
//!
//! Row-major, one character per square: `X`, `O`, or `-` for empty. This is
//! the `moves` field of stored match records.

use super::{Board, Player, Position, Square};
use derive_more::{Display, Error};
use tracing::instrument;

/// Character used for an empty square.
pub const EMPTY_SYMBOL: char = '-';

/// Failure to decode a board string.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum DecodeError {
    /// The input was not exactly nine characters.
    #[display("Board encoding must be 9 characters, got {}", _0)]
    Length(#[error(not(source))] usize),
    /// A character other than `X`, `O` or `-`.
    #[display("Unexpected character {:?} at index {}", symbol, index)]
    Symbol {
        /// Offending character.
        symbol: char,
        /// Its position in the input.
        index: usize,
    },
}

impl Board {
    /// Encodes the board as nine characters.
    pub fn encode(&self) -> String {
        self.squares()
            .iter()
            .map(|square| match square {
                Square::Empty => EMPTY_SYMBOL,
                Square::Occupied(player) => player.symbol(),
            })
            .collect()
    }

    /// Decodes a board from its nine-character form.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the length is wrong or a character is not
    /// part of the encoding.
    #[instrument]
    pub fn decode(encoded: &str) -> Result<Board, DecodeError> {
        let symbols: Vec<char> = encoded.chars().collect();
        if symbols.len() != 9 {
            return Err(DecodeError::Length(symbols.len()));
        }

        let mut board = Board::new();
        for (pos, (index, symbol)) in Position::ALL.into_iter().zip(symbols.into_iter().enumerate()) {
            let square = match symbol {
                'X' => Square::Occupied(Player::X),
                'O' => Square::Occupied(Player::O),
                EMPTY_SYMBOL => Square::Empty,
                other => return Err(DecodeError::Symbol { symbol: other, index }),
            };
            board.set(pos, square);
        }
        Ok(board)
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl std::str::FromStr for Board {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_empty() {
        assert_eq!(Board::new().encode(), "---------");
    }

    #[test]
    fn test_encode_decode() {
        let board: Board = "XO-X-O--X".parse().unwrap();
        assert_eq!(board.get(Position::TopLeft), Square::Occupied(Player::X));
        assert_eq!(board.get(Position::TopCenter), Square::Occupied(Player::O));
        assert!(board.is_empty(Position::Center));
        assert_eq!(board.to_string(), "XO-X-O--X");
    }

    #[test]
    fn test_decode_rejects_bad_length() {
        assert_eq!(Board::decode("XO"), Err(DecodeError::Length(2)));
    }

    #[test]
    fn test_decode_rejects_unknown_symbol() {
        assert_eq!(
            Board::decode("XO-x-----"),
            Err(DecodeError::Symbol { symbol: 'x', index: 3 })
        );
    }
}
