//! Move rejection reasons.
//!
//! Every rejected move in the workspace is one of these. They are ordinary
//! values: the UI seam discards them, tests match on them.

use super::Player;
use super::Position;

/// Error that can occur when validating or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The index does not name a square.
    #[display("Position {} is out of bounds (must be 0-8)", _0)]
    OutOfBounds(usize),

    /// The square at the position is already occupied.
    #[display("Square {} is already occupied", _0)]
    CellOccupied(Position),

    /// The current round already has a result.
    #[display("Round is already over")]
    RoundOver,

    /// A series winner is waiting to be acknowledged.
    #[display("Series is over")]
    SeriesOver,

    /// It's not this player's turn.
    #[display("It's not {}'s turn", _0)]
    NotYourTurn(Player),

    /// The online game is finished.
    #[display("Game is already finished")]
    GameFinished,

    /// The online game is still waiting for a second player.
    #[display("Game has not started")]
    GameNotStarted,

    /// There is no active online game to act on.
    #[display("No active game")]
    NoActiveGame,

    /// The caller is not seated in the online game.
    #[display("Not a participant in this game")]
    NotAParticipant,
}

impl std::error::Error for MoveError {}
