//! An online game seen from one player's seat.

use derive_getters::Getters;
use serde::Serialize;
use xoxo_tictactoe::{Player, Position};

use crate::{GameOutcome, GameStatus, OnlineGame, Winner};

/// What one client shows for the active online game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct OnlineView {
    game: OnlineGame,
    my_mark: Option<Player>,
    my_turn: bool,
    result: Option<GameOutcome>,
    winning_line: Option<[Position; 3]>,
    status: String,
}

impl OnlineView {
    /// Builds the view of `game` for `uid`.
    pub fn new(game: OnlineGame, uid: &str) -> Self {
        let my_mark = game.mark_of(uid);
        let my_turn = *game.status() == GameStatus::Active && game.next_player_id() == uid;
        let result = match (game.status(), game.winner()) {
            (GameStatus::Finished, Some(Winner::Draw)) => Some(GameOutcome::Draw),
            (GameStatus::Finished, Some(Winner::User(winner))) if winner == uid => Some(GameOutcome::Win),
            (GameStatus::Finished, Some(Winner::User(_))) => Some(GameOutcome::Loss),
            _ => None,
        };
        let status = match (game.status(), result) {
            (GameStatus::Waiting, _) => "Waiting for an opponent...".to_string(),
            (GameStatus::Active, _) if my_turn => match my_mark {
                Some(mark) => format!("Your turn ({})", mark),
                None => "Your turn".to_string(),
            },
            (GameStatus::Active, _) => "Opponent's turn".to_string(),
            (GameStatus::Finished, Some(GameOutcome::Win)) => "You win!".to_string(),
            (GameStatus::Finished, Some(GameOutcome::Loss)) => "You lose!".to_string(),
            (GameStatus::Finished, Some(GameOutcome::Draw)) => "It's a draw!".to_string(),
            (GameStatus::Finished, None) => "Game cancelled".to_string(),
        };
        let winning_line = game.win_result().line;
        Self {
            game,
            my_mark,
            my_turn,
            result,
            winning_line,
            status,
        }
    }
}
