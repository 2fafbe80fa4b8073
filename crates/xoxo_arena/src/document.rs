//! Shared documents: online games and match records.
//!
//! Field names follow the stored document schema (`player1Id`,
//! `nextPlayerId`, ...), so these types read and write existing data as is.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use xoxo_tictactoe::{Board, Player, WinResult, evaluate};

/// Unique identifier for a user.
pub type UserId = String;

/// Unique identifier for an online game document.
pub type GameId = String;

/// Literal stored in `winner` when an online game is drawn.
pub const DRAW_MARKER: &str = "draw";

/// Lifecycle of an online game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// Created, waiting for a second player.
    Waiting,
    /// Both seats filled, moves being played.
    Active,
    /// Won, drawn or forfeited. Terminal.
    Finished,
}

/// Who an online game was decided for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Winner {
    /// The user that won.
    User(UserId),
    /// Nobody won.
    Draw,
}

impl From<String> for Winner {
    fn from(value: String) -> Self {
        if value == DRAW_MARKER {
            Winner::Draw
        } else {
            Winner::User(value)
        }
    }
}

impl From<Winner> for String {
    fn from(winner: Winner) -> Self {
        match winner {
            Winner::User(uid) => uid,
            Winner::Draw => DRAW_MARKER.to_string(),
        }
    }
}

/// An online game as stored in the `games` collection.
///
/// `player1Id` always plays X and `player2Id` always plays O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct OnlineGame {
    id: GameId,
    player1_id: UserId,
    player2_id: Option<UserId>,
    board: Board,
    next_player_id: UserId,
    status: GameStatus,
    winner: Option<Winner>,
    created_at: DateTime<Utc>,
}

impl OnlineGame {
    /// A fresh game waiting for an opponent, with the creator to move.
    #[instrument]
    pub fn open(id: GameId, creator: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            player1_id: creator.clone(),
            player2_id: None,
            board: Board::new(),
            next_player_id: creator,
            status: GameStatus::Waiting,
            winner: None,
            created_at,
        }
    }

    /// Rebuilds a game from stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: GameId,
        player1_id: UserId,
        player2_id: Option<UserId>,
        board: Board,
        next_player_id: UserId,
        status: GameStatus,
        winner: Option<Winner>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            player1_id,
            player2_id,
            board,
            next_player_id,
            status,
            winner,
            created_at,
        }
    }

    /// The mark `uid` plays, if seated.
    pub fn mark_of(&self, uid: &str) -> Option<Player> {
        if self.player1_id == uid {
            Some(Player::X)
        } else if self.player2_id.as_deref() == Some(uid) {
            Some(Player::O)
        } else {
            None
        }
    }

    /// The user seated at `mark`, if any.
    pub fn seat(&self, mark: Player) -> Option<&UserId> {
        match mark {
            Player::X => Some(&self.player1_id),
            Player::O => self.player2_id.as_ref(),
        }
    }

    /// The seated user other than `uid`.
    pub fn other_player(&self, uid: &str) -> Option<&UserId> {
        self.mark_of(uid).and_then(|mark| self.seat(mark.opponent()))
    }

    /// Winner and winning line on the current board.
    pub fn win_result(&self) -> WinResult {
        evaluate(&self.board)
    }

    /// True once the game is finished.
    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    /// Applies a partial update; every present field overwrites.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn apply(&mut self, update: GameUpdate) {
        let GameUpdate {
            player2_id,
            board,
            next_player_id,
            status,
            winner,
        } = update;
        if let Some(player2_id) = player2_id {
            self.player2_id = Some(player2_id);
        }
        if let Some(board) = board {
            self.board = board;
        }
        if let Some(next_player_id) = next_player_id {
            self.next_player_id = next_player_id;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(winner) = winner {
            self.winner = Some(winner);
        }
    }
}

/// Partial-field update of an [`OnlineGame`].
///
/// Absent fields are left alone. There is no version check: concurrent
/// updates are applied in arrival order and the last one wins per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Setters)]
#[setters(strip_option)]
pub struct GameUpdate {
    /// New `player2Id`.
    pub player2_id: Option<UserId>,
    /// New board.
    pub board: Option<Board>,
    /// New `nextPlayerId`.
    pub next_player_id: Option<UserId>,
    /// New status.
    pub status: Option<GameStatus>,
    /// New winner.
    pub winner: Option<Winner>,
}

impl GameUpdate {
    /// True when the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Seat id stored for the second local player.
pub const LOCAL_OPPONENT_ID: &str = "player2";

/// One finished local round, stored under `users/{uid}/game_records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    player1_id: UserId,
    player2_id: UserId,
    winner_id: Option<UserId>,
    moves: String,
    timestamp: DateTime<Utc>,
}

impl MatchRecord {
    /// Builds a record from stored or computed fields.
    pub fn new(
        player1_id: UserId,
        player2_id: UserId,
        winner_id: Option<UserId>,
        moves: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            player1_id,
            player2_id,
            winner_id,
            moves,
            timestamp,
        }
    }

    /// The result from `uid`'s point of view.
    pub fn outcome_for(&self, uid: &str) -> GameOutcome {
        match &self.winner_id {
            None => GameOutcome::Draw,
            Some(winner) if winner == uid => GameOutcome::Win,
            Some(_) => GameOutcome::Loss,
        }
    }
}

/// Game outcome from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// User won the game.
    Win,
    /// User lost the game.
    Loss,
    /// Game ended in a draw.
    Draw,
}

/// Aggregated statistics over a user's match records.
#[derive(Debug, Clone, Default, PartialEq, Getters)]
pub struct HistorySummary {
    total_games: usize,
    wins: usize,
    losses: usize,
    draws: usize,
}

impl HistorySummary {
    /// Tallies `records` from `uid`'s point of view.
    #[instrument(skip(records), fields(count = records.len()))]
    pub fn tally(uid: &str, records: &[MatchRecord]) -> Self {
        records
            .iter()
            .fold(Self::default(), |mut summary, record| {
                summary.total_games += 1;
                match record.outcome_for(uid) {
                    GameOutcome::Win => summary.wins += 1,
                    GameOutcome::Loss => summary.losses += 1,
                    GameOutcome::Draw => summary.draws += 1,
                }
                summary
            })
    }

    /// Calculates win rate as a percentage (0.0-100.0).
    pub fn win_rate(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            (self.wins as f64 / self.total_games as f64) * 100.0
        }
    }
}
