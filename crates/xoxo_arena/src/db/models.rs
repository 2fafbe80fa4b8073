//! Database rows and their conversions to documents.

use chrono::NaiveDateTime;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;
use xoxo_tictactoe::Board;

use crate::db::schema;
use crate::{GameStatus, GameUpdate, MatchRecord, OnlineGame, StoreError, Winner};

/// Row of the `games` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::games)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GameRow {
    id: String,
    player1_id: String,
    player2_id: Option<String>,
    board: String,
    next_player_id: String,
    status: String,
    winner: Option<String>,
    created_at: NaiveDateTime,
}

impl From<&OnlineGame> for GameRow {
    fn from(game: &OnlineGame) -> Self {
        Self {
            id: game.id().clone(),
            player1_id: game.player1_id().clone(),
            player2_id: game.player2_id().clone(),
            board: game.board().encode(),
            next_player_id: game.next_player_id().clone(),
            status: game.status().to_string(),
            winner: game.winner().clone().map(String::from),
            created_at: game.created_at().naive_utc(),
        }
    }
}

impl TryFrom<GameRow> for OnlineGame {
    type Error = StoreError;

    #[instrument(skip(row), fields(game_id = %row.id))]
    fn try_from(row: GameRow) -> Result<Self, Self::Error> {
        let board = Board::decode(&row.board)
            .map_err(|e| StoreError::new(format!("Corrupt board for game {}: {}", row.id, e)))?;
        let status = row
            .status
            .parse::<GameStatus>()
            .map_err(|_| StoreError::new(format!("Invalid status: '{}'", row.status)))?;

        Ok(OnlineGame::from_parts(
            row.id,
            row.player1_id,
            row.player2_id,
            board,
            row.next_player_id,
            status,
            row.winner.map(Winner::from),
            row.created_at.and_utc(),
        ))
    }
}

/// Changed columns of a `games` row. `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::games)]
pub struct GameChangeset {
    player2_id: Option<String>,
    board: Option<String>,
    next_player_id: Option<String>,
    status: Option<String>,
    winner: Option<String>,
}

impl From<GameUpdate> for GameChangeset {
    fn from(update: GameUpdate) -> Self {
        Self {
            player2_id: update.player2_id,
            board: update.board.map(|board| board.encode()),
            next_player_id: update.next_player_id,
            status: update.status.map(|status| status.to_string()),
            winner: update.winner.map(String::from),
        }
    }
}

/// Stored fields of a `game_records` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::game_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecordRow {
    player1_id: String,
    player2_id: String,
    winner_id: Option<String>,
    moves: String,
    recorded_at: NaiveDateTime,
}

impl From<RecordRow> for MatchRecord {
    fn from(row: RecordRow) -> Self {
        MatchRecord::new(
            row.player1_id,
            row.player2_id,
            row.winner_id,
            row.moves,
            row.recorded_at.and_utc(),
        )
    }
}

/// Insertable match record.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::game_records)]
pub struct NewRecordRow {
    user_id: String,
    player1_id: String,
    player2_id: String,
    winner_id: Option<String>,
    moves: String,
    recorded_at: NaiveDateTime,
}

impl NewRecordRow {
    /// Builds the row stored for `record` in `uid`'s history.
    pub fn from_record(uid: &str, record: &MatchRecord) -> Self {
        Self::new(
            uid.to_string(),
            record.player1_id().clone(),
            record.player2_id().clone(),
            record.winner_id().clone(),
            record.moves().clone(),
            record.timestamp().naive_utc(),
        )
    }
}
