//! SQLite-backed document store.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::{GameChangeset, GameRow, NewRecordRow, RecordRow, schema};
use crate::store::{DocumentStore, GameWatch, Watchers};
use crate::{GameId, GameStatus, GameUpdate, MatchRecord, OnlineGame, StoreError, UserId};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Document store persisted in a SQLite file.
///
/// Live reads are fed by writes made through this instance (and its
/// clones); another process writing the same file is only seen on the next
/// point read. Game writes and live-read setup share the watch registry
/// lock, so they are serialized within the process.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
    watchers: std::sync::Arc<Watchers>,
}

impl SqliteStore {
    /// Opens the database at `db_path`, creating it and applying pending
    /// migrations as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StoreError> {
        info!(path = %db_path, "Opening SqliteStore");
        let store = Self {
            db_path,
            watchers: Default::default(),
        };
        let mut conn = store.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::new(format!("Migrations failed: {}", e)))?;
        debug!(count = applied.len(), "Migrations applied");
        Ok(store)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| StoreError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    #[instrument(skip(self, conn))]
    fn load_game(&self, conn: &mut SqliteConnection, id: &str) -> Result<Option<OnlineGame>, StoreError> {
        schema::games::table
            .find(id)
            .select(GameRow::as_select())
            .first(conn)
            .optional()?
            .map(OnlineGame::try_from)
            .transpose()
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    #[instrument(skip(self, game), fields(game_id = %game.id()))]
    async fn create_game(&self, game: OnlineGame) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let row = GameRow::from(&game);
        self.watchers.publish_with(|| {
            diesel::insert_into(schema::games::table)
                .values(&row)
                .execute(&mut conn)?;
            info!("Game created");
            Ok(Some(game))
        })
    }

    #[instrument(skip(self))]
    async fn get_game(&self, id: &GameId) -> Result<Option<OnlineGame>, StoreError> {
        let mut conn = self.connection()?;
        self.load_game(&mut conn, id)
    }

    #[instrument(skip(self))]
    async fn watch_game(&self, id: &GameId) -> Result<GameWatch, StoreError> {
        let mut conn = self.connection()?;
        self.watchers.subscribe(id, || self.load_game(&mut conn, id))
    }

    #[instrument(skip(self))]
    async fn list_games(&self, status: GameStatus, limit: usize) -> Result<Vec<OnlineGame>, StoreError> {
        let mut conn = self.connection()?;
        let rows = schema::games::table
            .filter(schema::games::status.eq(status.to_string()))
            .order((schema::games::created_at.asc(), schema::games::id.asc()))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .select(GameRow::as_select())
            .load::<GameRow>(&mut conn)
            .map_err(StoreError::from)?;

        let mut games = Vec::with_capacity(rows.len());
        for row in rows {
            match OnlineGame::try_from(row) {
                Ok(game) => games.push(game),
                Err(e) => warn!(error = %e, "Skipping unreadable game row"),
            }
        }
        debug!(count = games.len(), "Listed games");
        Ok(games)
    }

    #[instrument(skip(self, update))]
    async fn update_game(&self, id: &GameId, update: GameUpdate) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        if update.is_empty() {
            debug!("Empty update, nothing to write");
            return Ok(());
        }

        let changeset = GameChangeset::from(update);
        self.watchers.publish_with(|| {
            let updated = diesel::update(schema::games::table.find(id))
                .set(&changeset)
                .execute(&mut conn)?;
            if updated == 0 {
                warn!("Update matched no game");
                return Err(StoreError::new(format!("Game {} not found", id)));
            }
            let game = self.load_game(&mut conn, id)?;
            if let Some(game) = &game {
                debug!(status = %game.status(), "Game updated");
            }
            Ok(game)
        })
    }

    #[instrument(skip(self, record))]
    async fn append_record(&self, uid: &UserId, record: MatchRecord) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let row = NewRecordRow::from_record(uid, &record);
        diesel::insert_into(schema::game_records::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(StoreError::from)?;
        info!(winner = ?record.winner_id(), "Match record appended");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_records(&self, uid: &UserId) -> Result<Vec<MatchRecord>, StoreError> {
        let mut conn = self.connection()?;
        let rows = schema::game_records::table
            .filter(schema::game_records::user_id.eq(uid))
            .order((
                schema::game_records::recorded_at.desc(),
                schema::game_records::id.desc(),
            ))
            .select(RecordRow::as_select())
            .load::<RecordRow>(&mut conn)
            .map_err(StoreError::from)?;
        info!(count = rows.len(), "Match records loaded");
        Ok(rows.into_iter().map(MatchRecord::from).collect())
    }
}
