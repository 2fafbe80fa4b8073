//! In-process document store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::{DocumentStore, GameWatch, Watchers};
use crate::{GameId, GameStatus, GameUpdate, MatchRecord, OnlineGame, StoreError, UserId};

#[derive(Debug, Default)]
struct Collections {
    games: HashMap<GameId, OnlineGame>,
    records: HashMap<UserId, Vec<MatchRecord>>,
}

/// Document store held in memory.
///
/// Clones share the same documents, so two coordinators built from clones
/// of one store behave like two clients of one remote database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
    watchers: Arc<Watchers>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory document store");
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::new("memory store lock poisoned"))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    #[instrument(skip(self, game), fields(game_id = %game.id()))]
    async fn create_game(&self, game: OnlineGame) -> Result<(), StoreError> {
        self.watchers.publish_with(|| {
            let mut collections = self.lock()?;
            if collections.games.contains_key(game.id()) {
                warn!("Game already exists");
                return Err(StoreError::new(format!("Game {} already exists", game.id())));
            }
            collections.games.insert(game.id().clone(), game.clone());
            info!("Game created");
            Ok(Some(game))
        })
    }

    #[instrument(skip(self))]
    async fn get_game(&self, id: &GameId) -> Result<Option<OnlineGame>, StoreError> {
        let game = self.lock()?.games.get(id).cloned();
        if game.is_none() {
            debug!("Game not found");
        }
        Ok(game)
    }

    #[instrument(skip(self))]
    async fn watch_game(&self, id: &GameId) -> Result<GameWatch, StoreError> {
        self.watchers
            .subscribe(id, || Ok(self.lock()?.games.get(id).cloned()))
    }

    #[instrument(skip(self))]
    async fn list_games(&self, status: GameStatus, limit: usize) -> Result<Vec<OnlineGame>, StoreError> {
        let mut games: Vec<OnlineGame> = self
            .lock()?
            .games
            .values()
            .filter(|game| *game.status() == status)
            .cloned()
            .collect();
        games.sort_by(|a, b| a.created_at().cmp(b.created_at()).then_with(|| a.id().cmp(b.id())));
        games.truncate(limit);
        debug!(count = games.len(), "Listed games");
        Ok(games)
    }

    #[instrument(skip(self, update))]
    async fn update_game(&self, id: &GameId, update: GameUpdate) -> Result<(), StoreError> {
        self.watchers.publish_with(|| {
            let mut collections = self.lock()?;
            let game = collections
                .games
                .get_mut(id)
                .ok_or_else(|| StoreError::new(format!("Game {} not found", id)))?;
            game.apply(update);
            debug!(status = %game.status(), "Game updated");
            Ok(Some(game.clone()))
        })
    }

    #[instrument(skip(self, record))]
    async fn append_record(&self, uid: &UserId, record: MatchRecord) -> Result<(), StoreError> {
        self.lock()?.records.entry(uid.clone()).or_default().push(record);
        debug!("Record appended");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_records(&self, uid: &UserId) -> Result<Vec<MatchRecord>, StoreError> {
        let mut records = self.lock()?.records.get(uid).cloned().unwrap_or_default();
        records.reverse();
        records.sort_by(|a, b| b.timestamp().cmp(a.timestamp()));
        Ok(records)
    }
}
