//! Open-game discovery.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{DocumentStore, GameStatus, OnlineGame, StoreError};

/// A lazy query for games waiting for a second player.
///
/// Nothing is read until [`LobbyQuery::fetch`] is called; calling it again
/// runs the query again.
#[derive(Debug, Clone)]
pub struct LobbyQuery {
    store: Arc<dyn DocumentStore>,
    limit: usize,
}

impl LobbyQuery {
    pub(crate) fn new(store: Arc<dyn DocumentStore>, limit: usize) -> Self {
        Self { store, limit }
    }

    /// Most games returned by one fetch.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Waiting games, oldest first.
    #[instrument(skip(self), fields(limit = self.limit))]
    pub async fn fetch(&self) -> Result<Vec<OnlineGame>, StoreError> {
        let games = self.store.list_games(GameStatus::Waiting, self.limit).await?;
        debug!(count = games.len(), "Lobby fetched");
        Ok(games)
    }
}
