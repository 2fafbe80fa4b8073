//! Document store abstraction.
//!
//! Two collections are used: `games` (online game documents keyed by id) and
//! `users/{uid}/game_records` (append-only match records). Implementations
//! apply writes unconditionally; there is no transaction or version check.

mod memory;
mod watchers;

pub use memory::MemoryStore;
pub(crate) use watchers::Watchers;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::{GameId, GameStatus, GameUpdate, MatchRecord, OnlineGame, StoreError, UserId};

/// Live view of one game document; `None` until the document exists.
pub type GameWatch = watch::Receiver<Option<OnlineGame>>;

/// Storage for online games and match records.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Writes a new game document under its id.
    async fn create_game(&self, game: OnlineGame) -> Result<(), StoreError>;

    /// Point read of a game document.
    async fn get_game(&self, id: &GameId) -> Result<Option<OnlineGame>, StoreError>;

    /// Live read of a game document.
    ///
    /// The receiver holds the current document and is updated after every
    /// write made through this store.
    async fn watch_game(&self, id: &GameId) -> Result<GameWatch, StoreError>;

    /// Games with the given status, oldest first, at most `limit` of them.
    async fn list_games(&self, status: GameStatus, limit: usize) -> Result<Vec<OnlineGame>, StoreError>;

    /// Applies a partial update to an existing game.
    async fn update_game(&self, id: &GameId, update: GameUpdate) -> Result<(), StoreError>;

    /// Appends a match record to the user's history.
    async fn append_record(&self, uid: &UserId, record: MatchRecord) -> Result<(), StoreError>;

    /// The user's match records, most recent first.
    async fn list_records(&self, uid: &UserId) -> Result<Vec<MatchRecord>, StoreError>;
}
