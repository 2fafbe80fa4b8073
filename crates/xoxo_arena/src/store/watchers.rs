//! Per-document watch channels shared by the store backends.
//!
//! Backends read the current document and write new ones through closures
//! run under the registry lock. A subscriber therefore either sees a write
//! in its initial value or receives it as the next change.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, instrument};

use crate::{GameId, OnlineGame, StoreError};

type Channels = HashMap<GameId, watch::Sender<Option<OnlineGame>>>;

/// Registry of live readers, one channel per game id.
#[derive(Debug, Default)]
pub(crate) struct Watchers {
    channels: Mutex<Channels>,
}

impl Watchers {
    /// Subscribes to `id`, seeding a new channel with what `load` returns.
    #[instrument(skip(self, load))]
    pub(crate) fn subscribe<F>(
        &self,
        id: &GameId,
        load: F,
    ) -> Result<watch::Receiver<Option<OnlineGame>>, StoreError>
    where
        F: FnOnce() -> Result<Option<OnlineGame>, StoreError>,
    {
        let mut channels = self.lock()?;
        let current = load()?;
        let sender = channels
            .entry(id.clone())
            .or_insert_with(|| watch::channel(current.clone()).0);
        if sender.borrow().is_none() && current.is_some() {
            sender.send_replace(current);
        }
        Ok(sender.subscribe())
    }

    /// Runs `write` and pushes the document it returns to everyone watching
    /// its id. `Ok(None)` means nothing changed.
    #[instrument(skip(self, write))]
    pub(crate) fn publish_with<F>(&self, write: F) -> Result<(), StoreError>
    where
        F: FnOnce() -> Result<Option<OnlineGame>, StoreError>,
    {
        let mut channels = self.lock()?;
        let Some(game) = write()? else {
            return Ok(());
        };
        if let Some(sender) = channels.get(game.id()) {
            if sender.receiver_count() == 0 {
                debug!(game_id = %game.id(), "No watchers left, dropping channel");
                channels.remove(game.id());
            } else {
                sender.send_replace(Some(game));
            }
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Channels>, StoreError> {
        self.channels
            .lock()
            .map_err(|_| StoreError::new("watch registry lock poisoned"))
    }
}
