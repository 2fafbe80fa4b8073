//! Online match coordinator.
//!
//! Every client edits the shared game document directly. Checks run against
//! the client's own copy of the active game: the latest document the store
//! delivered, with this client's writes applied as soon as they are issued.
//! Writes for the active game land in the order they were issued. Writes are
//! unconditional, so two clients racing for the same seat both succeed and
//! the later write wins.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use derive_more::{Display, Error, From};
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};
use xoxo_tictactoe::{MoveError, Position, is_full};

use super::lobby::LobbyQuery;
use super::view::OnlineView;
use crate::dispatch::{PendingWrite, dispatch};
use crate::{
    DocumentStore, ErrorReporter, GameId, GameStatus, GameUpdate, GameWatch, IdentityProvider,
    OnlineGame, StoreError, UserId, Winner,
};

/// Why an online action was refused.
#[derive(Debug, Clone, Display, Error, From)]
pub enum OnlineError {
    /// Sign-in has not finished.
    #[display("No signed-in user")]
    #[from(ignore)]
    SignedOut,

    /// No game document with that id.
    #[display("Game {} not found", _0)]
    #[from(ignore)]
    NotFound(#[error(not(source))] GameId),

    /// The second seat already belongs to someone else.
    #[display("Game {} already has two players", _0)]
    #[from(ignore)]
    GameTaken(#[error(not(source))] GameId),

    /// The move or action is not legal right now.
    #[display("{}", _0)]
    Move(MoveError),

    /// A read needed to validate the action failed.
    #[display("{}", _0)]
    Store(StoreError),
}

#[derive(Debug)]
struct ActiveGame {
    id: GameId,
    watch: GameWatch,
    local: Option<OnlineGame>,
    last_write: Option<oneshot::Receiver<()>>,
}

impl ActiveGame {
    fn new(id: GameId, watch: GameWatch, local: Option<OnlineGame>) -> Self {
        Self {
            id,
            watch,
            local,
            last_write: None,
        }
    }

    /// Adopts the store's copy if it changed since last looked at.
    fn sync(&mut self) {
        if !self.watch.has_changed().unwrap_or(false) {
            return;
        }
        let delivered = self.watch.borrow_and_update().clone();
        if delivered.is_some() {
            self.local = delivered;
        }
    }

    /// The copy [`ActiveGame::sync`] would settle on, without marking it seen.
    fn current(&self) -> Option<OnlineGame> {
        if self.watch.has_changed().unwrap_or(false)
            && let Some(game) = self.watch.borrow().clone()
        {
            return Some(game);
        }
        self.local.clone()
    }

    /// Hands out the signal the next write waits on and the one it fires.
    fn queue_write(&mut self) -> WriteOrder {
        let (landed, next) = oneshot::channel();
        WriteOrder {
            after: self.last_write.replace(next),
            landed: Some(landed),
        }
    }
}

/// Keeps one game's writes landing in issue order.
#[derive(Debug, Default)]
struct WriteOrder {
    after: Option<oneshot::Receiver<()>>,
    landed: Option<oneshot::Sender<()>>,
}

/// One client's side of online play.
///
/// Holds at most one active game, the one being viewed. Reads are awaited;
/// writes return a [`PendingWrite`] right away and report failures to the
/// [`ErrorReporter`].
#[derive(Debug)]
pub struct OnlineCoordinator {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    reporter: ErrorReporter,
    lobby_limit: usize,
    active: Option<ActiveGame>,
}

impl OnlineCoordinator {
    /// Creates a coordinator for the current user.
    #[instrument(skip(store, identity, reporter))]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        reporter: ErrorReporter,
        lobby_limit: usize,
    ) -> Self {
        info!("Creating OnlineCoordinator");
        Self {
            store,
            identity,
            reporter,
            lobby_limit,
            active: None,
        }
    }

    /// Id of the game being viewed.
    pub fn active_game_id(&self) -> Option<&GameId> {
        self.active.as_ref().map(|active| &active.id)
    }

    /// Opens a new game with the caller as X and makes it the active game.
    ///
    /// The id is minted locally, so it is known before the write lands.
    #[instrument(skip(self))]
    pub async fn create_game(&mut self) -> Result<(GameId, PendingWrite), OnlineError> {
        let uid = self.uid()?;
        let id = uuid::Uuid::new_v4().to_string();
        let game = OnlineGame::open(id.clone(), uid.clone(), Utc::now());

        let watch = self.store.watch_game(&id).await?;
        let mut active = ActiveGame::new(id.clone(), watch, Some(game.clone()));
        let order = active.queue_write();
        self.active = Some(active);
        info!(game_id = %id, uid = %uid, "Creating online game");

        let store = Arc::clone(&self.store);
        let pending = self.ordered_write("create_game", order, async move {
            store.create_game(game).await
        });
        Ok((id, pending))
    }

    /// A query for open games, at most the configured lobby limit.
    pub fn list_open_games(&self) -> LobbyQuery {
        LobbyQuery::new(Arc::clone(&self.store), self.lobby_limit)
    }

    /// Takes the second seat of `game_id` and makes it the active game.
    ///
    /// Returns `None` when no write was needed because the caller already
    /// sits in the game.
    #[instrument(skip(self))]
    pub async fn join_game(&mut self, game_id: &GameId) -> Result<Option<PendingWrite>, OnlineError> {
        let uid = self.uid()?;
        let known = match self.active.as_mut().filter(|active| &active.id == game_id) {
            Some(active) => {
                active.sync();
                active.local.clone()
            }
            None => None,
        };
        let (game, watch) = match known {
            Some(game) => (game, None),
            None => {
                let mut watch = self.store.watch_game(game_id).await?;
                let game = watch
                    .borrow_and_update()
                    .clone()
                    .ok_or_else(|| OnlineError::NotFound(game_id.clone()))?;
                (game, Some(watch))
            }
        };

        if game.is_finished() {
            return Err(MoveError::GameFinished.into());
        }
        let seated = game.mark_of(&uid).is_some();
        if !seated && game.player2_id().is_some() {
            warn!(game_id = %game_id, "Second seat already taken");
            return Err(OnlineError::GameTaken(game_id.clone()));
        }

        if let Some(watch) = watch {
            self.active = Some(ActiveGame::new(game_id.clone(), watch, Some(game)));
        }
        if seated {
            debug!(game_id = %game_id, "Already seated, viewing only");
            return Ok(None);
        }

        info!(game_id = %game_id, uid = %uid, "Joining online game");
        let update = GameUpdate::default()
            .player2_id(uid)
            .status(GameStatus::Active);
        Ok(Some(self.write_update("join_game", game_id, update)))
    }

    /// Plays the caller's mark at `index` in `game_id`.
    ///
    /// On acceptance the turn passes to the other seat, and a decided game
    /// is marked finished with the winner's id or the draw marker.
    #[instrument(skip(self))]
    pub async fn submit_move(&mut self, game_id: &GameId, index: usize) -> Result<PendingWrite, OnlineError> {
        let uid = self.uid()?;
        let game = self
            .latest(game_id)
            .await?
            .ok_or_else(|| OnlineError::NotFound(game_id.clone()))?;
        let position = Position::try_from_index(index)?;

        match game.status() {
            GameStatus::Finished => return Err(MoveError::GameFinished.into()),
            GameStatus::Waiting => return Err(MoveError::GameNotStarted.into()),
            GameStatus::Active => {}
        }
        let mark = game.mark_of(&uid).ok_or(MoveError::NotAParticipant)?;
        if game.next_player_id() != &uid {
            debug!(mark = %mark, next = %game.next_player_id(), "Out of turn");
            return Err(MoveError::NotYourTurn(mark).into());
        }

        let board = game.board().apply_move(position, mark)?;
        let next = game
            .other_player(&uid)
            .cloned()
            .ok_or(MoveError::NotAParticipant)?;
        let mut update = GameUpdate::default().board(board).next_player_id(next);

        let result = xoxo_tictactoe::evaluate(&board);
        if let Some(winner) = result.winner {
            let winner_id = game.seat(winner).cloned().unwrap_or_else(|| uid.clone());
            info!(game_id = %game_id, winner = %winner_id, "Online game won");
            update = update.status(GameStatus::Finished).winner(Winner::User(winner_id));
        } else if is_full(&board) {
            info!(game_id = %game_id, "Online game drawn");
            update = update.status(GameStatus::Finished).winner(Winner::Draw);
        }

        debug!(position = %position, mark = %mark, "Move accepted");
        Ok(self.write_update("submit_move", game_id, update))
    }

    /// Leaves the active game, forfeiting it if it is still running.
    ///
    /// The player who is not on turn is credited with the win; with the
    /// second seat empty nobody is. The active game is cleared either way.
    #[instrument(skip(self))]
    pub async fn leave_game(&mut self) -> Result<Option<PendingWrite>, OnlineError> {
        let Some(mut active) = self.active.take() else {
            debug!("No active game to leave");
            return Ok(None);
        };
        active.sync();
        let game = match active.local.clone() {
            Some(game) => Some(game),
            None => self.store.get_game(&active.id).await?,
        };
        let Some(game) = game else {
            debug!(game_id = %active.id, "Left a game that was never written");
            return Ok(None);
        };
        if game.is_finished() {
            debug!(game_id = %active.id, "Left a finished game");
            return Ok(None);
        }

        let winner = if game.next_player_id() == game.player1_id() {
            game.player2_id().clone()
        } else {
            Some(game.player1_id().clone())
        };
        info!(game_id = %active.id, winner = ?winner, "Forfeiting online game");

        let mut update = GameUpdate::default().status(GameStatus::Finished);
        if let Some(winner) = winner {
            update = update.winner(Winner::User(winner));
        }
        let order = active.queue_write();
        let store = Arc::clone(&self.store);
        let id = active.id.clone();
        Ok(Some(self.ordered_write("leave_game", order, async move {
            store.update_game(&id, update).await
        })))
    }

    /// The active game from the caller's point of view.
    pub fn view(&self) -> Option<OnlineView> {
        let game = self.active.as_ref()?.current()?;
        let uid = self.identity.current_user()?.uid().clone();
        Some(OnlineView::new(game, &uid))
    }

    /// Live receiver for the active game. Dropping it unsubscribes.
    pub fn subscribe(&self) -> Option<GameWatch> {
        self.active.as_ref().map(|active| active.watch.clone())
    }

    fn uid(&self) -> Result<UserId, OnlineError> {
        self.identity
            .current_user()
            .map(|user| user.uid().clone())
            .ok_or(OnlineError::SignedOut)
    }

    /// The freshest copy of `game_id` this client has: its own copy when it
    /// is the active game, a point read otherwise.
    async fn latest(&mut self, game_id: &GameId) -> Result<Option<OnlineGame>, StoreError> {
        if let Some(active) = self.active.as_mut()
            && &active.id == game_id
        {
            active.sync();
            if active.local.is_some() {
                return Ok(active.local.clone());
            }
        }
        self.store.get_game(game_id).await
    }

    /// Issues `update`, applying it to the local copy first when `game_id`
    /// is the active game.
    fn write_update(&mut self, operation: &'static str, game_id: &GameId, update: GameUpdate) -> PendingWrite {
        let order = match self.active.as_mut().filter(|active| &active.id == game_id) {
            Some(active) => {
                if let Some(game) = active.local.as_mut() {
                    game.apply(update.clone());
                }
                active.queue_write()
            }
            None => WriteOrder::default(),
        };
        let store = Arc::clone(&self.store);
        let id = game_id.clone();
        self.ordered_write(operation, order, async move {
            store.update_game(&id, update).await
        })
    }

    fn ordered_write<F>(&self, operation: &'static str, order: WriteOrder, write: F) -> PendingWrite
    where
        F: Future<Output = Result<(), StoreError>> + Send + 'static,
    {
        let WriteOrder { after, landed } = order;
        dispatch(operation, self.reporter.clone(), async move {
            if let Some(after) = after {
                // An error means the earlier write task is gone; nothing left to wait for.
                let _ = after.await;
            }
            let result = write.await;
            if let Some(landed) = landed {
                let _ = landed.send(());
            }
            result
        })
    }
}
