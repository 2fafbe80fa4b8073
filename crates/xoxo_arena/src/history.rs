//! Match history for local two-player rounds.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};
use xoxo_tictactoe::{Board, Player};

use crate::dispatch::{PendingWrite, dispatch};
use crate::{
    DocumentStore, ErrorReporter, HistorySummary, IdentityProvider, LOCAL_OPPONENT_ID, MatchRecord,
    StoreError,
};

/// A finished local round, before it is bound to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    /// Winning mark, `None` on a draw.
    pub winner: Option<Player>,
    /// Final board.
    pub board: Board,
}

/// Appends finished rounds to the signed-in user's history.
///
/// Recording is fire-and-forget: the write runs in the background and a
/// failure ends up on the [`ErrorReporter`], never in front of the player.
#[derive(Debug, Clone)]
pub struct HistoryRecorder {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    reporter: ErrorReporter,
}

impl HistoryRecorder {
    /// Creates a recorder writing through `store` for the current user.
    #[instrument(skip_all)]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        reporter: ErrorReporter,
    ) -> Self {
        info!("Creating HistoryRecorder");
        Self {
            store,
            identity,
            reporter,
        }
    }

    /// Records `result` for the current user.
    ///
    /// The user is seat X; seat O is stored as [`LOCAL_OPPONENT_ID`].
    /// Returns `None` when nobody is signed in yet, in which case nothing is
    /// written.
    #[instrument(skip(self))]
    pub fn record(&self, result: RoundResult) -> Option<PendingWrite> {
        let Some(user) = self.identity.current_user() else {
            debug!("No signed-in user, skipping record");
            return None;
        };
        let uid = user.uid().clone();

        let winner_id = result.winner.map(|mark| match mark {
            Player::X => uid.clone(),
            Player::O => LOCAL_OPPONENT_ID.to_string(),
        });
        let record = MatchRecord::new(
            uid.clone(),
            LOCAL_OPPONENT_ID.to_string(),
            winner_id,
            result.board.encode(),
            Utc::now(),
        );

        debug!(uid = %uid, moves = %record.moves(), "Dispatching match record");
        let store = Arc::clone(&self.store);
        Some(dispatch("append_record", self.reporter.clone(), async move {
            store.append_record(&uid, record).await
        }))
    }

    /// The current user's records, most recent first.
    ///
    /// Empty while nobody is signed in.
    #[instrument(skip(self))]
    pub async fn history(&self) -> Result<Vec<MatchRecord>, StoreError> {
        match self.identity.current_user() {
            Some(user) => self.store.list_records(user.uid()).await,
            None => Ok(Vec::new()),
        }
    }

    /// Win/loss/draw totals for the current user.
    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<HistorySummary, StoreError> {
        let Some(user) = self.identity.current_user() else {
            return Ok(HistorySummary::default());
        };
        let records = self.store.list_records(user.uid()).await?;
        let summary = HistorySummary::tally(user.uid(), &records);
        info!(
            total = summary.total_games(),
            wins = summary.wins(),
            win_rate = %format!("{:.1}%", summary.win_rate()),
            "History summary computed"
        );
        Ok(summary)
    }
}
