//! Routes UI events to local or online play.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use xoxo_tictactoe::Player;

use crate::dispatch::PendingWrite;
use crate::{
    GameId, LocalCommand, LocalMatchHandle, MatchMode, MatchSnapshot, OnlineCoordinator, OnlineView,
};

/// Which board the UI is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayMode {
    /// A local match in the given mode.
    Local(MatchMode),
    /// Online play.
    Online,
}

impl Default for PlayMode {
    fn default() -> Self {
        PlayMode::Local(MatchMode::default())
    }
}

/// A discrete user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEvent {
    /// A board cell (0-8) was tapped.
    CellClicked(usize),
    /// A play mode was selected.
    ModeSelected(PlayMode),
    /// A local seat was renamed.
    NameEdited(Player, String),
    /// Restart the local series.
    NewGame,
    /// Continue after a finished local round or series.
    PlayAgain,
    /// Open a new online game.
    CreateGame,
    /// Join an open online game.
    JoinGame(GameId),
    /// Leave the active online game.
    LeaveGame,
}

/// The application core: one local match and one online seat.
///
/// Events that make no sense for the current mode, or that the target
/// rejects, are dropped with a debug log.
#[derive(Debug)]
pub struct Arena {
    mode: PlayMode,
    local: LocalMatchHandle,
    online: OnlineCoordinator,
}

impl Arena {
    /// Creates an arena showing the local match in its current mode.
    #[instrument(skip_all)]
    pub fn new(local: LocalMatchHandle, online: OnlineCoordinator) -> Self {
        let mode = PlayMode::Local(*local.snapshot().mode());
        info!(mode = ?mode, "Creating Arena");
        Self { mode, local, online }
    }

    /// The selected mode.
    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    /// The local match driver.
    pub fn local(&self) -> &LocalMatchHandle {
        &self.local
    }

    /// The online coordinator.
    pub fn online(&self) -> &OnlineCoordinator {
        &self.online
    }

    /// Latest local match state.
    pub fn local_snapshot(&self) -> MatchSnapshot {
        self.local.snapshot()
    }

    /// The active online game, if any.
    pub fn online_view(&self) -> Option<OnlineView> {
        self.online.view()
    }

    /// Handles one event.
    ///
    /// Returns the store write the event started, if it started one.
    #[instrument(skip(self), fields(mode = ?self.mode))]
    pub async fn dispatch(&mut self, event: UiEvent) -> Option<PendingWrite> {
        match (self.mode, event) {
            (_, UiEvent::ModeSelected(mode)) => {
                self.mode = mode;
                if let PlayMode::Local(match_mode) = mode {
                    self.local.send(LocalCommand::ChangeMode(match_mode));
                }
                None
            }
            (PlayMode::Local(_), UiEvent::CellClicked(index)) => {
                self.local.send(LocalCommand::CellClicked(index));
                None
            }
            (PlayMode::Local(_), UiEvent::NameEdited(seat, name)) => {
                self.local.send(LocalCommand::EditName(seat, name));
                None
            }
            (PlayMode::Local(_), UiEvent::NewGame) => {
                self.local.send(LocalCommand::NewGame);
                None
            }
            (PlayMode::Local(_), UiEvent::PlayAgain) => {
                self.local.send(LocalCommand::PlayAgain);
                None
            }
            (PlayMode::Online, UiEvent::CellClicked(index)) => {
                let Some(game_id) = self.online.active_game_id().cloned() else {
                    debug!("No active online game, ignoring click");
                    return None;
                };
                self.online
                    .submit_move(&game_id, index)
                    .await
                    .map_err(|e| debug!(error = %e, "Online move rejected"))
                    .ok()
            }
            (PlayMode::Online, UiEvent::CreateGame) => self
                .online
                .create_game()
                .await
                .map(|(_, pending)| pending)
                .map_err(|e| debug!(error = %e, "Create game failed"))
                .ok(),
            (PlayMode::Online, UiEvent::JoinGame(game_id)) => self
                .online
                .join_game(&game_id)
                .await
                .map_err(|e| debug!(error = %e, "Join game failed"))
                .ok()
                .flatten(),
            (PlayMode::Online, UiEvent::LeaveGame) => self
                .online
                .leave_game()
                .await
                .map_err(|e| debug!(error = %e, "Leave game failed"))
                .ok()
                .flatten(),
            (mode, event) => {
                debug!(mode = ?mode, event = ?event, "Event does not apply to this mode");
                None
            }
        }
    }
}
