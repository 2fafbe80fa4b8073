//! XOXO Arena - tic-tac-toe match engine
//!
//! Local two-player series, single player against a greedy computer
//! opponent, and online matches through a shared document store, with
//! per-user match history.
//!
//! # Architecture
//!
//! - **Local**: [`LocalMatch`] state machine driven by a [`LocalMatchDriver`] task
//! - **Online**: [`OnlineCoordinator`] for lobby, join, moves and forfeits
//! - **History**: [`HistoryRecorder`] appends finished local rounds
//! - **Store**: [`DocumentStore`] with in-memory and SQLite backends
//! - **Arena**: [`Arena`] routes [`UiEvent`]s to the right place
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use xoxo_arena::{
//!     AnonymousSignIn, Arena, ArenaConfig, ErrorReporter, LocalMatchDriver, MatchMode,
//!     MemoryStore, OnlineCoordinator, UiEvent,
//! };
//!
//! # async fn example() {
//! let config = ArenaConfig::default();
//! let store = Arc::new(MemoryStore::new());
//! let identity = Arc::new(AnonymousSignIn::new());
//! let (reporter, _reports) = ErrorReporter::channel();
//!
//! let local = LocalMatchDriver::spawn_with_config(MatchMode::PvC, &config, None);
//! let online = OnlineCoordinator::new(store, identity, reporter, *config.lobby_limit());
//! let mut arena = Arena::new(local, online);
//! arena.dispatch(UiEvent::CellClicked(4)).await;
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod arena;
mod config;
mod db;
mod dispatch;
mod document;
mod error;
mod history;
mod identity;
mod local;
mod online;
mod store;

// Crate-level exports - Arena
pub use arena::{Arena, PlayMode, UiEvent};

// Crate-level exports - Configuration
pub use config::{ArenaConfig, ConfigError};

// Crate-level exports - Documents
pub use document::{
    DRAW_MARKER, GameId, GameOutcome, GameStatus, GameUpdate, HistorySummary, LOCAL_OPPONENT_ID,
    MatchRecord, OnlineGame, UserId, Winner,
};

// Crate-level exports - Errors and background writes
pub use dispatch::PendingWrite;
pub use error::{ErrorLocation, ErrorReport, ErrorReporter, ErrorReports, StoreError};

// Crate-level exports - History
pub use history::{HistoryRecorder, RoundResult};

// Crate-level exports - Identity
pub use identity::{AnonymousSignIn, Identity, IdentityProvider, StaticIdentity};

// Crate-level exports - Local play
pub use local::{
    COMPUTER_MARK, Fired, HUMAN_MARK, LocalCommand, LocalMatch, LocalMatchDriver, LocalMatchHandle,
    MatchMode, MatchSettings, MatchSnapshot, MoveApplied, NameError, PendingTimer, Phase, RoundEnd,
    Scores, SeatNames, TimerKind, seeded_rng,
};

// Crate-level exports - Online play
pub use online::{LobbyQuery, OnlineCoordinator, OnlineError, OnlineView};

// Crate-level exports - Storage
pub use db::{MIGRATIONS, SqliteStore};
pub use store::{DocumentStore, GameWatch, MemoryStore};

// Crate-level exports - Game types
pub use xoxo_tictactoe::{Board, MoveError, Outcome, Player, Position, Square, WinResult};
