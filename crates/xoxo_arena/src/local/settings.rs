//! Match modes, seat names and timing for local play.

use std::time::Duration;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use xoxo_tictactoe::Player;

use crate::ArenaConfig;

/// Mark played by the human in single-player mode.
pub const HUMAN_MARK: Player = Player::X;

/// Mark played by the computer in single-player mode.
pub const COMPUTER_MARK: Player = Player::O;

/// Who sits at the local board.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MatchMode {
    /// Two people sharing one board.
    #[default]
    PvP,
    /// One person against the computer, which plays O.
    PvC,
}

impl MatchMode {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            MatchMode::PvP => "Player vs Player",
            MatchMode::PvC => "Player vs Computer",
        }
    }

    /// Name shown for `seat` until someone edits it.
    pub fn default_name(self, seat: Player) -> &'static str {
        match (self, seat) {
            (MatchMode::PvP, Player::X) => "Player 1",
            (MatchMode::PvP, Player::O) => "Player 2",
            (MatchMode::PvC, Player::X) => "Player",
            (MatchMode::PvC, Player::O) => "Computer",
        }
    }

    /// Only two-player names can be edited.
    pub fn names_editable(self) -> bool {
        self == MatchMode::PvP
    }

    /// True when `player` is moved by the computer in this mode.
    pub fn is_computer(self, player: Player) -> bool {
        self == MatchMode::PvC && player == COMPUTER_MARK
    }
}

/// Display names of the two seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SeatNames {
    x: String,
    o: String,
}

impl SeatNames {
    /// The default names for `mode`.
    pub fn for_mode(mode: MatchMode) -> Self {
        Self {
            x: mode.default_name(Player::X).to_string(),
            o: mode.default_name(Player::O).to_string(),
        }
    }

    /// Name of `seat`.
    pub fn get(&self, seat: Player) -> &str {
        match seat {
            Player::X => &self.x,
            Player::O => &self.o,
        }
    }

    pub(crate) fn set(&mut self, seat: Player, name: String) {
        match seat {
            Player::X => self.x = name,
            Player::O => self.o = name,
        }
    }
}

/// Series length and the two delays of a local match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct MatchSettings {
    series_target: u32,
    restart_delay: Duration,
    computer_delay: Duration,
}

impl MatchSettings {
    /// Creates settings; a zero series target is treated as one.
    pub fn new(series_target: u32, restart_delay: Duration, computer_delay: Duration) -> Self {
        Self {
            series_target: series_target.max(1),
            restart_delay,
            computer_delay,
        }
    }
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self::from(&ArenaConfig::default())
    }
}

impl From<&ArenaConfig> for MatchSettings {
    fn from(config: &ArenaConfig) -> Self {
        Self::new(
            *config.series_target(),
            config.restart_delay(),
            config.computer_delay(),
        )
    }
}
