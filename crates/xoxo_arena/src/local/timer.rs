//! Timers a local match can ask its driver to run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happens when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Clear the board and start the next round.
    Restart,
    /// Let the computer play its move.
    ComputerTurn,
}

/// A timer armed for one particular state of the match.
///
/// `generation` identifies that state. Once the match has moved on, firing
/// the timer does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingTimer {
    /// Action to take.
    pub kind: TimerKind,
    /// How long to wait, measured from when the timer is armed.
    pub delay: Duration,
    /// Match generation the timer belongs to.
    pub generation: u64,
}
