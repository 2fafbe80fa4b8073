//! Local match state machine.
//!
//! [`LocalMatch`] holds no timers and does no I/O. It tells its driver which
//! timer should be running through [`LocalMatch::pending_timer`] and reacts
//! to it through [`LocalMatch::fire`].

use derive_getters::Getters;
use derive_more::{Display, Error};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use xoxo_tictactoe::{Board, MoveError, Outcome, Player, Position, evaluate, opponent, rules};

use super::settings::{COMPUTER_MARK, HUMAN_MARK, MatchMode, MatchSettings, SeatNames};
use super::timer::{PendingTimer, TimerKind};
use crate::history::RoundResult;

/// Round wins per mark in the current series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
pub struct Scores {
    x: u32,
    o: u32,
}

impl Scores {
    /// Round wins of `player`.
    pub fn get(&self, player: Player) -> u32 {
        match player {
            Player::X => self.x,
            Player::O => self.o,
        }
    }

    fn increment(&mut self, player: Player) -> u32 {
        let score = match player {
            Player::X => &mut self.x,
            Player::O => &mut self.o,
        };
        *score += 1;
        *score
    }
}

/// Where the match stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the given player to move.
    AwaitingMove(Player),
    /// The round has a result; the next one starts after the restart delay.
    RoundOver(Outcome),
    /// A player reached the series target. Nothing moves until acknowledged.
    SeriesOver(Player),
}

/// A move that was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveApplied {
    /// Square that was filled.
    pub position: Position,
    /// Mark that was placed.
    pub player: Player,
    /// Set when the move decided the round.
    pub round_end: Option<RoundEnd>,
}

/// How a round ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundEnd {
    /// Result of the round.
    pub outcome: Outcome,
    /// Set when the round also decided the series.
    pub series_winner: Option<Player>,
    /// Result to store in the user's history; only two-player rounds have one.
    pub record: Option<RoundResult>,
}

/// What firing a timer did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fired {
    /// The timer belonged to an earlier state and was ignored.
    Stale,
    /// A new round started.
    Restarted,
    /// The computer moved.
    ComputerMoved(MoveApplied),
}

/// Name edit rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum NameError {
    /// The mode uses fixed names.
    #[display("Names cannot be edited in {} mode", _0)]
    NotEditable(#[error(not(source))] MatchMode),
}

/// Everything a view needs to draw the local match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct MatchSnapshot {
    board: Board,
    next_player: Player,
    scores: Scores,
    names: SeatNames,
    mode: MatchMode,
    names_editable: bool,
    phase: Phase,
    round_outcome: Option<Outcome>,
    winning_line: Option<[Position; 3]>,
    series_winner: Option<Player>,
    status: String,
    generation: u64,
}

/// State of a local series: the board, whose turn it is, scores and names.
#[derive(Debug, Clone, Getters)]
pub struct LocalMatch {
    board: Board,
    next_player: Player,
    scores: Scores,
    last_round_winner: Option<Player>,
    mode: MatchMode,
    series_winner: Option<Player>,
    names: SeatNames,
    round_leader: Player,
    round_outcome: Option<Outcome>,
    generation: u64,
    settings: MatchSettings,
}

impl LocalMatch {
    /// A fresh series in `mode` with X to move.
    #[instrument]
    pub fn new(mode: MatchMode, settings: MatchSettings) -> Self {
        info!(mode = %mode, "Creating local match");
        Self {
            board: Board::new(),
            next_player: Player::X,
            scores: Scores::default(),
            last_round_winner: None,
            mode,
            series_winner: None,
            names: SeatNames::for_mode(mode),
            round_leader: Player::X,
            round_outcome: None,
            generation: 0,
            settings,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        if let Some(winner) = self.series_winner {
            Phase::SeriesOver(winner)
        } else if let Some(outcome) = self.round_outcome {
            Phase::RoundOver(outcome)
        } else {
            Phase::AwaitingMove(self.next_player)
        }
    }

    /// Plays the next mark at `index` for whoever sits at the board.
    ///
    /// In single-player mode only the human's turns are accepted here.
    ///
    /// # Errors
    ///
    /// [`MoveError::SeriesOver`], [`MoveError::RoundOver`],
    /// [`MoveError::OutOfBounds`], [`MoveError::NotYourTurn`] or
    /// [`MoveError::CellOccupied`].
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn submit_move(&mut self, index: usize) -> Result<MoveApplied, MoveError> {
        self.ensure_playable()?;
        let position = Position::try_from_index(index)?;
        if self.mode.is_computer(self.next_player) {
            debug!("Computer's turn, ignoring click");
            return Err(MoveError::NotYourTurn(HUMAN_MARK));
        }
        self.play(position)
    }

    /// Lets the computer play its move now.
    #[instrument(skip(self, rng), fields(generation = self.generation))]
    pub fn computer_move<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<MoveApplied, MoveError> {
        self.ensure_playable()?;
        if !self.mode.is_computer(self.next_player) {
            return Err(MoveError::NotYourTurn(COMPUTER_MARK));
        }
        let position =
            opponent::choose_move(&self.board, self.next_player, rng).ok_or(MoveError::RoundOver)?;
        self.play(position)
    }

    /// Switches mode, resetting scores, board, series and names.
    ///
    /// Selecting the current mode resets as well.
    #[instrument(skip(self))]
    pub fn change_mode(&mut self, mode: MatchMode) {
        info!(from = %self.mode, to = %mode, "Changing mode");
        self.mode = mode;
        self.names = SeatNames::for_mode(mode);
        self.reset_series();
    }

    /// Renames `seat`. Blank names fall back to the seat default.
    #[instrument(skip(self))]
    pub fn edit_name(&mut self, seat: Player, name: &str) -> Result<(), NameError> {
        if !self.mode.names_editable() {
            return Err(NameError::NotEditable(self.mode));
        }
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            self.mode.default_name(seat).to_string()
        } else {
            trimmed.to_string()
        };
        debug!(seat = %seat, name = %name, "Seat renamed");
        self.names.set(seat, name);
        Ok(())
    }

    /// Starts a new series in the same mode, keeping names.
    #[instrument(skip(self))]
    pub fn new_game(&mut self) {
        info!("New game");
        self.reset_series();
    }

    /// Acknowledges a finished series, or skips the restart delay of a
    /// finished round. Returns false when there was nothing to do.
    #[instrument(skip(self))]
    pub fn play_again(&mut self) -> bool {
        if self.series_winner.is_some() {
            self.acknowledge_series()
        } else if self.round_outcome.is_some() {
            self.start_next_round();
            true
        } else {
            false
        }
    }

    /// Clears a series winner and starts a fresh series.
    #[instrument(skip(self))]
    pub fn acknowledge_series(&mut self) -> bool {
        match self.series_winner {
            Some(winner) => {
                info!(winner = %winner, "Series acknowledged");
                self.reset_series();
                true
            }
            None => false,
        }
    }

    /// The timer the current state wants running, if any.
    pub fn pending_timer(&self) -> Option<PendingTimer> {
        if self.series_winner.is_some() {
            return None;
        }
        let (kind, delay) = if self.round_outcome.is_some() {
            (TimerKind::Restart, *self.settings.restart_delay())
        } else if self.mode.is_computer(self.next_player) {
            (TimerKind::ComputerTurn, *self.settings.computer_delay())
        } else {
            return None;
        };
        Some(PendingTimer {
            kind,
            delay,
            generation: self.generation,
        })
    }

    /// Runs `timer` if it still belongs to the current state.
    #[instrument(skip(self, rng), fields(current = self.generation))]
    pub fn fire<R: Rng + ?Sized>(&mut self, timer: PendingTimer, rng: &mut R) -> Result<Fired, MoveError> {
        if timer.generation != self.generation {
            debug!(timer_generation = timer.generation, "Ignoring stale timer");
            return Ok(Fired::Stale);
        }
        match timer.kind {
            TimerKind::Restart => {
                if self.series_winner.is_some() || self.round_outcome.is_none() {
                    return Ok(Fired::Stale);
                }
                self.start_next_round();
                Ok(Fired::Restarted)
            }
            TimerKind::ComputerTurn => self.computer_move(rng).map(Fired::ComputerMoved),
        }
    }

    /// Serializable view of the current state.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            board: self.board,
            next_player: self.next_player,
            scores: self.scores,
            names: self.names.clone(),
            mode: self.mode,
            names_editable: self.mode.names_editable(),
            phase: self.phase(),
            round_outcome: self.round_outcome,
            winning_line: evaluate(&self.board).line,
            series_winner: self.series_winner,
            status: self.status(),
            generation: self.generation,
        }
    }

    fn status(&self) -> String {
        match self.phase() {
            Phase::SeriesOver(winner) => format!("{} wins the series!", self.names.get(winner)),
            Phase::RoundOver(Outcome::Winner(winner)) => format!("{} wins!", self.names.get(winner)),
            Phase::RoundOver(Outcome::Draw) => "It's a draw!".to_string(),
            Phase::AwaitingMove(player) if self.mode.is_computer(player) => {
                "Computer is thinking...".to_string()
            }
            Phase::AwaitingMove(player) => format!("{}'s turn ({})", self.names.get(player), player),
        }
    }

    fn ensure_playable(&self) -> Result<(), MoveError> {
        if self.series_winner.is_some() {
            return Err(MoveError::SeriesOver);
        }
        if self.round_outcome.is_some() {
            return Err(MoveError::RoundOver);
        }
        Ok(())
    }

    fn play(&mut self, position: Position) -> Result<MoveApplied, MoveError> {
        let player = self.next_player;
        self.board = self.board.apply_move(position, player)?;
        self.generation += 1;
        debug!(position = %position, player = %player, "Move applied");

        let round_end = match rules::outcome(&self.board) {
            Some(outcome) => Some(self.finish_round(outcome)),
            None => {
                self.next_player = player.opponent();
                None
            }
        };
        Ok(MoveApplied {
            position,
            player,
            round_end,
        })
    }

    fn finish_round(&mut self, outcome: Outcome) -> RoundEnd {
        self.round_outcome = Some(outcome);
        self.last_round_winner = outcome.winner();
        if let Some(winner) = outcome.winner() {
            let score = self.scores.increment(winner);
            if score >= *self.settings.series_target() {
                info!(winner = %winner, score, "Series won");
                self.series_winner = Some(winner);
            }
        }
        info!(outcome = %outcome, x = self.scores.x, o = self.scores.o, "Round over");

        let record = (self.mode == MatchMode::PvP).then(|| RoundResult {
            winner: outcome.winner(),
            board: self.board,
        });
        RoundEnd {
            outcome,
            series_winner: self.series_winner,
            record,
        }
    }

    fn start_next_round(&mut self) {
        let leader = match self.mode {
            MatchMode::PvC => self.round_leader.opponent(),
            MatchMode::PvP => self
                .last_round_winner
                .unwrap_or_else(|| self.round_leader.opponent()),
        };
        debug!(leader = %leader, "Starting next round");
        self.reset_round(leader);
    }

    fn reset_round(&mut self, leader: Player) {
        self.board = Board::new();
        self.round_outcome = None;
        self.round_leader = leader;
        self.next_player = leader;
        self.generation += 1;
    }

    fn reset_series(&mut self) {
        self.scores = Scores::default();
        self.series_winner = None;
        self.last_round_winner = None;
        self.reset_round(Player::X);
    }
}
