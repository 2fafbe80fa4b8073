//! Async driver that owns a local match and runs its timers.
//!
//! The driver is a single task. UI commands and timer deadlines are
//! handled one at a time in one `select!` loop, so the match never sees two
//! changes at once. Dropping every [`LocalMatchHandle`] stops the task and
//! with it any timer still pending.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{Instrument, debug, info, info_span, instrument, warn};
use xoxo_tictactoe::Player;

use super::settings::{MatchMode, MatchSettings};
use super::state::{Fired, LocalMatch, MatchSnapshot, MoveApplied};
use super::timer::PendingTimer;
use crate::{ArenaConfig, HistoryRecorder};

/// A user action aimed at the local match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalCommand {
    /// A board cell was tapped.
    CellClicked(usize),
    /// A mode was picked (the current one included).
    ChangeMode(MatchMode),
    /// A seat name was edited.
    EditName(Player, String),
    /// Start over with the same mode and names.
    NewGame,
    /// Skip the restart delay, or acknowledge a finished series.
    PlayAgain,
    /// Acknowledge a finished series.
    AcknowledgeSeries,
}

/// The task side of a local match.
#[derive(Debug)]
pub struct LocalMatchDriver {
    state: LocalMatch,
    rng: StdRng,
    recorder: Option<HistoryRecorder>,
    commands: mpsc::UnboundedReceiver<LocalCommand>,
    snapshots: watch::Sender<MatchSnapshot>,
}

impl LocalMatchDriver {
    /// Spawns a driver for `state` on the current runtime.
    ///
    /// Finished two-player rounds go to `recorder` when one is given.
    #[instrument(skip_all, fields(mode = %state.mode()))]
    pub fn spawn(state: LocalMatch, rng: StdRng, recorder: Option<HistoryRecorder>) -> LocalMatchHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());
        let driver = Self {
            state,
            rng,
            recorder,
            commands: command_rx,
            snapshots: snapshot_tx,
        };
        info!("Spawning local match driver");
        let task = tokio::spawn(driver.run().instrument(info_span!("local_match")));
        LocalMatchHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task,
        }
    }

    /// Spawns a driver for a fresh match in `mode` configured by `config`.
    #[instrument(skip(config, recorder))]
    pub fn spawn_with_config(
        mode: MatchMode,
        config: &ArenaConfig,
        recorder: Option<HistoryRecorder>,
    ) -> LocalMatchHandle {
        let state = LocalMatch::new(mode, MatchSettings::from(config));
        Self::spawn(state, seeded_rng(*config.rng_seed()), recorder)
    }

    async fn run(mut self) {
        let mut armed: Option<(PendingTimer, Instant)> = None;
        loop {
            armed = self.rearm(armed);
            let deadline = armed.map(|(_, at)| at);

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => {
                        info!("All handles dropped, stopping local match driver");
                        break;
                    }
                },
                () = wait_until(deadline) => {
                    if let Some((timer, _)) = armed.take() {
                        self.fire(timer);
                    }
                }
            }
        }
    }

    /// Keeps the running timer while the state still wants it, otherwise arms
    /// the one the state asks for (or none).
    fn rearm(&self, armed: Option<(PendingTimer, Instant)>) -> Option<(PendingTimer, Instant)> {
        match (armed, self.state.pending_timer()) {
            (Some((current, at)), Some(wanted)) if current == wanted => Some((current, at)),
            (_, Some(wanted)) => {
                debug!(kind = ?wanted.kind, delay_ms = wanted.delay.as_millis() as u64, generation = wanted.generation, "Arming timer");
                Some((wanted, Instant::now() + wanted.delay))
            }
            (Some((stale, _)), None) => {
                debug!(kind = ?stale.kind, generation = stale.generation, "Timer cancelled");
                None
            }
            (None, None) => None,
        }
    }

    #[instrument(skip(self))]
    fn handle(&mut self, command: LocalCommand) {
        let changed = match command {
            LocalCommand::CellClicked(index) => match self.state.submit_move(index) {
                Ok(applied) => {
                    self.after_move(applied);
                    true
                }
                Err(e) => {
                    debug!(error = %e, "Move rejected");
                    false
                }
            },
            LocalCommand::ChangeMode(mode) => {
                self.state.change_mode(mode);
                true
            }
            LocalCommand::EditName(seat, name) => match self.state.edit_name(seat, &name) {
                Ok(()) => true,
                Err(e) => {
                    debug!(error = %e, "Name edit rejected");
                    false
                }
            },
            LocalCommand::NewGame => {
                self.state.new_game();
                true
            }
            LocalCommand::PlayAgain => self.state.play_again(),
            LocalCommand::AcknowledgeSeries => self.state.acknowledge_series(),
        };
        if changed {
            self.publish();
        }
    }

    #[instrument(skip(self))]
    fn fire(&mut self, timer: PendingTimer) {
        match self.state.fire(timer, &mut self.rng) {
            Ok(Fired::Stale) => {}
            Ok(Fired::Restarted) => self.publish(),
            Ok(Fired::ComputerMoved(applied)) => {
                self.after_move(applied);
                self.publish();
            }
            Err(e) => warn!(error = %e, "Timer action failed"),
        }
    }

    fn after_move(&self, applied: MoveApplied) {
        if let Some(end) = applied.round_end
            && let Some(result) = end.record
            && let Some(recorder) = &self.recorder
        {
            // Fire and forget; failures go to the error reporter.
            let _ = recorder.record(result);
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.snapshot());
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// A random source seeded with `seed`, or from the OS when absent.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// The caller's side of a running local match.
#[derive(Debug)]
pub struct LocalMatchHandle {
    commands: mpsc::UnboundedSender<LocalCommand>,
    snapshots: watch::Receiver<MatchSnapshot>,
    task: JoinHandle<()>,
}

impl LocalMatchHandle {
    /// Queues `command`. Returns false once the driver has stopped.
    pub fn send(&self, command: LocalCommand) -> bool {
        match self.commands.send(command) {
            Ok(()) => true,
            Err(e) => {
                warn!(command = ?e.0, "Local match driver has stopped");
                false
            }
        }
    }

    /// The latest published state.
    pub fn snapshot(&self) -> MatchSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver of every published state. Dropping it unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<MatchSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the driver, cancelling any pending timer, and waits for it.
    #[instrument(skip(self))]
    pub async fn shutdown(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(e) = task.await {
            warn!(error = %e, "Local match driver did not stop cleanly");
        }
    }
}
